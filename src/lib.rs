//! Bearer-token API client that keeps a persisted session alive: expiry-aware refresh, a single
//! refresh-and-retry on 401, and bounded retry on connectivity faults, over pluggable stores,
//! clocks, and HTTP transports.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod request;
pub mod retry;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// crates.io
	use ::http::{
		StatusCode,
		header::{AUTHORIZATION, CONTENT_TYPE},
	};
	// self
	use crate::{
		auth::{Session, SessionIdentity, TokenPair},
		client::SessionClient,
		clock::ManualClock,
		config::ClientConfig,
		error::TransportError,
		http::{HttpRequest, HttpResponse, HttpTransport, TransportErrorMapper, TransportFuture},
		store::{MemoryStore, SessionStore},
	};
	#[cfg(feature = "reqwest")]
	use crate::http::{ReqwestTransport, ReqwestTransportErrorMapper};

	/// Client type alias used by reqwest-backed integration tests.
	#[cfg(feature = "reqwest")]
	pub type ReqwestTestClient = SessionClient<ReqwestTransport, ReqwestTransportErrorMapper>;
	/// Client type alias wired to [`ScriptedTransport`].
	pub type ScriptedTestClient = SessionClient<ScriptedTransport, ScriptedFaultMapper>;

	/// Epoch second every [`ManualClock`] built by the test constructors starts at.
	pub const TEST_NOW: i64 = 1_700_000_000;
	/// Base URL used by [`build_scripted_test_client`].
	pub const SCRIPTED_BASE_URL: &str = "http://backend.test";

	/// Faults a [`ScriptedTransport`] can be told to raise.
	#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
	pub enum ScriptedFault {
		/// The exchange never completed.
		#[error("Connection refused.")]
		Connectivity,
		/// The exchange started but broke midway.
		#[error("Response body truncated.")]
		Network,
	}

	/// Maps [`ScriptedFault`] values onto client transport errors.
	#[derive(Clone, Debug, Default)]
	pub struct ScriptedFaultMapper;
	impl TransportErrorMapper<ScriptedFault> for ScriptedFaultMapper {
		fn map_transport_error(&self, error: ScriptedFault) -> Error {
			match error {
				ScriptedFault::Connectivity => TransportError::connectivity(error).into(),
				ScriptedFault::Network => TransportError::network(error).into(),
			}
		}
	}

	/// Request observed by a [`ScriptedTransport`].
	#[derive(Clone, Debug)]
	pub struct RecordedRequest {
		/// HTTP method.
		pub method: String,
		/// URI path without the query string.
		pub path: String,
		/// `Authorization` header, if any.
		pub authorization: Option<String>,
		/// `Content-Type` header, if any.
		pub content_type: Option<String>,
		/// Raw request body.
		pub body: Vec<u8>,
	}
	impl RecordedRequest {
		/// Parses the body as JSON, yielding `null` for empty or invalid bodies.
		pub fn body_json(&self) -> serde_json::Value {
			serde_json::from_slice(&self.body).unwrap_or_default()
		}
	}

	type Scripted = Result<(u16, String), ScriptedFault>;

	/// In-process transport answering from per-path queues and recording every request.
	///
	/// Paths without a queued answer get a `404` with a `detail` body.
	#[derive(Debug, Default)]
	pub struct ScriptedTransport {
		routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
		requests: Mutex<Vec<RecordedRequest>>,
	}
	impl ScriptedTransport {
		/// Queues a response for `path`.
		pub fn respond(&self, path: &str, status: u16, body: &str) -> &Self {
			self.push(path, Ok((status, body.to_owned())))
		}

		/// Queues a transport fault for `path`.
		pub fn fail(&self, path: &str, fault: ScriptedFault) -> &Self {
			self.push(path, Err(fault))
		}

		/// Requests observed so far, in order.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.requests.lock().clone()
		}

		/// Number of requests observed for `path`.
		pub fn calls_to(&self, path: &str) -> usize {
			self.requests.lock().iter().filter(|request| request.path == path).count()
		}

		fn push(&self, path: &str, answer: Scripted) -> &Self {
			self.routes.lock().entry(path.to_owned()).or_default().push_back(answer);

			self
		}

		fn answer(&self, request: HttpRequest) -> Scripted {
			let header = |name: ::http::HeaderName| {
				request.headers().get(name).and_then(|value| value.to_str().ok()).map(str::to_owned)
			};
			let recorded = RecordedRequest {
				method: request.method().to_string(),
				path: request.uri().path().to_owned(),
				authorization: header(AUTHORIZATION),
				content_type: header(CONTENT_TYPE),
				body: request.body().clone(),
			};
			let answer =
				self.routes.lock().get_mut(&recorded.path).and_then(VecDeque::pop_front).unwrap_or_else(
					|| Ok((404, format!(r#"{{"detail":"No scripted answer for {}."}}"#, recorded.path))),
				);

			self.requests.lock().push(recorded);

			answer
		}
	}
	impl HttpTransport for ScriptedTransport {
		type TransportError = ScriptedFault;

		fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
			let result = self.answer(request).map(|(status, body)| {
				let mut response = HttpResponse::new(body.into_bytes());

				*response.status_mut() =
					StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

				response
			});

			Box::pin(async move { result })
		}
	}

	/// Builds an unsigned, three-segment access token whose payload is `claims_json`.
	pub fn forge_token(claims_json: &str) -> String {
		use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

		let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
		let payload = URL_SAFE_NO_PAD.encode(claims_json);

		format!("{header}.{payload}.signature")
	}

	/// Builds a token that expires at the provided epoch second.
	pub fn token_expiring_at(exp: i64) -> String {
		forge_token(&format!(r#"{{"sub":"treasury","exp":{exp}}}"#))
	}

	/// Session fixture with the provided secrets and a fixed identity.
	pub fn session_fixture(access: &str, refresh: &str) -> Session {
		Session {
			tokens: TokenPair::new(access, refresh),
			identity: SessionIdentity {
				office_name: "Treasury".into(),
				wallet_address: "0xfeedbeef".into(),
			},
		}
	}

	/// Default configuration pointing at `base_url`.
	pub fn test_config(base_url: &str) -> ClientConfig {
		ClientConfig::builder(Url::parse(base_url).expect("Test base URL should parse successfully."))
			.build()
			.expect("Default test configuration should be valid.")
	}

	/// Constructs a [`SessionClient`] over a [`ScriptedTransport`], an in-memory store, and a
	/// manual clock pinned at [`TEST_NOW`].
	pub fn build_scripted_test_client()
	-> (ScriptedTestClient, Arc<ScriptedTransport>, Arc<MemoryStore>, Arc<ManualClock>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let transport = Arc::new(ScriptedTransport::default());
		let clock = Arc::new(ManualClock::new(TEST_NOW));
		let client = ScriptedTestClient::with_transport(
			test_config(SCRIPTED_BASE_URL),
			store,
			transport.clone(),
			ScriptedFaultMapper,
		)
		.with_clock(clock.clone());

		(client, transport, store_backend, clock)
	}

	/// Constructs a [`SessionClient`] against `base_url`, backed by an in-memory store, a
	/// manual clock pinned at [`TEST_NOW`], and the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_client(
		base_url: &str,
	) -> (ReqwestTestClient, Arc<MemoryStore>, Arc<ManualClock>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let clock = Arc::new(ManualClock::new(TEST_NOW));
		let client = SessionClient::new(test_config(base_url), store).with_clock(clock.clone());

		(client, store_backend, clock)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use ::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

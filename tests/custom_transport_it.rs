//! Drives the client through a hand-written transport, using only the public API.

// std
use std::{
	collections::VecDeque,
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::{Arc, Mutex},
};
// crates.io
use http::StatusCode;
use time::Duration;
// self
use session_client::{
	auth::{Session, SessionIdentity, TokenPair},
	client::SessionClient,
	clock::{Clock, ManualClock},
	config::ClientConfig,
	error::{Error, TransportError},
	http::{HttpRequest, HttpResponse, HttpTransport, TransportErrorMapper, TransportFuture},
	request::ApiRequest,
	store::{MemoryStore, SessionStore},
	url::Url,
};

#[derive(Debug)]
enum FlakyError {
	Dropped,
	Garbled,
}
impl Display for FlakyError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Dropped => write!(f, "Connection dropped."),
			Self::Garbled => write!(f, "Response garbled."),
		}
	}
}
impl StdError for FlakyError {}

#[derive(Default)]
struct FlakyTransport {
	script: Mutex<VecDeque<Result<u16, FlakyError>>>,
	calls: Mutex<u32>,
}
impl FlakyTransport {
	fn scripted(script: impl IntoIterator<Item = Result<u16, FlakyError>>) -> Self {
		Self { script: Mutex::new(script.into_iter().collect()), calls: Mutex::new(0) }
	}

	fn calls(&self) -> u32 {
		*self.calls.lock().expect("Call counter lock should not be poisoned.")
	}
}
impl HttpTransport for FlakyTransport {
	type TransportError = FlakyError;

	fn execute(&self, _request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		*self.calls.lock().expect("Call counter lock should not be poisoned.") += 1;

		let next = self
			.script
			.lock()
			.expect("Script lock should not be poisoned.")
			.pop_front()
			.unwrap_or(Ok(200));

		Box::pin(async move {
			next.map(|status| {
				let mut response = HttpResponse::new(b"{}".to_vec());

				*response.status_mut() =
					StatusCode::from_u16(status).expect("Scripted status should be valid.");

				response
			})
		})
	}
}

struct FlakyMapper;
impl TransportErrorMapper<FlakyError> for FlakyMapper {
	fn map_transport_error(&self, error: FlakyError) -> Error {
		match error {
			FlakyError::Dropped => TransportError::connectivity(error).into(),
			FlakyError::Garbled => TransportError::network(error).into(),
		}
	}
}

const NOW: i64 = 1_700_000_000;

async fn client_with(
	script: impl IntoIterator<Item = Result<u16, FlakyError>>,
) -> (SessionClient<FlakyTransport, FlakyMapper>, Arc<FlakyTransport>, Arc<ManualClock>) {
	let config = ClientConfig::builder(
		Url::parse("http://backend.invalid").expect("Base URL should parse."),
	)
	.build()
	.expect("Configuration should be valid.");
	let store = Arc::new(MemoryStore::default());
	// Header `{}` and payload `{"exp":9999999999}`, base64url without padding.
	let access = "e30.eyJleHAiOjk5OTk5OTk5OTl9.sig";

	store
		.set_all(Session {
			tokens: TokenPair::new(access, "refresh"),
			identity: SessionIdentity {
				office_name: "Treasury".into(),
				wallet_address: "0xfeedbeef".into(),
			},
		})
		.await
		.expect("Seeding should succeed.");

	let transport = Arc::new(FlakyTransport::scripted(script));
	let clock = Arc::new(ManualClock::new(NOW));
	let client = SessionClient::<FlakyTransport, FlakyMapper>::with_transport(
		config,
		store,
		transport.clone(),
		FlakyMapper,
	)
	.with_clock(clock.clone());

	(client, transport, clock)
}

#[tokio::test]
async fn recovers_on_third_attempt() {
	let (client, transport, clock) =
		client_with([Err(FlakyError::Dropped), Err(FlakyError::Dropped), Ok(200)]).await;
	let response = client
		.authorized_request(ApiRequest::get("/balance/"))
		.await
		.expect("Third attempt should succeed.");

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(transport.calls(), 3);
	assert_eq!(clock.sleeps(), vec![Duration::seconds(1); 2]);
	assert_eq!(clock.now_epoch_seconds(), NOW + 2);
}

#[tokio::test]
async fn gives_up_after_three_dropped_connections() {
	let (client, transport, _) = client_with([
		Err(FlakyError::Dropped),
		Err(FlakyError::Dropped),
		Err(FlakyError::Dropped),
		Ok(200),
	])
	.await;
	let err = client
		.authorized_request(ApiRequest::get("/balance/"))
		.await
		.expect_err("Three dropped connections must exhaust the budget.");

	assert!(matches!(err, Error::NetworkExhausted { attempts: 3, .. }));
	assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn garbled_response_is_not_retried() {
	let (client, transport, clock) = client_with([Err(FlakyError::Garbled), Ok(200)]).await;
	let err = client
		.authorized_request(ApiRequest::get("/balance/"))
		.await
		.expect_err("Non-connectivity faults propagate immediately.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
	assert_eq!(transport.calls(), 1);
	assert!(clock.sleeps().is_empty());
}

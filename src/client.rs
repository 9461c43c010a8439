//! The session-aware API client.
//!
//! [`SessionClient`] owns the transport, the injected store and clock, and the validated
//! configuration. Its operations are split by concern:
//!
//! - `token`: [`SessionClient::ensure_valid_token`] and [`SessionClient::refresh`].
//! - `call`: [`SessionClient::authorized_request`] and [`SessionClient::authorized_json`], which
//!   compose the network retry policy around the refresh-on-401 policy.
//! - `session`: sign-in, registration, sign-out, and the cached identity.
//!
//! Clones share the transport, store, clock, metrics, and the refresh guard, so concurrent
//! callers on clones of one client never send overlapping refresh requests.

mod call;
mod session;
mod token;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	clock::{Clock, SystemClock},
	config::ClientConfig,
	http::{HttpRequest, HttpTransport, TransportErrorMapper},
	obs::{self, CallKind, CallOutcome, CallSpan, ClientMetrics},
	request::{ApiRequest, ApiResponse},
	store::SessionStore,
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestTransport, ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestSessionClient = SessionClient<ReqwestTransport, ReqwestTransportErrorMapper>;

/// Bearer-token client bound to one backend and one persisted session.
pub struct SessionClient<T, M>
where
	T: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<T::TransportError>,
{
	/// Transport used for every outbound request.
	pub transport: Arc<T>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Session store holding the token pair and identity.
	pub store: Arc<dyn SessionStore>,
	/// Time source for expiry checks and retry pauses.
	pub clock: Arc<dyn Clock>,
	/// Validated client configuration.
	pub config: ClientConfig,
	/// Shared counters for refreshes and retries.
	pub metrics: Arc<ClientMetrics>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<T, M> SessionClient<T, M>
where
	T: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<T::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn SessionStore>,
		transport: impl Into<Arc<T>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			transport: transport.into(),
			transport_mapper: mapper.into(),
			store,
			clock: Arc::new(SystemClock),
			config,
			metrics: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Replaces the time source (defaults to [`SystemClock`]).
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Resolves `request` against the base URL and attaches `token` as the bearer credential.
	fn build_request(&self, request: &ApiRequest, token: Option<&TokenSecret>) -> Result<HttpRequest> {
		let url = self.config.endpoint_url(&request.endpoint)?;

		Ok(request.to_http(&url, token)?)
	}

	/// Executes one exchange, mapping transport failures through the configured mapper.
	async fn send(&self, request: HttpRequest) -> Result<ApiResponse> {
		self.transport
			.execute(request)
			.await
			.map(ApiResponse::from)
			.map_err(|err| self.transport_mapper.map_transport_error(err))
	}
}
#[cfg(feature = "reqwest")]
impl SessionClient<ReqwestTransport, ReqwestTransportErrorMapper> {
	/// Creates a new client for the provided configuration and store.
	///
	/// The client provisions its own reqwest-backed transport so callers do not need to pass HTTP
	/// handles explicitly. Use [`SessionClient::with_transport`] to share a tuned
	/// [`ReqwestClient`](crate::reqwest::Client).
	pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Self {
		Self::with_transport(
			config,
			store,
			ReqwestTransport::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<T, M> Clone for SessionClient<T, M>
where
	T: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<T::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			transport_mapper: self.transport_mapper.clone(),
			store: self.store.clone(),
			clock: self.clock.clone(),
			config: self.config.clone(),
			metrics: self.metrics.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<T, M> Debug for SessionClient<T, M>
where
	T: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<T::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("endpoints", &self.config.endpoints)
			.field("retry", &self.config.retry)
			.finish()
	}
}

/// Runs `fut` inside a call span, recording the attempt and its outcome.
async fn observe<F, R>(kind: CallKind, stage: &'static str, fut: F) -> Result<R>
where
	F: Future<Output = Result<R>>,
{
	let span = CallSpan::new(kind, stage);

	obs::record_call_outcome(kind, CallOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => obs::record_call_outcome(kind, CallOutcome::Success),
		Err(_) => obs::record_call_outcome(kind, CallOutcome::Failure),
	}

	result
}

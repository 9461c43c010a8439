//! Authorized calls: bearer token attached, refresh-and-resend on 401, bounded network retry.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::{self, SessionClient},
	http::{HttpTransport, TransportErrorMapper},
	obs::{self, CallKind},
	request::{ApiRequest, ApiResponse},
	retry::{AuthRefreshRetry, RetryDecision, TransientFaultRetry},
};

impl<T, M> SessionClient<T, M>
where
	T: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<T::TransportError>,
{
	/// Sends `request` with the stored access token and returns the backend response as-is.
	///
	/// The token is validated (and refreshed when expired) once up front. A 401 triggers one
	/// refresh and one resend with the new token; whatever that resend returns is handed back,
	/// including a second 401. When the transport cannot complete the exchange the whole call is
	/// repeated after a fixed pause, up to the configured attempt bound, and then fails with
	/// [`Error::NetworkExhausted`]. Other transport failures propagate immediately.
	pub async fn authorized_request(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Authorized;

		client::observe(KIND, "authorized_request", async move {
			let network = TransientFaultRetry::from(&self.config.retry);
			let auth = AuthRefreshRetry::from(&self.config.retry);
			let mut token = self.ensure_valid_token().await?;
			let mut refreshes = 0;
			let mut attempt = 1;

			loop {
				let err = match self.exchange(&request, auth, &mut token, &mut refreshes).await {
					Ok(response) => return Ok(response),
					Err(err) => err,
				};

				match network.on_error(attempt, err) {
					RetryDecision::RetryAfter(delay) => {
						obs::warn_network_retry(KIND, attempt, delay);
						obs::record_network_retry(KIND);
						self.metrics.record_network_retry();
						self.clock.sleep(delay).await;

						attempt += 1;
					},
					RetryDecision::GiveUp(err) => return Err(err),
				}
			}
		})
		.await
	}

	/// [`authorized_request`](Self::authorized_request), then
	/// [`error_for_status`](ApiResponse::error_for_status) with `fallback`, then a JSON decode.
	pub async fn authorized_json<R>(&self, request: ApiRequest, fallback: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.authorized_request(request).await?.error_for_status(fallback)?.json()
	}

	/// One network attempt: send, and on 401 refresh and resend while the auth policy allows.
	///
	/// `token` and `refreshes` outlive the attempt so a later network retry reuses the refreshed
	/// token and never refreshes again for the same logical call.
	async fn exchange(
		&self,
		request: &ApiRequest,
		auth: AuthRefreshRetry,
		token: &mut TokenSecret,
		refreshes: &mut u32,
	) -> Result<ApiResponse> {
		loop {
			let response = self.send(self.build_request(request, Some(&*token))?).await?;

			if !auth.should_refresh(response.status, *refreshes) {
				return Ok(response);
			}

			*refreshes += 1;
			*token = self.refresh_stale(Some(token.expose().to_owned())).await?;

			self.metrics.record_auth_retry();
		}
	}
}

//! Access-token validation and single-flight refresh.

// self
use crate::{
	_prelude::*,
	auth::{self, Session, SessionField, SessionGrant, TokenSecret},
	client::{self, SessionClient},
	error::AuthError,
	http::{HttpTransport, TransportErrorMapper},
	obs::{self, CallKind},
	request::{ApiRequest, ApiResponse},
};

const REFRESH_FALLBACK: &str = "Token refresh failed.";

#[derive(Serialize)]
struct RefreshBody<'a> {
	refresh_token: &'a str,
}

impl<T, M> SessionClient<T, M>
where
	T: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<T::TransportError>,
{
	/// Returns a usable access token, refreshing it first when its `exp` claim is in the past.
	///
	/// A token that is not three dot-separated segments with a JSON-object payload clears the
	/// session and fails with [`AuthError::MalformedAccessToken`]. A token without an `exp`
	/// claim, or whose `exp` is not strictly before the clock's current second, is returned
	/// unchanged without any network call.
	pub async fn ensure_valid_token(&self) -> Result<TokenSecret> {
		let access =
			self.store.get(SessionField::AccessToken).await?.ok_or(AuthError::MissingAccessToken)?;
		let Some(claims) = auth::decode_claims(&access) else {
			self.store.clear_all().await?;

			return Err(AuthError::MalformedAccessToken.into());
		};

		if claims.is_expired_at(self.clock.now_epoch_seconds()) {
			return self.refresh_stale(Some(access)).await;
		}

		Ok(TokenSecret::new(access))
	}

	/// Exchanges the stored refresh token for a new session and returns the new access token.
	///
	/// Success replaces all four session fields in one write. Rejection or an unreachable
	/// endpoint clears all four fields and fails with [`Error::Unauthenticated`]; the caller
	/// must not retry. A missing refresh token fails without a network call and leaves the
	/// store as it is.
	pub async fn refresh(&self) -> Result<TokenSecret> {
		let stale = self.store.get(SessionField::AccessToken).await?;

		self.refresh_stale(stale).await
	}

	/// Refreshes unless another caller already replaced `stale` while this one waited.
	pub(super) async fn refresh_stale(&self, stale: Option<String>) -> Result<TokenSecret> {
		client::observe(CallKind::Refresh, "refresh", async move {
			let _singleflight = self.refresh_guard.lock().await;
			let rotated = self
				.store
				.get(SessionField::AccessToken)
				.await?
				.filter(|current| stale.as_deref().is_some_and(|stale| stale != current.as_str()));

			if let Some(current) = rotated {
				self.metrics.record_refresh_success();

				return Ok(TokenSecret::new(current));
			}

			let refresh_token = self
				.store
				.get(SessionField::RefreshToken)
				.await?
				.ok_or(AuthError::MissingRefreshToken)?;
			let request = ApiRequest::post(self.config.endpoints.refresh.as_str())
				.json(&RefreshBody { refresh_token: &refresh_token })?;
			let request = self.build_request(&request, None)?;

			self.metrics.record_refresh_attempt();

			let response = match self.send(request).await {
				Ok(response) => response,
				Err(Error::Transport(source)) =>
					return self.end_session(AuthError::RefreshUnreachable { source }).await,
				Err(err) => {
					self.metrics.record_refresh_failure();

					return Err(err);
				},
			};
			let grant = match parse_grant(&response) {
				Ok(grant) => grant,
				Err(err) => return self.end_session(err).await,
			};
			let session = Session::from(grant);
			let access_token = session.tokens.access_token.clone();

			self.store.set_all(session).await.inspect_err(|_| {
				self.metrics.record_refresh_failure();
			})?;
			self.metrics.record_refresh_success();

			Ok(access_token)
		})
		.await
	}

	async fn end_session(&self, reason: AuthError) -> Result<TokenSecret> {
		self.metrics.record_refresh_failure();
		self.store.clear_all().await?;

		let err = Error::from(reason);

		obs::warn_refresh_failed(&err);

		Err(err)
	}
}

fn parse_grant(response: &ApiResponse) -> Result<SessionGrant, AuthError> {
	if !response.is_success() {
		return Err(AuthError::RefreshRejected {
			status: response.status.as_u16(),
			detail: response.detail().unwrap_or_else(|| REFRESH_FALLBACK.to_owned()),
		});
	}

	let mut de = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| AuthError::RefreshResponseInvalid { source })
}

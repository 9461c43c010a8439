//! Sign-in, registration, sign-out, and the cached identity.

// self
use crate::{
	_prelude::*,
	auth::{
		OfficeCredentials, Registration, Session, SessionField, SessionGrant, SessionIdentity,
		TokenSecret,
	},
	client::{self, SessionClient},
	error::AuthError,
	http::{HttpTransport, TransportErrorMapper},
	obs::CallKind,
	request::ApiRequest,
};

const LOGIN_FALLBACK: &str = "Authentication failed.";
const REGISTER_FALLBACK: &str = "Registration failed.";
const LOGOUT_FALLBACK: &str = "Logout failed.";

impl<T, M> SessionClient<T, M>
where
	T: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<T::TransportError>,
{
	/// Signs in with office credentials and persists the issued session.
	///
	/// A non-2xx answer fails with [`Error::Api`] carrying the backend `detail` and leaves the
	/// store untouched.
	pub async fn login(&self, office_name: &str, password: &str) -> Result<SessionIdentity> {
		client::observe(CallKind::Login, "login", async move {
			let request = ApiRequest::post(self.config.endpoints.login.as_str())
				.json(&OfficeCredentials { office_name, password })?;
			let grant: SessionGrant = self
				.send(self.build_request(&request, None)?)
				.await?
				.error_for_status(LOGIN_FALLBACK)?
				.json()?;
			let session = Session::from(grant);
			let identity = session.identity.clone();

			self.store.set_all(session).await?;

			Ok(identity)
		})
		.await
	}

	/// Registers a new office. Does not sign in and never touches the store.
	pub async fn register(&self, office_name: &str, password: &str) -> Result<Registration> {
		client::observe(CallKind::Register, "register", async move {
			let request = ApiRequest::post(self.config.endpoints.register.as_str())
				.json(&OfficeCredentials { office_name, password })?;

			self.send(self.build_request(&request, None)?)
				.await?
				.error_for_status(REGISTER_FALLBACK)?
				.json()
		})
		.await
	}

	/// Signs out with the stored access token and clears the session once the backend agrees.
	///
	/// The token is sent as stored: no expiry check and no refresh. A non-2xx answer fails with
	/// [`Error::Api`] and leaves the store untouched.
	pub async fn logout(&self) -> Result<()> {
		client::observe(CallKind::Logout, "logout", async move {
			let token = self
				.store
				.get(SessionField::AccessToken)
				.await?
				.map(TokenSecret::new)
				.ok_or(AuthError::MissingAccessToken)?;
			let request = ApiRequest::post(self.config.endpoints.logout.as_str());

			self.send(self.build_request(&request, Some(&token))?)
				.await?
				.error_for_status(LOGOUT_FALLBACK)?;
			self.store.clear_all().await?;

			Ok(())
		})
		.await
	}

	/// Identity cached next to the token pair, read without any network call.
	pub async fn current_identity(&self) -> Result<Option<SessionIdentity>> {
		let office_name = self.store.get(SessionField::OfficeName).await?;
		let wallet_address = self.store.get(SessionField::WalletAddress).await?;

		Ok(office_name
			.zip(wallet_address)
			.map(|(office_name, wallet_address)| SessionIdentity { office_name, wallet_address }))
	}
}

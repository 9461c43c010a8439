//! Client configuration: backend base URL, endpoint paths, and retry bounds.

// self
use crate::{_prelude::*, error::ConfigError};

/// Errors raised while constructing or validating a [`ClientConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ClientConfigError {
	/// Base URL must use HTTP or HTTPS.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL must not carry a query or fragment, because endpoints are appended to it.
	#[error("Base URL must not carry a query or fragment: {url}.")]
	BaseUrlHasSuffix {
		/// Base URL that failed validation.
		url: String,
	},
	/// Endpoint paths must be relative.
	#[error("The {endpoint} path must be relative to the base URL: {path}.")]
	AbsoluteEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Path that failed validation.
		path: String,
	},
	/// At least one network attempt is required.
	#[error("The network attempt bound must be at least 1.")]
	ZeroNetworkAttempts,
	/// Retry delay cannot be negative.
	#[error("The network retry delay must not be negative.")]
	NegativeRetryDelay,
}

/// Paths of the session endpoints, relative to the base URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
	/// Token refresh endpoint.
	pub refresh: String,
	/// Sign-in endpoint.
	pub login: String,
	/// Registration endpoint.
	pub register: String,
	/// Sign-out endpoint.
	pub logout: String,
}
impl Default for EndpointPaths {
	fn default() -> Self {
		Self {
			refresh: "/refresh-token".into(),
			login: "/token".into(),
			register: "/register".into(),
			logout: "/logout".into(),
		}
	}
}

/// Bounds for the two retry policies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
	/// Total attempts (first try included) when the transport cannot complete the exchange.
	pub max_network_attempts: u32,
	/// Fixed pause before each network retry.
	pub network_retry_delay: Duration,
	/// Refreshes allowed per logical call after a 401.
	pub max_auth_refreshes: u32,
}
impl RetrySettings {
	const DEFAULT_NETWORK_ATTEMPTS: u32 = 3;
	const DEFAULT_NETWORK_RETRY_DELAY: Duration = Duration::seconds(1);
}
impl Default for RetrySettings {
	fn default() -> Self {
		Self {
			max_network_attempts: Self::DEFAULT_NETWORK_ATTEMPTS,
			network_retry_delay: Self::DEFAULT_NETWORK_RETRY_DELAY,
			max_auth_refreshes: 1,
		}
	}
}

/// Validated client configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Backend base URL; endpoints are appended to it verbatim.
	pub base_url: Url,
	/// Session endpoint paths.
	#[serde(default)]
	pub endpoints: EndpointPaths,
	/// Retry bounds.
	#[serde(default)]
	pub retry: RetrySettings,
}
impl ClientConfig {
	/// Returns a builder seeded with defaults for `base_url`.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Validates invariants for the configuration.
	pub fn validate(&self) -> Result<(), ClientConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(ClientConfigError::UnsupportedScheme { url: self.base_url.to_string() });
		}
		if self.base_url.query().is_some() || self.base_url.fragment().is_some() {
			return Err(ClientConfigError::BaseUrlHasSuffix { url: self.base_url.to_string() });
		}
		if self.retry.max_network_attempts == 0 {
			return Err(ClientConfigError::ZeroNetworkAttempts);
		}
		if self.retry.network_retry_delay.is_negative() {
			return Err(ClientConfigError::NegativeRetryDelay);
		}

		validate_path("refresh", &self.endpoints.refresh)?;
		validate_path("login", &self.endpoints.login)?;
		validate_path("register", &self.endpoints.register)?;
		validate_path("logout", &self.endpoints.logout)?;

		Ok(())
	}

	/// Resolves `endpoint` against the base URL.
	///
	/// The endpoint is appended to the base path with exactly one `/` between them, so a base of
	/// `https://host/api` and an endpoint of `/me/` yield `https://host/api/me/`.
	pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ConfigError> {
		if is_absolute(endpoint) {
			return Err(ConfigError::InvalidEndpoint { endpoint: endpoint.to_owned() });
		}

		let joined = format!(
			"{}/{}",
			self.base_url.as_str().trim_end_matches('/'),
			endpoint.trim_start_matches('/')
		);

		Url::parse(&joined).map_err(|source| ConfigError::InvalidEndpointUrl {
			endpoint: endpoint.to_owned(),
			source,
		})
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	config: ClientConfig,
}
impl ClientConfigBuilder {
	/// Creates a new builder for `base_url` with default paths and retry bounds.
	pub fn new(base_url: Url) -> Self {
		Self {
			config: ClientConfig {
				base_url,
				endpoints: EndpointPaths::default(),
				retry: RetrySettings::default(),
			},
		}
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.config.endpoints.refresh = path.into();

		self
	}

	/// Overrides the sign-in endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.config.endpoints.login = path.into();

		self
	}

	/// Overrides the registration endpoint path.
	pub fn register_path(mut self, path: impl Into<String>) -> Self {
		self.config.endpoints.register = path.into();

		self
	}

	/// Overrides the sign-out endpoint path.
	pub fn logout_path(mut self, path: impl Into<String>) -> Self {
		self.config.endpoints.logout = path.into();

		self
	}

	/// Overrides the total number of network attempts (defaults to 3).
	pub fn max_network_attempts(mut self, attempts: u32) -> Self {
		self.config.retry.max_network_attempts = attempts;

		self
	}

	/// Overrides the pause before each network retry (defaults to 1 second).
	pub fn network_retry_delay(mut self, delay: Duration) -> Self {
		self.config.retry.network_retry_delay = delay;

		self
	}

	/// Overrides the number of refreshes allowed after a 401 (defaults to 1).
	pub fn max_auth_refreshes(mut self, refreshes: u32) -> Self {
		self.config.retry.max_auth_refreshes = refreshes;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}

fn validate_path(name: &'static str, path: &str) -> Result<(), ClientConfigError> {
	if is_absolute(path) {
		Err(ClientConfigError::AbsoluteEndpoint { endpoint: name, path: path.to_owned() })
	} else {
		Ok(())
	}
}

fn is_absolute(endpoint: &str) -> bool {
	endpoint.contains("://") || endpoint.starts_with("//")
}

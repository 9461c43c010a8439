//! Client-level error types shared across requests, refreshes, and stores.

pub use crate::store::StoreError;

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure that is not eligible for retry (or was never retried).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// No usable credentials; the caller must restart the sign-in flow.
	#[error(transparent)]
	Unauthenticated(#[from] AuthError),

	/// Connectivity faults persisted through every allowed attempt.
	#[error("Network connection lost after {attempts} attempts; check the connection.")]
	NetworkExhausted {
		/// Number of attempts performed before giving up.
		attempts: u32,
		/// Fault observed on the final attempt.
		#[source]
		source: TransportError,
	},
	/// Backend answered with a non-2xx status.
	#[error("{message}")]
	Api {
		/// HTTP status code.
		status: u16,
		/// Backend `detail` field, or the caller-supplied fallback.
		message: String,
	},
	/// Backend body could not be decoded into the requested type.
	#[error("Response body with status {status} could not be decoded.")]
	Decode {
		/// HTTP status code.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Returns `true` when the caller has to send the user back to the sign-in flow.
	pub fn is_unauthenticated(&self) -> bool {
		matches!(self, Self::Unauthenticated(_))
	}
}

/// Credential failures that end the current session.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// No access token is persisted.
	#[error("No access token is stored; sign in again.")]
	MissingAccessToken,
	/// Persisted access token is not a three-segment token with a decodable payload.
	#[error("Stored access token is malformed.")]
	MalformedAccessToken,
	/// Access token needs a refresh but no refresh token is persisted.
	#[error("No refresh token is stored; sign in again.")]
	MissingRefreshToken,
	/// Refresh endpoint rejected the refresh token.
	#[error("{detail}")]
	RefreshRejected {
		/// HTTP status code returned by the refresh endpoint.
		status: u16,
		/// Backend `detail` field, or a generic message.
		detail: String,
	},
	/// Refresh endpoint could not be reached.
	#[error("Refresh endpoint could not be reached.")]
	RefreshUnreachable {
		/// Transport failure raised by the refresh call.
		#[source]
		source: TransportError,
	},
	/// Refresh endpoint answered 2xx with a body that is not a session grant.
	#[error("Refresh endpoint returned a malformed session grant.")]
	RefreshResponseInvalid {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Configuration and request-construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] ::http::Error),
	/// Client configuration failed validation.
	#[error(transparent)]
	InvalidConfig(#[from] crate::config::ClientConfigError),
	/// Endpoint is not a relative path.
	#[error("Endpoint `{endpoint}` must be a path relative to the base URL.")]
	InvalidEndpoint {
		/// Offending endpoint string.
		endpoint: String,
	},
	/// Joined endpoint URL cannot be parsed.
	#[error("Endpoint `{endpoint}` does not form a valid URL.")]
	InvalidEndpointUrl {
		/// Offending endpoint string.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Caller-supplied header name or value is invalid.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Header name as supplied by the caller.
		name: String,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	RequestBody {
		/// Serializer failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The exchange could not be completed at all (DNS, refused connection, reset, timeout).
	#[error("Connection to the backend could not be established.")]
	Connectivity {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
	/// Any other transport failure (body read, protocol violation).
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a failure to complete the exchange.
	pub fn connectivity(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Connectivity { source: Box::new(src) }
	}

	/// Wraps any other transport-specific failure.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns `true` for faults that are eligible for the bounded network retry.
	pub fn is_connectivity(&self) -> bool {
		matches!(self, Self::Connectivity { .. })
	}
}

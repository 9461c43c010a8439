//! Caller-facing request and response values.
//!
//! [`ApiRequest`] describes a call relative to the configured base URL; the client turns it into
//! a transport request on every attempt, so retries always carry the current bearer token.
//! [`ApiResponse`] is the buffered result, returned as-is whatever its status; interpreting
//! status codes is left to the caller, with [`ApiResponse::error_for_status`] following the
//! backend's `{ "detail": ... }` error convention.

// crates.io
use ::http::{
	HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	http::{HttpRequest, HttpResponse},
};

const JSON: &str = "application/json";

/// Backend call relative to the configured base URL.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method (defaults to `GET`).
	pub method: Method,
	/// Path relative to the base URL, including any query string.
	pub endpoint: String,
	/// Caller headers; they replace the JSON defaults but never `Authorization`.
	pub headers: Vec<(String, String)>,
	/// Raw request body.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a request for `endpoint` with the provided method.
	pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
		Self { method, endpoint: endpoint.into(), headers: Vec::new(), body: None }
	}

	/// Shorthand for a `GET` request.
	pub fn get(endpoint: impl Into<String>) -> Self {
		Self::new(Method::GET, endpoint)
	}

	/// Shorthand for a `POST` request.
	pub fn post(endpoint: impl Into<String>) -> Self {
		Self::new(Method::POST, endpoint)
	}

	/// Shorthand for a `PUT` request.
	pub fn put(endpoint: impl Into<String>) -> Self {
		Self::new(Method::PUT, endpoint)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(endpoint: impl Into<String>) -> Self {
		Self::new(Method::DELETE, endpoint)
	}

	/// Adds a caller header. Later values for the same name win.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Sets a raw body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Serializes `body` as the JSON request body.
	pub fn json<T>(mut self, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		self.body =
			Some(serde_json::to_vec(body).map_err(|source| ConfigError::RequestBody { source })?);

		Ok(self)
	}

	/// Builds the transport request: JSON defaults, then caller headers, then the bearer token.
	pub(crate) fn to_http(
		&self,
		url: &Url,
		token: Option<&TokenSecret>,
	) -> Result<HttpRequest, ConfigError> {
		let mut headers = HeaderMap::new();

		headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
		headers.insert(ACCEPT, HeaderValue::from_static(JSON));

		for (name, value) in &self.headers {
			let invalid = || ConfigError::InvalidHeader { name: name.clone() };
			let name_parsed = HeaderName::try_from(name.as_str()).map_err(|_| invalid())?;
			let value_parsed = HeaderValue::try_from(value.as_str()).map_err(|_| invalid())?;

			if name_parsed == AUTHORIZATION {
				continue;
			}

			headers.insert(name_parsed, value_parsed);
		}

		if let Some(token) = token {
			let mut bearer = HeaderValue::try_from(token.bearer())
				.map_err(|_| ConfigError::InvalidHeader { name: AUTHORIZATION.to_string() })?;

			bearer.set_sensitive(true);
			headers.insert(AUTHORIZATION, bearer);
		}

		let mut builder = ::http::Request::builder().method(self.method.clone()).uri(url.as_str());

		if let Some(slot) = builder.headers_mut() {
			*slot = headers;
		}

		Ok(builder.body(self.body.clone().unwrap_or_default())?)
	}
}

/// Buffered backend response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Body as UTF-8 text, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON, reporting the failing path on error.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| Error::Decode { status: self.status.as_u16(), source })
	}

	/// Backend error message from a `{ "detail": ... }` body, if present.
	pub fn detail(&self) -> Option<String> {
		match serde_json::from_slice::<Value>(&self.body).ok()?.get_mut("detail")?.take() {
			Value::String(message) => Some(message),
			Value::Null => None,
			other => Some(other.to_string()),
		}
	}

	/// Passes 2xx responses through; otherwise fails with [`Error::Api`] carrying the backend
	/// `detail` or `fallback`.
	pub fn error_for_status(self, fallback: &str) -> Result<Self> {
		if self.is_success() {
			return Ok(self);
		}

		Err(Error::Api {
			status: self.status.as_u16(),
			message: self.detail().unwrap_or_else(|| fallback.to_owned()),
		})
	}
}
impl From<HttpResponse> for ApiResponse {
	fn from(response: HttpResponse) -> Self {
		let (parts, body) = response.into_parts();

		Self { status: parts.status, headers: parts.headers, body }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url() -> Url {
		Url::parse("http://localhost:8000/send/").expect("Test URL should parse.")
	}

	fn response(status: u16, body: &str) -> ApiResponse {
		ApiResponse {
			status: StatusCode::from_u16(status).expect("Test status should be valid."),
			headers: HeaderMap::new(),
			body: body.as_bytes().to_vec(),
		}
	}

	#[test]
	fn defaults_merge_with_caller_headers_but_not_authorization() {
		let token = TokenSecret::new("good-token");
		let request = ApiRequest::post("/send/")
			.header("accept", "text/html")
			.header("Authorization", "Bearer forged")
			.header("X-Trace", "abc")
			.json(&serde_json::json!({ "recipient": "0xabc", "amount": 5.0 }))
			.expect("JSON body should serialize.")
			.to_http(&url(), Some(&token))
			.expect("Request should build.");
		let headers = request.headers();

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.uri(), "http://localhost:8000/send/");
		assert_eq!(headers[CONTENT_TYPE], JSON);
		assert_eq!(headers[ACCEPT], "text/html");
		assert_eq!(headers[AUTHORIZATION], "Bearer good-token");
		assert!(headers[AUTHORIZATION].is_sensitive());
		assert_eq!(headers["x-trace"], "abc");
		assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
		assert_eq!(request.body().as_slice(), br#"{"amount":5.0,"recipient":"0xabc"}"#);
	}

	#[test]
	fn invalid_caller_headers_are_rejected() {
		let err = ApiRequest::get("/me/")
			.header("bad header", "x")
			.to_http(&url(), None)
			.expect_err("Header names with spaces are invalid.");

		assert!(matches!(err, ConfigError::InvalidHeader { ref name } if name == "bad header"));
	}

	#[test]
	fn detail_reads_backend_error_convention() {
		let rejected = response(400, r#"{"detail":"invalid token"}"#);
		let validation = response(422, r#"{"detail":[{"loc":["body"]}]}"#);

		assert_eq!(rejected.detail().as_deref(), Some("invalid token"));
		assert_eq!(validation.detail().as_deref(), Some(r#"[{"loc":["body"]}]"#));
		assert_eq!(response(500, "Internal Server Error").detail(), None);
		assert_eq!(response(400, r#"{"message":"nope"}"#).detail(), None);
	}

	#[test]
	fn error_for_status_prefers_detail_over_fallback() {
		let err = response(400, r#"{"detail":"Insufficient balance"}"#)
			.error_for_status("Transaction failed")
			.expect_err("400 should be an error.");

		assert!(matches!(
			err,
			Error::Api { status: 400, ref message } if message == "Insufficient balance"
		));

		let err = response(503, "")
			.error_for_status("Transaction failed")
			.expect_err("503 should be an error.");

		assert_eq!(err.to_string(), "Transaction failed");
		assert!(response(201, "{}").error_for_status("unused").is_ok());
	}

	#[test]
	fn json_decoding_reports_failing_path() {
		#[derive(Debug, Deserialize)]
		struct Balance {
			#[allow(dead_code)]
			balance: f64,
		}

		let err = response(200, r#"{"balance":"lots"}"#)
			.json::<Balance>()
			.expect_err("String balance should fail to decode.");

		match err {
			Error::Decode { status, source } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "balance");
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}
}

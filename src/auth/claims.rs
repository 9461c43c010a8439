//! Local introspection of compact three-segment access tokens.
//!
//! Only the payload segment is read and the signature is never verified; the expiry claim
//! decides whether a refresh is attempted before a call, nothing more. Every helper here is
//! total: malformed input yields `None` instead of an error.

// crates.io
use base64::{
	Engine as _,
	engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD},
};
use serde_json::Value;

/// Claims read from an access token payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenClaims {
	/// Expiry instant in Unix epoch seconds, when the payload carries a numeric `exp`.
	pub exp: Option<i64>,
	/// Subject claim, when present.
	pub sub: Option<String>,
}
impl TokenClaims {
	/// Returns `true` only when `exp` exists and is strictly before `now`.
	pub fn is_expired_at(&self, now: i64) -> bool {
		matches!(self.exp, Some(exp) if exp < now)
	}
}

/// Decodes the payload segment of `token`.
///
/// Returns `None` unless the token has exactly three dot-separated segments and the middle one
/// is base64 (URL-safe or standard alphabet, padding optional) encoding a non-null JSON value.
/// Claims are only read from objects; any other value yields empty claims.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
	let mut segments = token.split('.');
	let (Some(_header), Some(payload), Some(_signature), None) =
		(segments.next(), segments.next(), segments.next(), segments.next())
	else {
		return None;
	};
	let bytes = decode_segment(payload)?;
	let map = match serde_json::from_slice::<Value>(&bytes).ok()? {
		Value::Object(map) => map,
		Value::Null => return None,
		_ => return Some(TokenClaims::default()),
	};

	Some(TokenClaims {
		exp: map.get("exp").and_then(epoch_seconds),
		sub: map.get("sub").and_then(Value::as_str).map(ToOwned::to_owned),
	})
}

/// Returns the `exp` claim of `token`, or `None` for malformed tokens and tokens without one.
pub fn decode_expiry(token: &str) -> Option<i64> {
	decode_claims(token)?.exp
}

fn decode_segment(segment: &str) -> Option<Vec<u8>> {
	let trimmed = segment.trim_end_matches('=');

	if trimmed.is_empty() {
		return None;
	}

	URL_SAFE_NO_PAD.decode(trimmed).or_else(|_| STANDARD_NO_PAD.decode(trimmed)).ok()
}

fn epoch_seconds(value: &Value) -> Option<i64> {
	if let Some(secs) = value.as_i64() {
		return Some(secs);
	}

	let secs = value.as_f64()?;

	// Saturating float-to-int cast; fractional seconds round down.
	secs.is_finite().then(|| secs.floor() as i64)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn token(payload: &str) -> String {
		format!("header.{}.sig", URL_SAFE_NO_PAD.encode(payload))
	}

	#[test]
	fn far_future_and_far_past_expiries_decode() {
		assert_eq!(decode_expiry(&token(r#"{"exp":9999999999}"#)), Some(9_999_999_999));
		assert_eq!(decode_expiry(&token(r#"{"exp":1}"#)), Some(1));
	}

	#[test]
	fn expiry_comparison_is_strict() {
		let claims = TokenClaims { exp: Some(100), sub: None };

		assert!(claims.is_expired_at(101));
		assert!(!claims.is_expired_at(100));
		assert!(!claims.is_expired_at(99));
		assert!(!TokenClaims::default().is_expired_at(i64::MAX));
	}

	#[test]
	fn payload_without_exp_is_well_formed() {
		let claims = decode_claims(&token(r#"{"sub":"treasury"}"#))
			.expect("Payload without exp should still decode.");

		assert_eq!(claims.exp, None);
		assert_eq!(claims.sub.as_deref(), Some("treasury"));
	}

	#[test]
	fn fractional_and_non_numeric_exp_values() {
		assert_eq!(decode_expiry(&token(r#"{"exp":1700000000.9}"#)), Some(1_700_000_000));
		assert_eq!(decode_expiry(&token(r#"{"exp":"soon"}"#)), None);
		assert!(decode_claims(&token(r#"{"exp":"soon"}"#)).is_some());
	}

	#[test]
	fn padded_and_standard_alphabet_payloads_decode() {
		let standard = base64::engine::general_purpose::STANDARD.encode(r#"{"exp":77}"#);
		let padded = format!("h.{standard}.s");

		assert!(standard.ends_with("=="));
		assert_eq!(decode_expiry(&padded), Some(77));
	}

	#[test]
	fn non_object_payloads_carry_no_claims() {
		for payload in ["42", "[1,2,3]", r#""text""#, "true"] {
			assert_eq!(
				decode_claims(&token(payload)),
				Some(TokenClaims::default()),
				"`{payload}` should decode without claims."
			);
			assert_eq!(decode_expiry(&token(payload)), None);
		}
	}

	#[test]
	fn malformed_tokens_never_decode() {
		let cases = [
			String::new(),
			"opaque".to_owned(),
			"only.two".to_owned(),
			"a.b.c.d".to_owned(),
			"header..sig".to_owned(),
			"header.!!!.sig".to_owned(),
			token("not json"),
			token("null"),
		];

		for case in cases {
			assert_eq!(decode_claims(&case), None, "`{case}` should be rejected.");
		}
	}
}

//! The two recovery policies applied to every authorized call.
//!
//! They are deliberately independent values: [`TransientFaultRetry`] wraps the whole logical
//! call and only reacts to connectivity faults, while [`AuthRefreshRetry`] lives inside each
//! attempt and only reacts to 401 responses. Each exposes a pure decision method so its bound
//! can be tested without a transport.

// crates.io
use ::http::StatusCode;
// self
use crate::{_prelude::*, config::RetrySettings};

/// What the caller should do after a failed attempt.
#[derive(Debug)]
pub enum RetryDecision {
	/// Pause for the provided duration, then run the next attempt.
	RetryAfter(Duration),
	/// Stop and surface the error.
	GiveUp(Error),
}

/// Bounded, fixed-delay retry for exchanges that could not be completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransientFaultRetry {
	/// Total attempts, first one included.
	pub max_attempts: u32,
	/// Pause before every retry; it does not grow.
	pub delay: Duration,
}
impl TransientFaultRetry {
	/// Creates a policy allowing `max_attempts` total attempts.
	pub fn new(max_attempts: u32, delay: Duration) -> Self {
		Self { max_attempts: max_attempts.max(1), delay }
	}

	/// Decides what follows a failed `attempt` (1-based).
	///
	/// Only [`TransportError::Connectivity`](crate::error::TransportError::Connectivity) is retried. Once the bound is reached the fault is
	/// wrapped in [`Error::NetworkExhausted`]; every other error is handed back untouched.
	pub fn on_error(&self, attempt: u32, error: Error) -> RetryDecision {
		match error {
			Error::Transport(fault) if fault.is_connectivity() =>
				if attempt >= self.max_attempts {
					RetryDecision::GiveUp(Error::NetworkExhausted { attempts: attempt, source: fault })
				} else {
					RetryDecision::RetryAfter(self.delay)
				},
			other => RetryDecision::GiveUp(other),
		}
	}
}
impl Default for TransientFaultRetry {
	fn default() -> Self {
		let settings = RetrySettings::default();

		Self::new(settings.max_network_attempts, settings.network_retry_delay)
	}
}
impl From<&RetrySettings> for TransientFaultRetry {
	fn from(settings: &RetrySettings) -> Self {
		Self::new(settings.max_network_attempts, settings.network_retry_delay)
	}
}

/// Refresh-and-retry on 401, bounded per logical call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthRefreshRetry {
	/// Refreshes allowed per logical call.
	pub max_refreshes: u32,
}
impl AuthRefreshRetry {
	/// Creates a policy allowing `max_refreshes` refreshes per logical call.
	pub fn new(max_refreshes: u32) -> Self {
		Self { max_refreshes }
	}

	/// Returns `true` when a response with `status` should trigger a refresh and a resend,
	/// given that `refreshes_used` refreshes already happened during this logical call.
	pub fn should_refresh(&self, status: StatusCode, refreshes_used: u32) -> bool {
		status == StatusCode::UNAUTHORIZED && refreshes_used < self.max_refreshes
	}
}
impl Default for AuthRefreshRetry {
	fn default() -> Self {
		Self::new(RetrySettings::default().max_auth_refreshes)
	}
}
impl From<&RetrySettings> for AuthRefreshRetry {
	fn from(settings: &RetrySettings) -> Self {
		Self::new(settings.max_auth_refreshes)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::{AuthError, TransportError};

	fn refused() -> Error {
		TransportError::connectivity(std::io::Error::from(std::io::ErrorKind::ConnectionRefused))
			.into()
	}

	#[test]
	fn connectivity_faults_retry_until_the_third_attempt() {
		let policy = TransientFaultRetry::default();

		assert!(matches!(
			policy.on_error(1, refused()),
			RetryDecision::RetryAfter(delay) if delay == Duration::seconds(1)
		));
		assert!(matches!(
			policy.on_error(2, refused()),
			RetryDecision::RetryAfter(delay) if delay == Duration::seconds(1)
		));
		assert!(matches!(
			policy.on_error(3, refused()),
			RetryDecision::GiveUp(Error::NetworkExhausted { attempts: 3, .. })
		));
	}

	#[test]
	fn other_failures_are_never_retried() {
		let policy = TransientFaultRetry::default();
		let body_fault: Error =
			TransportError::network(std::io::Error::from(std::io::ErrorKind::InvalidData)).into();

		assert!(matches!(
			policy.on_error(1, body_fault),
			RetryDecision::GiveUp(Error::Transport(TransportError::Network { .. }))
		));
		assert!(matches!(
			policy.on_error(1, AuthError::MissingRefreshToken.into()),
			RetryDecision::GiveUp(Error::Unauthenticated(AuthError::MissingRefreshToken))
		));
	}

	#[test]
	fn single_attempt_policy_exhausts_immediately() {
		let policy = TransientFaultRetry::new(0, Duration::ZERO);

		assert_eq!(policy.max_attempts, 1);
		assert!(matches!(
			policy.on_error(1, refused()),
			RetryDecision::GiveUp(Error::NetworkExhausted { attempts: 1, .. })
		));
	}

	#[test]
	fn refresh_is_allowed_once_and_only_for_401() {
		let policy = AuthRefreshRetry::default();

		assert!(policy.should_refresh(StatusCode::UNAUTHORIZED, 0));
		assert!(!policy.should_refresh(StatusCode::UNAUTHORIZED, 1));
		assert!(!policy.should_refresh(StatusCode::FORBIDDEN, 0));
		assert!(!policy.should_refresh(StatusCode::OK, 0));
		assert!(!AuthRefreshRetry::new(0).should_refresh(StatusCode::UNAUTHORIZED, 0));
	}
}

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::{CallKind, CallOutcome};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"session_client_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a network retry via the global metrics recorder (when enabled).
pub fn record_network_retry(kind: CallKind) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("session_client_network_retry_total", "call" => kind.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = kind;
	}
}

/// Thread-safe counters for refreshes and retries.
#[derive(Debug, Default)]
pub struct ClientMetrics {
	refresh_attempts: AtomicU64,
	refresh_success: AtomicU64,
	refresh_failure: AtomicU64,
	auth_retries: AtomicU64,
	network_retries: AtomicU64,
}
impl ClientMetrics {
	/// Returns the total number of refresh requests sent.
	pub fn refresh_attempts(&self) -> u64 {
		self.refresh_attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes that rotated the session (including reuses of a token
	/// rotated by a concurrent caller).
	pub fn refresh_successes(&self) -> u64 {
		self.refresh_success.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes that ended the session.
	pub fn refresh_failures(&self) -> u64 {
		self.refresh_failure.load(Ordering::Relaxed)
	}

	/// Returns the number of requests resent after a 401.
	pub fn auth_retries(&self) -> u64 {
		self.auth_retries.load(Ordering::Relaxed)
	}

	/// Returns the number of attempts repeated after a connectivity fault.
	pub fn network_retries(&self) -> u64 {
		self.network_retries.load(Ordering::Relaxed)
	}

	pub(crate) fn record_refresh_attempt(&self) {
		self.refresh_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_success(&self) {
		self.refresh_success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_failure(&self) {
		self.refresh_failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_auth_retry(&self) {
		self.auth_retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_network_retry(&self) {
		self.network_retries.fetch_add(1, Ordering::Relaxed);
	}
}

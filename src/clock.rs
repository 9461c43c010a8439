//! Time capability injected into the client for expiry checks and retry pauses.

// std
use std::sync::atomic::{AtomicI64, Ordering};
// self
use crate::_prelude::*;

/// Boxed future returned by [`Clock::sleep`].
pub type SleepFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Source of wall-clock time and suspension.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Current instant in Unix epoch seconds.
	fn now_epoch_seconds(&self) -> i64;

	/// Suspends the caller for `duration`; negative durations complete immediately.
	fn sleep(&self, duration: Duration) -> SleepFuture;
}

/// Wall clock backed by [`OffsetDateTime::now_utc`] and the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now_epoch_seconds(&self) -> i64 {
		OffsetDateTime::now_utc().unix_timestamp()
	}

	fn sleep(&self, duration: Duration) -> SleepFuture {
		let wait = if duration.is_positive() { duration.unsigned_abs() } else { Default::default() };

		Box::pin(tokio::time::sleep(wait))
	}
}

/// Deterministic clock for tests and simulations.
///
/// Sleeping never blocks: the requested duration is recorded and the clock jumps forward by
/// the same amount, so code under test observes time passing without waiting for it.
#[derive(Debug, Default)]
pub struct ManualClock {
	now: AtomicI64,
	sleeps: Mutex<Vec<Duration>>,
}
impl ManualClock {
	/// Creates a clock pinned at `now` epoch seconds.
	pub fn new(now: i64) -> Self {
		Self { now: AtomicI64::new(now), sleeps: Default::default() }
	}

	/// Moves the clock to `now` epoch seconds.
	pub fn set(&self, now: i64) {
		self.now.store(now, Ordering::SeqCst);
	}

	/// Moves the clock forward by `delta`.
	pub fn advance(&self, delta: Duration) {
		self.now.fetch_add(delta.whole_seconds(), Ordering::SeqCst);
	}

	/// Durations passed to [`Clock::sleep`], in call order.
	pub fn sleeps(&self) -> Vec<Duration> {
		self.sleeps.lock().clone()
	}
}
impl Clock for ManualClock {
	fn now_epoch_seconds(&self) -> i64 {
		self.now.load(Ordering::SeqCst)
	}

	fn sleep(&self, duration: Duration) -> SleepFuture {
		self.sleeps.lock().push(duration);

		if duration.is_positive() {
			self.advance(duration);
		}

		Box::pin(std::future::ready(()))
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn system_clock_tracks_wall_time() {
		let floor = macros::datetime!(2024-01-01 00:00 UTC).unix_timestamp();

		assert!(SystemClock.now_epoch_seconds() > floor);
	}

	#[tokio::test]
	async fn manual_clock_records_and_advances_on_sleep() {
		let clock = ManualClock::new(1_000);

		clock.sleep(Duration::seconds(1)).await;
		clock.sleep(Duration::seconds(-5)).await;

		assert_eq!(clock.now_epoch_seconds(), 1_001);
		assert_eq!(clock.sleeps(), vec![Duration::seconds(1), Duration::seconds(-5)]);

		clock.set(50);
		clock.advance(Duration::minutes(1));

		assert_eq!(clock.now_epoch_seconds(), 110);
	}

	#[tokio::test]
	async fn system_clock_ignores_negative_sleeps() {
		SystemClock.sleep(Duration::seconds(-1)).await;
	}
}

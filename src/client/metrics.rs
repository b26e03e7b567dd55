// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing what the client has done so far.
#[derive(Debug, Default)]
pub struct ClientMetrics {
	refresh_attempts: AtomicU64,
	refresh_successes: AtomicU64,
	refresh_failures: AtomicU64,
	requests: AtomicU64,
	retries: AtomicU64,
	reauths: AtomicU64,
	throttles: AtomicU64,
}
impl ClientMetrics {
	/// Returns the total number of refresh attempts.
	pub fn refresh_attempts(&self) -> u64 {
		self.refresh_attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of successful refresh calls.
	pub fn refresh_successes(&self) -> u64 {
		self.refresh_successes.load(Ordering::Relaxed)
	}

	/// Returns the number of failed refresh calls.
	pub fn refresh_failures(&self) -> u64 {
		self.refresh_failures.load(Ordering::Relaxed)
	}

	/// Returns the number of logical requests registered with the rate limiter.
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Returns the number of backoff retries.
	pub fn retries(&self) -> u64 {
		self.retries.load(Ordering::Relaxed)
	}

	/// Returns the number of forced re-authentications triggered by a 401.
	pub fn reauths(&self) -> u64 {
		self.reauths.load(Ordering::Relaxed)
	}

	/// Returns the number of cool-down pauses imposed by the rate limiter.
	pub fn throttles(&self) -> u64 {
		self.throttles.load(Ordering::Relaxed)
	}

	pub(crate) fn record_refresh_attempt(&self) {
		self.refresh_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_success(&self) {
		self.refresh_successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_failure(&self) {
		self.refresh_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_retry(&self) {
		self.retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_reauth(&self) {
		self.reauths.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_throttle(&self) {
		self.throttles.fetch_add(1, Ordering::Relaxed);
	}
}

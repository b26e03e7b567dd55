//! Sliding-window request budgeting mirroring Strava's short (15 minute) and daily quotas.
//!
//! [`RateLimiter`] keeps one [`RateWindow`] per quota. Each window stores the timestamps of
//! requests that reached the provider; a check first purges timestamps older than the window's
//! retention and then admits the next request only while every window is strictly below its
//! limit. The limiter is a plain state machine with no interior locking, so shared use must go
//! through an external mutex (the client wraps it in [`parking_lot::Mutex`]).

// self
use crate::_prelude::*;

/// Request budgets enforced by [`RateLimiter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimits {
	/// Maximum requests inside the short window.
	pub short_limit: usize,
	/// Retention of the short window.
	pub short_window: Duration,
	/// Maximum requests inside the daily window.
	pub daily_limit: usize,
	/// Retention of the daily window.
	pub daily_window: Duration,
}
impl RateLimits {
	/// Overrides the short-window budget.
	pub fn with_short(mut self, limit: usize, window: Duration) -> Self {
		self.short_limit = limit;
		self.short_window = window;

		self
	}

	/// Overrides the daily budget.
	pub fn with_daily(mut self, limit: usize, window: Duration) -> Self {
		self.daily_limit = limit;
		self.daily_window = window;

		self
	}
}
impl Default for RateLimits {
	fn default() -> Self {
		Self {
			short_limit: 100,
			short_window: Duration::minutes(15),
			daily_limit: 1_000,
			daily_window: Duration::days(1),
		}
	}
}

/// Ordered timestamps of requests inside one trailing window.
#[derive(Clone, Debug)]
pub struct RateWindow {
	label: &'static str,
	limit: usize,
	retention: Duration,
	stamps: VecDeque<OffsetDateTime>,
}
impl RateWindow {
	/// Creates an empty window.
	pub fn new(label: &'static str, limit: usize, retention: Duration) -> Self {
		Self { label, limit, retention, stamps: VecDeque::new() }
	}

	/// Drops timestamps that are at least `retention` old.
	pub fn purge(&mut self, now: OffsetDateTime) {
		while let Some(oldest) = self.stamps.front() {
			if now - *oldest < self.retention {
				break;
			}

			self.stamps.pop_front();
		}
	}

	/// Returns `true` while the window can absorb another request.
	pub fn has_capacity(&self) -> bool {
		self.stamps.len() < self.limit
	}

	/// Number of retained timestamps.
	pub fn len(&self) -> usize {
		self.stamps.len()
	}

	/// Returns `true` when no timestamp is retained.
	pub fn is_empty(&self) -> bool {
		self.stamps.is_empty()
	}

	/// Instant when the oldest retained timestamp ages out.
	pub fn frees_at(&self) -> Option<OffsetDateTime> {
		self.stamps.front().map(|oldest| *oldest + self.retention)
	}

	fn record(&mut self, now: OffsetDateTime) {
		self.stamps.push_back(now);
	}
}

/// Result emitted by [`RateLimiter::evaluate_at`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
	/// The request may proceed immediately.
	Allow,
	/// The request should be delayed.
	Delay(RetryDirective),
}

/// Describes when a saturated window frees its next slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryDirective {
	/// Instant when the saturated window frees a slot.
	pub earliest_retry_at: OffsetDateTime,
	/// Time left until `earliest_retry_at`, measured from the evaluation instant.
	pub wait: Duration,
	/// Which window is saturated (`short_window` or `daily_window`).
	pub reason: &'static str,
}

/// Dual-window limiter (short + daily).
#[derive(Clone, Debug)]
pub struct RateLimiter {
	short: RateWindow,
	daily: RateWindow,
}
impl RateLimiter {
	/// Creates a limiter enforcing `limits`.
	pub fn new(limits: RateLimits) -> Self {
		Self {
			short: RateWindow::new("short_window", limits.short_limit, limits.short_window),
			daily: RateWindow::new("daily_window", limits.daily_limit, limits.daily_window),
		}
	}

	/// Purges stale timestamps and reports whether another request fits both budgets.
	pub fn can_make_request(&mut self) -> bool {
		self.can_make_request_at(OffsetDateTime::now_utc())
	}

	/// Clock-explicit variant of [`can_make_request`](Self::can_make_request).
	pub fn can_make_request_at(&mut self, now: OffsetDateTime) -> bool {
		self.short.purge(now);
		self.daily.purge(now);

		self.short.has_capacity() && self.daily.has_capacity()
	}

	/// Records a dispatched request in both windows.
	pub fn add_request(&mut self) {
		self.add_request_at(OffsetDateTime::now_utc());
	}

	/// Clock-explicit variant of [`add_request`](Self::add_request).
	pub fn add_request_at(&mut self, now: OffsetDateTime) {
		self.short.record(now);
		self.daily.record(now);
	}

	/// Same check as [`can_make_request_at`](Self::can_make_request_at), but explains a denial.
	pub fn evaluate_at(&mut self, now: OffsetDateTime) -> RateLimitDecision {
		if self.can_make_request_at(now) {
			return RateLimitDecision::Allow;
		}

		let saturated = [&self.short, &self.daily]
			.into_iter()
			.filter(|window| !window.has_capacity())
			.filter_map(|window| window.frees_at().map(|at| (window.label, at)))
			.max_by_key(|(_, at)| *at);

		match saturated {
			Some((reason, earliest_retry_at)) => RateLimitDecision::Delay(RetryDirective {
				earliest_retry_at,
				wait: earliest_retry_at - now,
				reason,
			}),
			// Zero limits leave nothing to age out.
			None => RateLimitDecision::Delay(RetryDirective {
				earliest_retry_at: now,
				wait: Duration::ZERO,
				reason: if self.short.has_capacity() { self.daily.label } else { self.short.label },
			}),
		}
	}

	/// Short window view.
	pub fn short_window(&self) -> &RateWindow {
		&self.short
	}

	/// Daily window view.
	pub fn daily_window(&self) -> &RateWindow {
		&self.daily
	}
}
impl Default for RateLimiter {
	fn default() -> Self {
		Self::new(RateLimits::default())
	}
}

//! Observability helpers for gateway operations.
//!
//! # Feature Flags
//!
//! - Spans named `strava_gateway.op` carry the `op` (operation) and `stage` (call site) fields and
//!   are always emitted through `tracing`.
//! - Enable `metrics` to increment the `strava_gateway_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Refresh-token exchange.
	Refresh,
	/// Authenticated REST call.
	Request,
	/// Most recent activities.
	RecentActivities,
	/// Paginated activity listing.
	Activities,
	/// Single activity.
	Activity,
	/// Athlete heart-rate and power zones.
	AthleteZones,
	/// Clubs the athlete belongs to.
	AthleteClubs,
	/// Single gear item.
	Gear,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Refresh => "refresh",
			OpKind::Request => "request",
			OpKind::RecentActivities => "recent_activities",
			OpKind::Activities => "activities",
			OpKind::Activity => "activity",
			OpKind::AthleteZones => "athlete_zones",
			OpKind::AthleteClubs => "athlete_clubs",
			OpKind::Gear => "gear",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

//! Typed views over the provider payloads served by [`StravaResources`](super::StravaResources).
//!
//! Every model keeps the fields the gateway reads as options and preserves the rest of the
//! payload in `extra`, so serializing a model back to JSON loses nothing the provider sent.

// self
use crate::_prelude::*;

/// First page of a listing.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller does not pick one.
pub const DEFAULT_PER_PAGE: u32 = 30;
/// Largest page size the provider accepts.
pub const MAX_PER_PAGE: u32 = 200;
/// Number of activities returned by the "recent activities" shortcut.
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

const ZONE_NAMES: [&str; 5] = ["Recovery", "Endurance", "Tempo", "Threshold", "Anaerobic"];

/// Human-readable name of the heart-rate zone at `index` (0-based).
pub fn zone_name(index: usize) -> &'static str {
	ZONE_NAMES.get(index).copied().unwrap_or("Unknown")
}

/// Summary or detailed activity record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
	/// Provider identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<u64>,
	/// Title given by the athlete.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Activity type (`Run`, `Ride`, `Swim`, ...).
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub activity_type: Option<String>,
	/// Distance in meters.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub distance: Option<f64>,
	/// Moving time in seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub moving_time: Option<f64>,
	/// Elapsed time in seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub elapsed_time: Option<f64>,
	/// Average heart rate in beats per minute.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub average_heartrate: Option<f64>,
	/// Start instant as reported by the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub start_date: Option<String>,
	/// Remaining provider fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}
impl Activity {
	/// Activity type, or an empty string when the provider omitted it.
	pub fn kind(&self) -> &str {
		self.activity_type.as_deref().unwrap_or_default()
	}
}

/// Filters and pagination for the activity listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityQuery {
	/// 1-based page number; defaults to [`DEFAULT_PAGE`].
	#[serde(default)]
	pub page: Option<u32>,
	/// Page size; defaults to [`DEFAULT_PER_PAGE`] and is capped at [`MAX_PER_PAGE`].
	#[serde(default)]
	pub per_page: Option<u32>,
	/// Only activities that started before this epoch second.
	#[serde(default)]
	pub before: Option<i64>,
	/// Only activities that started after this epoch second.
	#[serde(default)]
	pub after: Option<i64>,
}
impl ActivityQuery {
	/// Effective page number.
	pub fn page(&self) -> u32 {
		self.page.unwrap_or(DEFAULT_PAGE).max(1)
	}

	/// Effective page size.
	pub fn per_page(&self) -> u32 {
		self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
	}

	/// Outbound query parameters; absent time filters are omitted entirely.
	pub fn to_params(&self) -> Vec<(String, String)> {
		let mut params = vec![
			("page".to_owned(), self.page().to_string()),
			("per_page".to_owned(), self.per_page().to_string()),
		];

		if let Some(before) = self.before {
			params.push(("before".to_owned(), before.to_string()));
		}
		if let Some(after) = self.after {
			params.push(("after".to_owned(), after.to_string()));
		}

		params
	}
}

/// Heart-rate and power zones configured by the athlete.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AthleteZones {
	/// Heart-rate zones.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub heart_rate: Option<ZoneSet>,
	/// Power zones.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub power: Option<ZoneSet>,
	/// Remaining provider fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}
impl AthleteZones {
	/// Names every heart-rate zone `Z{n} - {name}`; power zones are left untouched.
	pub fn with_zone_names(mut self) -> Self {
		if let Some(heart_rate) = self.heart_rate.as_mut() {
			for (idx, zone) in heart_rate.zones.iter_mut().enumerate() {
				zone.name = Some(format!("Z{} - {}", idx + 1, zone_name(idx)));
			}
		}

		self
	}
}

/// Ordered zone boundaries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneSet {
	/// Whether the athlete customized the boundaries.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub custom_zones: Option<bool>,
	/// Zones from lowest to highest.
	#[serde(default)]
	pub zones: Vec<Zone>,
	/// Remaining provider fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

/// One zone; `max == -1` marks an open upper bound.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Zone {
	/// Lower bound.
	#[serde(default)]
	pub min: i64,
	/// Upper bound.
	#[serde(default)]
	pub max: i64,
	/// Display name added by the gateway.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}

/// Club membership summary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Club {
	/// Provider identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<u64>,
	/// Club name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Number of members.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub member_count: Option<u64>,
	/// Remaining provider fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

/// Bike or shoes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Gear {
	/// Provider identifier (`b…` for bikes, `g…` for shoes).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Display name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Accumulated distance in meters.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub distance: Option<f64>,
	/// Whether this is the athlete's default gear.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub primary: Option<bool>,
	/// Remaining provider fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

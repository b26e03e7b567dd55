// crates.io
use serde_json::json;
// self
use crate::{_prelude::*, error::ValidationError};

/// Tools served by [`StravaTools`](crate::tools::StravaTools).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolName {
	/// Most recent activities.
	GetRecentActivities,
	/// Paginated activity listing.
	GetActivities,
	/// Single activity.
	GetActivity,
	/// Heart-rate and power zones.
	GetAthleteZones,
	/// Club memberships.
	GetAthleteClubs,
	/// Single gear item.
	GetGear,
	/// Pace and effort of one activity.
	AnalyzeActivity,
	/// Aggregate load over caller-supplied activities.
	AnalyzeTrainingLoad,
	/// Advice based on the ten most recent activities.
	GetActivityRecommendations,
}
impl ToolName {
	/// Every tool, in catalog order.
	pub const ALL: [ToolName; 9] = [
		ToolName::GetRecentActivities,
		ToolName::GetActivities,
		ToolName::GetActivity,
		ToolName::GetAthleteZones,
		ToolName::GetAthleteClubs,
		ToolName::GetGear,
		ToolName::AnalyzeActivity,
		ToolName::AnalyzeTrainingLoad,
		ToolName::GetActivityRecommendations,
	];

	/// Wire name of the tool.
	pub const fn as_str(self) -> &'static str {
		match self {
			ToolName::GetRecentActivities => "get_recent_activities",
			ToolName::GetActivities => "get_activities",
			ToolName::GetActivity => "get_activity",
			ToolName::GetAthleteZones => "get_athlete_zones",
			ToolName::GetAthleteClubs => "get_athlete_clubs",
			ToolName::GetGear => "get_gear",
			ToolName::AnalyzeActivity => "analyze_activity",
			ToolName::AnalyzeTrainingLoad => "analyze_training_load",
			ToolName::GetActivityRecommendations => "get_activity_recommendations",
		}
	}

	/// One-line description shown to agents.
	pub const fn description(self) -> &'static str {
		match self {
			ToolName::GetRecentActivities => "List the athlete's most recent activities.",
			ToolName::GetActivities =>
				"List activities page by page, optionally filtered by start time.",
			ToolName::GetActivity => "Fetch a single activity with full detail.",
			ToolName::GetAthleteZones => "Fetch heart-rate and power zones.",
			ToolName::GetAthleteClubs => "List the clubs the athlete belongs to.",
			ToolName::GetGear => "Fetch a bike or a pair of shoes.",
			ToolName::AnalyzeActivity => "Compute pace and effort for one activity.",
			ToolName::AnalyzeTrainingLoad =>
				"Aggregate distance, time, and heart-rate bands over a list of activities.",
			ToolName::GetActivityRecommendations =>
				"Suggest training adjustments based on the ten most recent activities.",
		}
	}

	/// JSON schema of the tool's arguments.
	pub fn input_schema(self) -> Value {
		let id = json!({ "type": ["string", "integer"] });
		let int = json!({ "type": "integer" });

		match self {
			ToolName::GetRecentActivities => json!({
				"type": "object",
				"properties": { "limit": { "type": "integer", "minimum": 1, "maximum": 200 } },
			}),
			ToolName::GetActivities => json!({
				"type": "object",
				"properties": {
					"page": { "type": "integer", "minimum": 1 },
					"per_page": { "type": "integer", "minimum": 1, "maximum": 200 },
					"before": int,
					"after": int,
				},
			}),
			ToolName::GetActivity | ToolName::AnalyzeActivity => json!({
				"type": "object",
				"properties": { "activity_id": id },
				"required": ["activity_id"],
			}),
			ToolName::GetGear => json!({
				"type": "object",
				"properties": { "gear_id": { "type": "string" } },
				"required": ["gear_id"],
			}),
			ToolName::AnalyzeTrainingLoad => json!({
				"type": "object",
				"properties": { "activities": { "type": "array", "items": { "type": "object" } } },
				"required": ["activities"],
			}),
			ToolName::GetAthleteZones
			| ToolName::GetAthleteClubs
			| ToolName::GetActivityRecommendations => json!({ "type": "object", "properties": {} }),
		}
	}

	/// Catalog entry for this tool.
	pub fn spec(self) -> ToolSpec {
		ToolSpec {
			name: self.as_str(),
			description: self.description(),
			input_schema: self.input_schema(),
		}
	}
}
impl Display for ToolName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ToolName {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|tool| tool.as_str() == s)
			.ok_or_else(|| ValidationError::Unknown { kind: "tool", name: s.to_owned() })
	}
}

/// Tool description handed to a tool server for registration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolSpec {
	/// Wire name.
	pub name: &'static str,
	/// Human-readable description.
	pub description: &'static str,
	/// JSON schema of the arguments.
	pub input_schema: Value,
}

/// Resource URI templates accepted by
/// [`StravaTools::read_resource`](crate::tools::StravaTools::read_resource).
pub const RESOURCE_TEMPLATES: [&str; 5] = [
	"strava://activities",
	"strava://activities/{activity_id}",
	"strava://athlete/zones",
	"strava://athlete/clubs",
	"strava://gear/{gear_id}",
];

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn names_round_trip_through_from_str() {
		for tool in ToolName::ALL {
			assert_eq!(tool.as_str().parse::<ToolName>().ok(), Some(tool));
		}

		assert!(matches!(
			"delete_activity".parse::<ToolName>(),
			Err(ValidationError::Unknown { kind: "tool", .. })
		));
	}

	#[test]
	fn id_tools_require_their_identifier() {
		let schema = ToolName::GetActivity.input_schema();

		assert_eq!(schema["required"], json!(["activity_id"]));
		assert_eq!(ToolName::GetGear.spec().input_schema["required"], json!(["gear_id"]));
	}
}

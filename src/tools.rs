//! Name- and URI-addressed dispatch over the resource providers and the analytics.
//!
//! A tool server mounts [`StravaTools`] by registering every [`ToolSpec`] from
//! [`StravaTools::catalog`] and forwarding invocations to [`StravaTools::call`], and by forwarding
//! reads of the [`RESOURCE_TEMPLATES`] to [`StravaTools::read_resource`]. Both return plain JSON so
//! the surface stays independent of any particular protocol crate.

mod catalog;

pub use catalog::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	analytics,
	auth::{ActivityId, GearId},
	cache::ResponseCache,
	config::GatewayConfig,
	error::ValidationError,
	resources::{Activity, ActivityQuery, DEFAULT_RECENT_LIMIT, StravaResources},
};

const RESOURCE_SCHEME: &str = "strava://";

#[derive(Debug, Deserialize)]
struct RecentArgs {
	#[serde(default)]
	limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TrainingLoadArgs {
	activities: Vec<Activity>,
}

/// Tool and resource surface of the gateway.
#[derive(Clone, Debug)]
pub struct StravaTools {
	resources: StravaResources,
}
impl StravaTools {
	/// Wraps already-wired resource providers.
	pub fn new(resources: StravaResources) -> Self {
		Self { resources }
	}

	/// Wires a client and a cache from `config`.
	pub fn from_config(config: &GatewayConfig) -> Result<Self> {
		let client = Arc::new(config.build_client()?);
		let cache = Arc::new(ResponseCache::new(config.cache_ttl));

		Ok(Self::new(StravaResources::new(client, cache)))
	}

	/// Underlying resource providers.
	pub fn resources(&self) -> &StravaResources {
		&self.resources
	}

	/// Every tool with its description and argument schema.
	pub fn catalog() -> Vec<ToolSpec> {
		ToolName::ALL.into_iter().map(ToolName::spec).collect()
	}

	/// Invokes the tool called `name` with JSON `args` (an object, or `null` for no arguments).
	pub async fn call(&self, name: &str, args: Value) -> Result<Value> {
		let tool = name.parse::<ToolName>()?;

		tracing::debug!(tool = tool.as_str(), "tool invoked");

		match tool {
			ToolName::GetRecentActivities => {
				let args = decode_args::<RecentArgs>(args)?;

				to_json(&self.resources.recent_activities(args.limit).await?)
			},
			ToolName::GetActivities => {
				let query = decode_args::<ActivityQuery>(args)?;

				to_json(&self.resources.activities(query).await?)
			},
			ToolName::GetActivity => {
				let id = activity_id_arg(&args)?;

				to_json(&self.resources.activity(&id).await?)
			},
			ToolName::GetAthleteZones => to_json(&self.resources.athlete_zones().await?),
			ToolName::GetAthleteClubs => to_json(&self.resources.athlete_clubs().await?),
			ToolName::GetGear => {
				let id = gear_id_arg(&args)?;

				to_json(&self.resources.gear(&id).await?)
			},
			ToolName::AnalyzeActivity => {
				let id = activity_id_arg(&args)?;
				let activity = self.resources.activity(&id).await?;

				to_json(&analytics::analyze_activity(&activity))
			},
			ToolName::AnalyzeTrainingLoad => {
				let args = decode_args::<TrainingLoadArgs>(args)?;

				to_json(&analytics::analyze_training_load(&args.activities))
			},
			ToolName::GetActivityRecommendations => {
				let recent = self.resources.recent_activities(Some(DEFAULT_RECENT_LIMIT)).await?;

				to_json(&analytics::training_recommendations(&recent))
			},
		}
	}

	/// Reads a `strava://` resource.
	pub async fn read_resource(&self, uri: &str) -> Result<Value> {
		let unknown = || ValidationError::Unknown { kind: "resource", name: uri.to_owned() };
		let path = uri.strip_prefix(RESOURCE_SCHEME).ok_or_else(unknown)?;
		let segments = path.trim_end_matches('/').split('/').collect::<Vec<_>>();

		tracing::debug!(uri, "resource read");

		match segments.as_slice() {
			["activities"] => to_json(&self.resources.recent_activities(None).await?),
			["activities", id] => {
				let id = ActivityId::new(id)
					.map_err(|e| ValidationError::invalid_argument("activity_id", e.to_string()))?;

				to_json(&self.resources.activity(&id).await?)
			},
			["athlete", "zones"] => to_json(&self.resources.athlete_zones().await?),
			["athlete", "clubs"] => to_json(&self.resources.athlete_clubs().await?),
			["gear", id] => {
				let id = GearId::new(id)
					.map_err(|e| ValidationError::invalid_argument("gear_id", e.to_string()))?;

				to_json(&self.resources.gear(&id).await?)
			},
			_ => Err(unknown().into()),
		}
	}
}

fn decode_args<T>(args: Value) -> Result<T>
where
	T: DeserializeOwned,
{
	let args = match args {
		Value::Null => Value::Object(Default::default()),
		Value::Object(_) => args,
		_ =>
			return Err(ValidationError::invalid_argument("arguments", "expected an object").into()),
	};

	serde_path_to_error::deserialize(args).map_err(|e| {
		ValidationError::invalid_argument(e.path().to_string(), e.inner().to_string()).into()
	})
}

/// Accepts the identifier as a JSON string or a non-negative integer.
fn activity_id_arg(args: &Value) -> Result<ActivityId> {
	let invalid = |reason: String| ValidationError::invalid_argument("activity_id", reason);

	match args.get("activity_id") {
		Some(Value::String(raw)) =>
			ActivityId::new(raw.trim()).map_err(|e| invalid(e.to_string()).into()),
		Some(Value::Number(n)) => n
			.as_u64()
			.map(ActivityId::from)
			.ok_or_else(|| invalid("expected a non-negative integer".into()).into()),
		Some(_) => Err(invalid("expected a string or an integer".into()).into()),
		None => Err(invalid("missing".into()).into()),
	}
}

fn gear_id_arg(args: &Value) -> Result<GearId> {
	let invalid = |reason: String| ValidationError::invalid_argument("gear_id", reason);

	match args.get("gear_id") {
		Some(Value::String(raw)) =>
			GearId::new(raw.trim()).map_err(|e| invalid(e.to_string()).into()),
		Some(_) => Err(invalid("expected a string".into()).into()),
		None => Err(invalid("missing".into()).into()),
	}
}

fn to_json<T>(value: &T) -> Result<Value>
where
	T: Serialize,
{
	serde_path_to_error::serialize(value, serde_json::value::Serializer)
		.map_err(|source| ValidationError::Malformed { source, status: None }.into())
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn activity_ids_accept_strings_and_integers() {
		let from_string = activity_id_arg(&json!({ "activity_id": "13743554839" }))
			.expect("String identifiers should be accepted.");
		let from_int = activity_id_arg(&json!({ "activity_id": 13743554839_u64 }))
			.expect("Integer identifiers should be accepted.");

		assert_eq!(from_string, from_int);

		for bad in [json!({}), json!({ "activity_id": -1 }), json!({ "activity_id": "12a" })] {
			assert!(matches!(
				activity_id_arg(&bad),
				Err(Error::Validation(ValidationError::InvalidArgument { .. }))
			));
		}
	}

	#[test]
	fn argument_errors_name_the_offending_field() {
		let err = decode_args::<ActivityQuery>(json!({ "per_page": "many" }))
			.expect_err("A string page size must be rejected.");

		match err {
			Error::Validation(ValidationError::InvalidArgument { name, .. }) =>
				assert_eq!(name, "per_page"),
			other => panic!("Unexpected error: {other:?}."),
		}

		assert!(decode_args::<ActivityQuery>(Value::Null).is_ok());
		assert!(decode_args::<ActivityQuery>(json!([1, 2])).is_err());
	}

	#[test]
	fn catalog_lists_every_tool_once() {
		let names = StravaTools::catalog().into_iter().map(|spec| spec.name).collect::<Vec<_>>();

		assert_eq!(names.len(), ToolName::ALL.len());
		assert!(names.contains(&"get_activity_recommendations"));
	}
}

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use strava_gateway::{_preludet::*, error::ValidationError, tools::RESOURCE_TEMPLATES};

const WEEK: &str = r#"[
	{"id": 1, "type": "Run", "distance": 8000.0, "moving_time": 2400, "average_heartrate": 112.0},
	{"id": 2, "type": "Run", "distance": 5000.0, "moving_time": 1500, "average_heartrate": 158.0},
	{"id": 3, "type": "Ride", "distance": 30000.0, "moving_time": 3600, "average_heartrate": 131.0}
]"#;

#[tokio::test]
async fn analyze_activity_fetches_then_computes() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v3/activities/42");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id":42,"type":"Run","distance":10000.0,"moving_time":3000,"average_heartrate":142.0}"#);
		})
		.await;
	let tools = build_test_tools(&server.base_url(), "access-seed");
	let analysis = tools
		.call("analyze_activity", json!({ "activity_id": "42" }))
		.await
		.expect("Analysis should succeed.");

	mock.assert_async().await;

	assert_eq!(analysis["type"], "Run");
	assert_eq!(analysis["analysis"]["pace"], 5.0);
	assert_eq!(analysis["analysis"]["effort"], "Moderate");
}

#[tokio::test]
async fn recommendations_use_the_ten_most_recent_activities() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v3/athlete/activities").query_param("per_page", "10");
			then.status(200).header("content-type", "application/json").body(WEEK);
		})
		.await;
	let tools = build_test_tools(&server.base_url(), "access-seed");
	let advice = tools
		.call("get_activity_recommendations", Value::Null)
		.await
		.expect("Recommendations should succeed.");

	mock.assert_async().await;

	assert_eq!(advice["analysis"]["activities_count"], 3);
	assert_eq!(advice["summary"]["weekly_stats"]["activities"], 3);
	assert_eq!(advice["summary"]["intensity_distribution"]["easy"], "33%");

	let recommendations =
		advice["recommendations"].as_array().expect("Recommendations should be a list.");

	assert!(!recommendations.is_empty());
}

#[tokio::test]
async fn training_load_needs_no_provider_call() {
	let tools = build_test_tools("http://127.0.0.1:9", "access-seed");
	let activities = serde_json::from_str::<Value>(WEEK).expect("Fixture should parse.");
	let load = tools
		.call("analyze_training_load", json!({ "activities": activities }))
		.await
		.expect("Training load should succeed.");

	assert_eq!(load["activities_count"], 3);
	assert_eq!(load["total_distance"], 43.0);
	assert_eq!(load["activities_by_type"]["Run"], 2);
	assert_eq!(load["heart_rate_zones"], json!({ "easy": 1, "medium": 1, "hard": 1 }));
}

#[tokio::test]
async fn resources_dispatch_by_uri() {
	let server = MockServer::start_async().await;
	let zones_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v3/athlete/zones");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"heart_rate":{"zones":[{"min":0,"max":120}]}}"#);
		})
		.await;
	let gear_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v3/gear/g99");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id":"g99","name":"Trail Shoes"}"#);
		})
		.await;
	let tools = build_test_tools(&server.base_url(), "access-seed");
	let zones =
		tools.read_resource("strava://athlete/zones").await.expect("Zones resource should load.");
	let gear = tools.read_resource("strava://gear/g99").await.expect("Gear resource should load.");

	zones_mock.assert_async().await;
	gear_mock.assert_async().await;

	assert_eq!(zones["heart_rate"]["zones"][0]["name"], "Z1 - Recovery");
	assert_eq!(gear["name"], "Trail Shoes");
	assert_eq!(RESOURCE_TEMPLATES.len(), 5);
}

#[tokio::test]
async fn unknown_names_are_rejected_before_any_call() {
	let tools = build_test_tools("http://127.0.0.1:9", "access-seed");
	let err = tools.call("delete_activity", json!({})).await.expect_err("Unknown tool.");

	assert!(
		matches!(err, Error::Validation(ValidationError::Unknown { kind: "tool", .. })),
		"Unexpected error: {err:?}."
	);

	for uri in ["strava://segments/1", "https://www.strava.com/athlete/zones"] {
		let err = tools.read_resource(uri).await.expect_err("Unknown resource.");

		assert!(
			matches!(err, Error::Validation(ValidationError::Unknown { kind: "resource", .. })),
			"Unexpected error for {uri}: {err:?}."
		);
	}

	let err = tools
		.call("get_activity", json!({ "activity_id": "not-a-number" }))
		.await
		.expect_err("A malformed identifier must be rejected.");

	assert!(
		matches!(err, Error::Validation(ValidationError::InvalidArgument { .. })),
		"Unexpected error: {err:?}."
	);
}

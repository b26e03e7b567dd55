// crates.io
use httpmock::prelude::*;
// self
use strava_gateway::{
	_preludet::*,
	auth::{ActivityId, GearId},
	resources::ActivityQuery,
};

const ACTIVITIES: &str = r#"[
	{"id": 1, "name": "Morning Run", "type": "Run", "distance": 10000.0, "moving_time": 3000, "average_heartrate": 142.5, "kudos_count": 3},
	{"id": 2, "name": "Commute", "type": "Ride", "distance": 20000.0, "moving_time": 3600}
]"#;

#[tokio::test]
async fn recent_activities_are_cached_between_calls() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v3/athlete/activities")
				.query_param("per_page", "5")
				.header("authorization", "Bearer access-seed");
			then.status(200).header("content-type", "application/json").body(ACTIVITIES);
		})
		.await;
	let resources = build_test_resources(&server.base_url(), "access-seed");
	let first =
		resources.recent_activities(Some(5)).await.expect("First listing should succeed.");
	let second =
		resources.recent_activities(Some(5)).await.expect("Cached listing should succeed.");

	mock.assert_calls_async(1).await;

	assert_eq!(first, second);
	assert_eq!(first.len(), 2);
	assert_eq!(first[0].kind(), "Run");
	assert_eq!(first[0].extra.get("kudos_count"), Some(&Value::from(3)));
	assert_eq!(resources.cache().len(), 1);

	resources.clear_cache();
	resources.recent_activities(Some(5)).await.expect("Listing after a clear should succeed.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn recent_activities_default_to_ten() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v3/athlete/activities").query_param("per_page", "10");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let resources = build_test_resources(&server.base_url(), "access-seed");
	let activities =
		resources.recent_activities(None).await.expect("Default listing should succeed.");

	mock.assert_async().await;

	assert!(activities.is_empty());
}

#[tokio::test]
async fn activity_listing_caps_page_size_and_omits_absent_filters() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v3/athlete/activities")
				.query_param("page", "2")
				.query_param("per_page", "200")
				.query_param_missing("before")
				.query_param_missing("after");
			then.status(200).header("content-type", "application/json").body(ACTIVITIES);
		})
		.await;
	let resources = build_test_resources(&server.base_url(), "access-seed");
	let query = ActivityQuery { page: Some(2), per_page: Some(250), ..Default::default() };
	let activities = resources.activities(query).await.expect("Paged listing should succeed.");

	mock.assert_async().await;

	assert_eq!(activities.len(), 2);
}

#[tokio::test]
async fn activity_listing_forwards_time_filters() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v3/athlete/activities")
				.query_param("page", "1")
				.query_param("per_page", "30")
				.query_param("after", "1740000000")
				.query_param("before", "1740871740");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let resources = build_test_resources(&server.base_url(), "access-seed");
	let query = ActivityQuery {
		before: Some(1_740_871_740),
		after: Some(1_740_000_000),
		..Default::default()
	};

	resources.activities(query).await.expect("Filtered listing should succeed.");

	mock.assert_async().await;
}

#[tokio::test]
async fn athlete_zones_are_named() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v3/athlete/zones");
			then.status(200).header("content-type", "application/json").body(
				r#"{"heart_rate":{"custom_zones":false,"zones":[{"min":0,"max":115},{"min":115,"max":152},{"min":152,"max":171},{"min":171,"max":190},{"min":190,"max":-1}]}}"#,
			);
		})
		.await;
	let resources = build_test_resources(&server.base_url(), "access-seed");
	let zones = resources.athlete_zones().await.expect("Zones should load.");

	mock.assert_async().await;

	let names = zones
		.heart_rate
		.expect("Heart-rate zones should be present.")
		.zones
		.into_iter()
		.map(|zone| zone.name.expect("Every zone should be named."))
		.collect::<Vec<_>>();

	assert_eq!(
		names,
		[
			"Z1 - Recovery",
			"Z2 - Endurance",
			"Z3 - Tempo",
			"Z4 - Threshold",
			"Z5 - Anaerobic"
		]
	);
	assert!(zones.power.is_none());
}

#[tokio::test]
async fn clubs_activity_and_gear_hit_their_paths() {
	let server = MockServer::start_async().await;
	let clubs_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v3/athlete/clubs");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"[{"id":7,"name":"Lunch Runners","member_count":42}]"#);
		})
		.await;
	let activity_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v3/activities/13743554839");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id":13743554839,"name":"Long Run","type":"Run","distance":21097.5}"#);
		})
		.await;
	let gear_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v3/gear/b12345");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id":"b12345","name":"Road Bike","distance":1234567.0,"primary":true}"#);
		})
		.await;
	let resources = build_test_resources(&server.base_url(), "access-seed");
	let clubs = resources.athlete_clubs().await.expect("Clubs should load.");
	let activity = resources
		.activity(&ActivityId::from(13_743_554_839_u64))
		.await
		.expect("Activity should load.");
	let gear = resources
		.gear(&GearId::new("b12345").expect("Gear identifier should be valid."))
		.await
		.expect("Gear should load.");

	clubs_mock.assert_async().await;
	activity_mock.assert_async().await;
	gear_mock.assert_async().await;

	assert_eq!(clubs[0].member_count, Some(42));
	assert_eq!(activity.name.as_deref(), Some("Long Run"));
	assert_eq!(gear.primary, Some(true));
}

#[tokio::test]
async fn failed_calls_are_not_cached() {
	let server = MockServer::start_async().await;
	let failing = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v3/athlete/clubs");
			then.status(404).body("{\"message\":\"Record Not Found\"}");
		})
		.await;
	let resources = build_test_resources(&server.base_url(), "access-seed");
	let err = resources.athlete_clubs().await.expect_err("A 404 must fail.");

	assert!(matches!(err, Error::Provider { status: 404, .. }), "Unexpected error: {err:?}.");
	assert!(resources.cache().is_empty());

	failing.delete_async().await;

	let ok = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v3/athlete/clubs");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;

	resources.athlete_clubs().await.expect("The next call should reach the provider.");

	ok.assert_async().await;
}

#[tokio::test]
async fn bodies_that_do_not_fit_the_model_are_not_cached() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v3/activities/42");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id":"not-a-number","name":"Broken"}"#);
		})
		.await;
	let resources = build_test_resources(&server.base_url(), "access-seed");
	let id = ActivityId::from(42_u64);

	for _ in 0..2 {
		let err = resources.activity(&id).await.expect_err("A mistyped id must not decode.");

		assert!(matches!(err, Error::Validation(_)), "Unexpected error: {err:?}.");
	}

	mock.assert_calls_async(2).await;
	assert!(resources.cache().is_empty());
}

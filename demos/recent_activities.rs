//! Serves the recent-activities and recommendations tools against a mock provider, showing the
//! token refresh on first use and one cache entry per distinct listing query.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;
// self
use strava_gateway::{
	cache::ResponseCache, client::StravaClient, config::GatewayConfig, http::ReqwestHttpClient,
	reqwest::Client, resources::StravaResources, tools::StravaTools,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"refresh_token\":\"demo-refresh\",\"token_type\":\"Bearer\",\"expires_in\":21600}",
			);
		})
		.await;
	let activities_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v3/athlete/activities")
				.header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body(
				r#"[
					{"id": 1, "name": "Easy Run", "type": "Run", "distance": 6000.0, "moving_time": 2100, "average_heartrate": 118.0},
					{"id": 2, "name": "Intervals", "type": "Run", "distance": 8000.0, "moving_time": 2400, "average_heartrate": 161.0},
					{"id": 3, "name": "Commute", "type": "Ride", "distance": 15000.0, "moving_time": 2700}
				]"#,
			);
		})
		.await;
	let api_base = server.url("/api/v3");
	let token_url = server.url("/oauth/token");
	let config = GatewayConfig::from_lookup(|name| {
		let value = match name {
			"STRAVA_CLIENT_ID" => "demo-client",
			"STRAVA_CLIENT_SECRET" => "demo-secret",
			"STRAVA_REFRESH_TOKEN" => "demo-seed",
			"STRAVA_API_BASE" => api_base.as_str(),
			"STRAVA_TOKEN_URL" => token_url.as_str(),
			_ => return None,
		};

		Some(value.to_owned())
	})?;
	// The mock server presents a self-signed certificate.
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let client = StravaClient::with_http_client(
		config.credentials.clone(),
		config.settings.clone(),
		config.token_state(),
		http_client,
	)?;
	let resources =
		StravaResources::new(Arc::new(client), Arc::new(ResponseCache::new(config.cache_ttl)));
	let tools = StravaTools::new(resources);

	for spec in StravaTools::catalog() {
		println!("Tool {}: {}", spec.name, spec.description);
	}

	let recent = tools.call("get_recent_activities", json!({ "limit": 3 })).await?;

	println!("Recent activities: {}.", serde_json::to_string_pretty(&recent)?);

	let advice = tools.call("get_activity_recommendations", json!({})).await?;

	println!("Recommendations: {}.", serde_json::to_string_pretty(&advice["recommendations"])?);

	token_mock.assert_calls_async(1).await;
	// `limit: 3` and the default of ten are different pages, so both reach the provider.
	activities_mock.assert_calls_async(2).await;

	Ok(())
}

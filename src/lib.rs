//! Strava tool gateway for agent servers: OAuth refresh with transparent re-authentication,
//! dual-window rate limiting, and a TTL response cache behind a tool/resource dispatch surface.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod analytics;
pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod limiter;
pub mod oauth;
pub mod obs;
pub mod resources;
pub mod tools;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{Credentials, TokenState},
		cache::ResponseCache,
		client::{ClientSettings, RetryPolicy, StravaClient},
		http::ReqwestHttpClient,
		resources::StravaResources,
		tools::StravaTools,
	};

	/// Client identifier used by every test fixture.
	pub const TEST_CLIENT_ID: &str = "client-test";
	/// Client secret used by every test fixture.
	pub const TEST_CLIENT_SECRET: &str = "secret-test";
	/// Refresh token seeded into every test fixture.
	pub const TEST_REFRESH_TOKEN: &str = "refresh-seed";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Settings pointed at a mock server, with zero cool-down and millisecond backoff so tests
	/// never sleep for real.
	pub fn test_settings(server_base: &str) -> ClientSettings {
		let base = server_base.trim_end_matches('/');

		ClientSettings::new()
			.expect("Default settings should build.")
			.with_api_base(
				Url::parse(&format!("{base}/api/v3")).expect("Mock API base URL should parse."),
			)
			.with_token_url(
				Url::parse(&format!("{base}/oauth/token"))
					.expect("Mock token endpoint URL should parse."),
			)
			.with_cooldown(Duration::ZERO)
			.with_retry(RetryPolicy::new(3, Duration::milliseconds(1)))
	}

	/// Credentials shared by the test fixtures.
	pub fn test_credentials() -> Credentials {
		Credentials::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET, TEST_REFRESH_TOKEN)
	}

	/// Builds a client on the insecure test transport from explicit settings and token state.
	pub fn build_test_client_with(settings: ClientSettings, state: TokenState) -> StravaClient {
		StravaClient::with_http_client(
			test_credentials(),
			settings,
			state,
			test_reqwest_http_client(),
		)
		.expect("Test client should build.")
	}

	/// Builds a client with no cached access token.
	pub fn build_test_client(server_base: &str) -> StravaClient {
		build_test_client_with(test_settings(server_base), TokenState::new(TEST_REFRESH_TOKEN))
	}

	/// Builds a client seeded with an access token that stays valid for an hour.
	pub fn build_seeded_test_client(server_base: &str, access_token: &str) -> StravaClient {
		let state = TokenState::seeded(
			TEST_REFRESH_TOKEN,
			access_token,
			OffsetDateTime::now_utc() + Duration::hours(1),
		);

		build_test_client_with(test_settings(server_base), state)
	}

	/// Wires a seeded client into resources with a five-minute cache.
	pub fn build_test_resources(server_base: &str, access_token: &str) -> StravaResources {
		let client = Arc::new(build_seeded_test_client(server_base, access_token));
		let cache = Arc::new(ResponseCache::new(Duration::minutes(5)));

		StravaResources::new(client, cache)
	}

	/// Wires seeded resources into the tool surface.
	pub fn build_test_tools(server_base: &str, access_token: &str) -> StravaTools {
		StravaTools::new(build_test_resources(server_base, access_token))
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Method, StatusCode};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, strava_gateway as _, tracing_subscriber as _};

//! Environment-driven configuration.
//!
//! [`GatewayConfig::from_env`] loads an optional `.env` file through `dotenvy` and then reads:
//!
//! | variable | required | meaning |
//! | --- | --- | --- |
//! | `STRAVA_CLIENT_ID` | yes | OAuth client identifier |
//! | `STRAVA_CLIENT_SECRET` | yes | OAuth client secret |
//! | `STRAVA_REFRESH_TOKEN` | yes | long-lived refresh token |
//! | `STRAVA_ACCESS_TOKEN` | no | previously issued access token |
//! | `STRAVA_TOKEN_EXPIRES_AT` | no | expiry of that token in epoch seconds |
//! | `STRAVA_API_BASE` | no | REST base override |
//! | `STRAVA_TOKEN_URL` | no | token endpoint override |
//! | `STRAVA_CACHE_TTL_SECS` | no | response cache TTL |

// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret, TokenState},
	cache::DEFAULT_TTL,
	client::{ClientSettings, StravaClient},
	error::ConfigError,
};

/// Fully resolved gateway configuration.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
	/// Application credentials.
	pub credentials: Credentials,
	/// Access token seeded from the environment, with its expiry.
	pub seed: Option<(TokenSecret, OffsetDateTime)>,
	/// Client tunables.
	pub settings: ClientSettings,
	/// Response cache TTL.
	pub cache_ttl: Duration,
}
impl GatewayConfig {
	/// Reads configuration from the process environment after loading `.env`, if any.
	pub fn from_env() -> Result<Self, ConfigError> {
		match dotenvy::dotenv() {
			Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
			Err(e) if e.not_found() => tracing::debug!("no .env file found"),
			Err(e) => tracing::warn!(error = %e, "failed to load .env file"),
		}

		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads configuration through `lookup`, which maps a variable name to its value.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &'static str| {
			lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
		};
		let required = |name: &'static str| var(name).ok_or(ConfigError::MissingVar { name });
		let credentials = Credentials::new(
			required("STRAVA_CLIENT_ID")?,
			required("STRAVA_CLIENT_SECRET")?,
			required("STRAVA_REFRESH_TOKEN")?,
		);
		let seed = match var("STRAVA_ACCESS_TOKEN") {
			Some(access) => {
				let expires_at = match var("STRAVA_TOKEN_EXPIRES_AT") {
					Some(raw) => parse_epoch("STRAVA_TOKEN_EXPIRES_AT", &raw)?,
					// Without an expiry the seeded token is refreshed before first use.
					None => OffsetDateTime::UNIX_EPOCH,
				};

				Some((TokenSecret::new(access), expires_at))
			},
			None => None,
		};
		let mut settings = ClientSettings::new()?;

		if let Some(raw) = var("STRAVA_API_BASE") {
			settings = settings.with_api_base(parse_var_url("STRAVA_API_BASE", &raw)?);
		}
		if let Some(raw) = var("STRAVA_TOKEN_URL") {
			settings = settings.with_token_url(parse_var_url("STRAVA_TOKEN_URL", &raw)?);
		}

		let cache_ttl = match var("STRAVA_CACHE_TTL_SECS") {
			Some(raw) => {
				let secs = raw.parse::<u32>().map_err(|e| ConfigError::InvalidVar {
					name: "STRAVA_CACHE_TTL_SECS",
					reason: e.to_string(),
				})?;

				Duration::seconds(i64::from(secs))
			},
			None => DEFAULT_TTL,
		};

		Ok(Self { credentials, seed, settings, cache_ttl })
	}

	/// Initial token state: seeded when an access token was supplied, empty otherwise.
	pub fn token_state(&self) -> TokenState {
		let refresh = self.credentials.refresh_token.expose();

		match &self.seed {
			Some((access, expires_at)) => TokenState::seeded(refresh, access.expose(), *expires_at),
			None => TokenState::new(refresh),
		}
	}

	/// Builds the authenticated client described by this configuration.
	pub fn build_client(&self) -> Result<StravaClient> {
		StravaClient::with_token_state(
			self.credentials.clone(),
			self.settings.clone(),
			self.token_state(),
		)
	}
}

fn parse_epoch(name: &'static str, raw: &str) -> Result<OffsetDateTime, ConfigError> {
	// Accept `1740871740` as well as `1740871740.0`.
	let secs = raw
		.parse::<i64>()
		.or_else(|_| raw.parse::<f64>().map(|value| value.trunc() as i64))
		.map_err(|e| ConfigError::InvalidVar { name, reason: e.to_string() })?;

	OffsetDateTime::from_unix_timestamp(secs)
		.map_err(|e| ConfigError::InvalidVar { name, reason: e.to_string() })
}

fn parse_var_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|e| ConfigError::InvalidVar { name, reason: e.to_string() })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::TokenStatus;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars = vars
			.iter()
			.map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
			.collect::<HashMap<_, _>>();

		move |name: &str| vars.get(name).cloned()
	}

	const REQUIRED: [(&str, &str); 3] = [
		("STRAVA_CLIENT_ID", "test_id"),
		("STRAVA_CLIENT_SECRET", "test_secret"),
		("STRAVA_REFRESH_TOKEN", "test_refresh"),
	];

	#[test]
	fn minimal_environment_uses_defaults() {
		let config = GatewayConfig::from_lookup(lookup(&REQUIRED)).expect("Config should load.");

		assert_eq!(config.credentials.client_id, "test_id");
		assert_eq!(config.credentials.client_secret.expose(), "test_secret");
		assert!(config.seed.is_none());
		assert_eq!(config.cache_ttl, DEFAULT_TTL);
		assert_eq!(config.settings.api_base.as_str(), "https://www.strava.com/api/v3");
		assert_eq!(
			config.token_state().status_at(OffsetDateTime::now_utc(), Duration::ZERO),
			TokenStatus::NoToken
		);
	}

	#[test]
	fn missing_required_variable_is_reported_by_name() {
		for skipped in REQUIRED.map(|(name, _)| name) {
			let vars =
				REQUIRED.into_iter().filter(|(name, _)| *name != skipped).collect::<Vec<_>>();
			let err = GatewayConfig::from_lookup(lookup(&vars))
				.expect_err("A missing required variable must fail.");

			assert!(matches!(err, ConfigError::MissingVar { name } if name == skipped));
		}

		let mut blank = REQUIRED.to_vec();

		blank[0] = ("STRAVA_CLIENT_ID", "   ");

		assert!(matches!(
			GatewayConfig::from_lookup(lookup(&blank)),
			Err(ConfigError::MissingVar { name: "STRAVA_CLIENT_ID" })
		));
	}

	#[test]
	fn optional_variables_override_defaults() {
		let mut vars = REQUIRED.to_vec();

		vars.extend([
			("STRAVA_ACCESS_TOKEN", "test_access"),
			("STRAVA_TOKEN_EXPIRES_AT", "1740871740"),
			("STRAVA_API_BASE", "http://127.0.0.1:9000/api/v3"),
			("STRAVA_TOKEN_URL", "http://127.0.0.1:9000/oauth/token"),
			("STRAVA_CACHE_TTL_SECS", "60"),
		]);

		let config = GatewayConfig::from_lookup(lookup(&vars)).expect("Config should load.");
		let (access, expires_at) = config.seed.clone().expect("Access token should be seeded.");

		assert_eq!(access.expose(), "test_access");
		assert_eq!(expires_at.unix_timestamp(), 1_740_871_740);
		assert_eq!(config.settings.token_url.as_str(), "http://127.0.0.1:9000/oauth/token");
		assert_eq!(config.cache_ttl, Duration::seconds(60));
		assert_eq!(
			config.token_state().access_token.as_ref().map(|token| token.expose()),
			Some("test_access")
		);
	}

	#[test]
	fn malformed_optional_variables_are_rejected() {
		let mut vars = REQUIRED.to_vec();

		vars.push(("STRAVA_CACHE_TTL_SECS", "soon"));

		assert!(matches!(
			GatewayConfig::from_lookup(lookup(&vars)),
			Err(ConfigError::InvalidVar { name: "STRAVA_CACHE_TTL_SECS", .. })
		));

		let mut vars = REQUIRED.to_vec();

		vars.extend([("STRAVA_ACCESS_TOKEN", "a"), ("STRAVA_TOKEN_EXPIRES_AT", "tomorrow")]);

		assert!(matches!(
			GatewayConfig::from_lookup(lookup(&vars)),
			Err(ConfigError::InvalidVar { name: "STRAVA_TOKEN_EXPIRES_AT", .. })
		));
	}
}

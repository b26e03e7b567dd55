//! Authenticated REST client composing the token state, the rate limiter, and the transport.
//!
//! [`StravaClient`] owns the only [`TokenState`] in the process. The async mutex around it doubles
//! as the refresh guard, so concurrent callers that find an expired token wait for a single
//! in-flight refresh instead of racing the token endpoint. The [`RateLimiter`] sits behind a
//! synchronous mutex that is never held across an `.await`.

mod metrics;
mod request;

pub use metrics::*;
pub use request::*;

// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret, TokenState, TokenStatus},
	error::ConfigError,
	http::ReqwestHttpClient,
	limiter::{RateLimitDecision, RateLimiter, RateLimits},
	oauth::RefreshFacade,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Default REST base.
pub const DEFAULT_API_BASE: &str = "https://www.strava.com/api/v3";
/// Default OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://www.strava.com/oauth/token";

/// Bounded exponential backoff for transient failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total attempts per logical request, the first one included.
	pub max_attempts: u32,
	/// Delay before the second attempt; doubles for every further attempt.
	pub base_delay: Duration,
}
impl RetryPolicy {
	/// Creates a policy; `max_attempts` is clamped to at least one.
	pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
		Self { max_attempts: max_attempts.max(1), base_delay }
	}

	/// Delay to wait after the failed `attempt` (1-based): `base * 2^(attempt - 1)`.
	pub fn delay_for(&self, attempt: u32) -> Duration {
		let exponent = attempt.saturating_sub(1).min(16);

		self.base_delay * 2_u32.pow(exponent)
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(3, Duration::seconds(1))
	}
}

/// Tunables for [`StravaClient`].
#[derive(Clone, Debug)]
pub struct ClientSettings {
	/// REST base that relative request paths are appended to.
	pub api_base: Url,
	/// OAuth token endpoint.
	pub token_url: Url,
	/// Tokens expiring within this lookahead are refreshed before use.
	pub refresh_buffer: Duration,
	/// Fixed pause taken when the local rate limiter denies a request.
	pub cooldown: Duration,
	/// Backoff for transport failures and 5xx responses.
	pub retry: RetryPolicy,
	/// Request budgets.
	pub limits: RateLimits,
}
impl ClientSettings {
	/// Strava production endpoints with the default refresh buffer, cool-down, retry policy, and
	/// budgets.
	pub fn new() -> Result<Self, ConfigError> {
		Ok(Self {
			api_base: parse_url("API base", DEFAULT_API_BASE)?,
			token_url: parse_url("token endpoint", DEFAULT_TOKEN_URL)?,
			refresh_buffer: Duration::minutes(5),
			cooldown: Duration::seconds(60),
			retry: RetryPolicy::default(),
			limits: RateLimits::default(),
		})
	}

	/// Overrides the REST base.
	pub fn with_api_base(mut self, api_base: Url) -> Self {
		self.api_base = api_base;

		self
	}

	/// Overrides the token endpoint.
	pub fn with_token_url(mut self, token_url: Url) -> Self {
		self.token_url = token_url;

		self
	}

	/// Overrides the expiry lookahead.
	pub fn with_refresh_buffer(mut self, refresh_buffer: Duration) -> Self {
		self.refresh_buffer = refresh_buffer;

		self
	}

	/// Overrides the throttle cool-down.
	pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
		self.cooldown = cooldown;

		self
	}

	/// Overrides the retry policy.
	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Overrides the request budgets.
	pub fn with_limits(mut self, limits: RateLimits) -> Self {
		self.limits = limits;

		self
	}
}

/// OAuth-aware REST client with rate limiting, retry, and transparent re-authentication.
pub struct StravaClient {
	http: ReqwestHttpClient,
	refresher: RefreshFacade,
	settings: ClientSettings,
	token: AsyncMutex<TokenState>,
	limiter: Mutex<RateLimiter>,
	metrics: Arc<ClientMetrics>,
}
impl StravaClient {
	/// Creates a client that obtains its first access token on demand.
	pub fn new(credentials: Credentials, settings: ClientSettings) -> Result<Self> {
		let state = TokenState::new(credentials.refresh_token.expose());

		Self::with_token_state(credentials, settings, state)
	}

	/// Creates a client starting from a previously issued token state.
	pub fn with_token_state(
		credentials: Credentials,
		settings: ClientSettings,
		state: TokenState,
	) -> Result<Self> {
		let http = ReqwestHttpClient::build_default()?;

		Self::with_http_client(credentials, settings, state, http)
	}

	/// Creates a client on top of a caller-supplied transport.
	pub fn with_http_client(
		credentials: Credentials,
		settings: ClientSettings,
		state: TokenState,
		http: ReqwestHttpClient,
	) -> Result<Self> {
		if credentials.client_id.is_empty() {
			return Err(ConfigError::MissingVar { name: "client_id" }.into());
		}

		let refresher = RefreshFacade::new(&settings.token_url, &credentials, http.clone())?;
		let limiter = Mutex::new(RateLimiter::new(settings.limits));

		Ok(Self {
			http,
			refresher,
			settings,
			token: AsyncMutex::new(state),
			limiter,
			metrics: Default::default(),
		})
	}

	/// Effective settings.
	pub fn settings(&self) -> &ClientSettings {
		&self.settings
	}

	/// Shared counters.
	pub fn metrics(&self) -> Arc<ClientMetrics> {
		Arc::clone(&self.metrics)
	}

	/// Snapshot of the current token state.
	pub async fn token_state(&self) -> TokenState {
		self.token.lock().await.clone()
	}

	/// Token lifecycle status using the configured lookahead.
	pub async fn token_status(&self) -> TokenStatus {
		self.token.lock().await.status_at(OffsetDateTime::now_utc(), self.settings.refresh_buffer)
	}

	/// Returns a usable access token, refreshing first when none is cached or it is about to
	/// expire.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		let mut state = self.token.lock().await;

		if let Some(token) = state.usable_at(OffsetDateTime::now_utc(), self.settings.refresh_buffer)
		{
			return Ok(token.clone());
		}

		self.refresh_locked(&mut state, "access_token").await
	}

	/// Refreshes unconditionally.
	pub async fn force_refresh(&self) -> Result<TokenSecret> {
		let mut state = self.token.lock().await;

		self.refresh_locked(&mut state, "force_refresh").await
	}

	/// Replaces a token the provider rejected.
	///
	/// When another caller has already rotated `rejected` away, the newer token is returned
	/// without contacting the token endpoint again.
	pub async fn reauthenticate(&self, rejected: &TokenSecret) -> Result<TokenSecret> {
		let mut state = self.token.lock().await;
		let now = OffsetDateTime::now_utc();

		if let Some(current) = state.usable_at(now, self.settings.refresh_buffer)
			&& current != rejected
		{
			tracing::debug!("access token already rotated by a concurrent caller");

			return Ok(current.clone());
		}

		self.refresh_locked(&mut state, "reauthenticate").await
	}

	async fn refresh_locked(
		&self,
		state: &mut TokenState,
		stage: &'static str,
	) -> Result<TokenSecret> {
		let span = OpSpan::new(OpKind::Refresh, stage);

		self.metrics.record_refresh_attempt();
		obs::record_op_outcome(OpKind::Refresh, OpOutcome::Attempt);

		span.instrument(async {
			self.throttle().await;

			let outcome = self.refresher.refresh(&state.refresh_token).await;

			if outcome.dispatched {
				self.register_request();
			}

			match outcome.result {
				Ok(tokens) => {
					let now = OffsetDateTime::now_utc();
					let rotated = tokens.refresh_token.is_some();

					state.apply(tokens, now);
					self.metrics.record_refresh_success();
					obs::record_op_outcome(OpKind::Refresh, OpOutcome::Success);
					tracing::info!(
						expires_at = state.expires_at.unix_timestamp(),
						rotated,
						"access token refreshed"
					);

					state.access_token.clone().ok_or_else(|| {
						crate::error::ValidationError::MissingField { field: "access_token" }
							.into()
					})
				},
				Err(err) => {
					self.metrics.record_refresh_failure();
					obs::record_op_outcome(OpKind::Refresh, OpOutcome::Failure);
					tracing::warn!(error = %err, "token refresh failed");

					Err(err)
				},
			}
		})
		.await
	}

	/// Takes the fixed cool-down once when the limiter denies the next request.
	async fn throttle(&self) {
		let decision = self.limiter.lock().evaluate_at(OffsetDateTime::now_utc());

		if let RateLimitDecision::Delay(directive) = decision {
			self.metrics.record_throttle();
			tracing::warn!(
				reason = directive.reason,
				frees_in_secs = directive.wait.whole_seconds(),
				cooldown_secs = self.settings.cooldown.whole_seconds(),
				"rate limit reached; cooling down"
			);

			pause(self.settings.cooldown).await;
		}
	}

	fn register_request(&self) {
		self.limiter.lock().add_request();
		self.metrics.record_request();
	}
}
impl Debug for StravaClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StravaClient")
			.field("settings", &self.settings)
			.field("refresher", &self.refresher)
			.finish_non_exhaustive()
	}
}

pub(crate) fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { name, source })
}

pub(crate) async fn pause(duration: Duration) {
	if duration.is_positive() {
		tokio::time::sleep(duration.unsigned_abs()).await;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn retry_delays_double_from_the_base() {
		let policy = RetryPolicy::default();

		assert_eq!(policy.max_attempts, 3);
		assert_eq!(policy.delay_for(1), Duration::seconds(1));
		assert_eq!(policy.delay_for(2), Duration::seconds(2));
		assert_eq!(policy.delay_for(3), Duration::seconds(4));
		assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
	}

	#[test]
	fn default_settings_point_at_strava() {
		let settings = ClientSettings::new().expect("Default settings should build.");

		assert_eq!(settings.api_base.as_str(), DEFAULT_API_BASE);
		assert_eq!(settings.token_url.as_str(), DEFAULT_TOKEN_URL);
		assert_eq!(settings.refresh_buffer, Duration::seconds(300));
		assert_eq!(settings.cooldown, Duration::seconds(60));
		assert_eq!(settings.limits, RateLimits::default());
	}

	#[test]
	fn empty_client_id_is_rejected() {
		let settings = ClientSettings::new().expect("Default settings should build.");
		let err = StravaClient::new(Credentials::new("", "secret", "refresh"), settings)
			.expect_err("An empty client id must be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::MissingVar { name: "client_id" })));
	}

	#[tokio::test]
	async fn seeded_token_is_served_without_refresh() {
		let state = TokenState::seeded(
			"refresh",
			"access-seeded",
			OffsetDateTime::now_utc() + Duration::hours(2),
		);
		let client = StravaClient::with_token_state(
			Credentials::new("id", "secret", "refresh"),
			ClientSettings::new().expect("Default settings should build."),
			state,
		)
		.expect("Client should build.");
		let token = client.access_token().await.expect("Seeded token should be served.");

		assert_eq!(token.expose(), "access-seeded");
		assert_eq!(client.token_status().await, TokenStatus::Valid);
		assert_eq!(client.metrics().refresh_attempts(), 0);
	}
}

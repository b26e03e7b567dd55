//! Mutable token state owned by the authenticated client.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Lifecycle status of the access token at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// No access token has been issued yet.
	NoToken,
	/// Access token is usable.
	Valid,
	/// Access token reached (or is about to reach) its expiry.
	Expired,
}

/// Tokens returned by a successful refresh, ready to be applied to a [`TokenState`].
#[derive(Clone)]
pub struct RefreshedTokens {
	/// Newly minted access token.
	pub access_token: TokenSecret,
	/// Rotated refresh token, when the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Expiry instant reported by the provider.
	pub expires_at: OffsetDateTime,
}
impl Debug for RefreshedTokens {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshedTokens")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Current access/refresh token pair and expiry.
///
/// The state only changes through [`TokenState::apply`], which the client calls after a
/// successful refresh; failed refreshes leave it untouched.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenState {
	/// Access token secret, absent until the first refresh (or seeding).
	pub access_token: Option<TokenSecret>,
	/// Expiry instant of `access_token` as reported by the provider.
	pub expires_at: OffsetDateTime,
	/// Refresh token used to mint new access tokens.
	pub refresh_token: TokenSecret,
	/// Instant of the last successful refresh performed by this process.
	pub refreshed_at: Option<OffsetDateTime>,
}
impl TokenState {
	/// Creates a state with no access token.
	pub fn new(refresh_token: impl Into<String>) -> Self {
		Self {
			access_token: None,
			expires_at: OffsetDateTime::UNIX_EPOCH,
			refresh_token: TokenSecret::new(refresh_token),
			refreshed_at: None,
		}
	}

	/// Creates a state seeded with a previously issued access token.
	pub fn seeded(
		refresh_token: impl Into<String>,
		access_token: impl Into<String>,
		expires_at: OffsetDateTime,
	) -> Self {
		Self {
			access_token: Some(TokenSecret::new(access_token)),
			expires_at,
			refresh_token: TokenSecret::new(refresh_token),
			refreshed_at: None,
		}
	}

	/// Computes the lifecycle status at `now`, treating tokens inside `buffer` of their
	/// expiry as expired.
	pub fn status_at(&self, now: OffsetDateTime, buffer: Duration) -> TokenStatus {
		// An expiry too close to the representable minimum has no room for the buffer.
		let deadline = self.expires_at.checked_sub(buffer);

		match (&self.access_token, deadline) {
			(None, _) => TokenStatus::NoToken,
			(Some(_), Some(deadline)) if now < deadline => TokenStatus::Valid,
			(Some(_), _) => TokenStatus::Expired,
		}
	}

	/// Returns the access token when it is still valid at `now` with the lookahead `buffer`.
	pub fn usable_at(&self, now: OffsetDateTime, buffer: Duration) -> Option<&TokenSecret> {
		match self.status_at(now, buffer) {
			TokenStatus::Valid => self.access_token.as_ref(),
			TokenStatus::NoToken | TokenStatus::Expired => None,
		}
	}

	/// Replaces the token pair with the result of a successful refresh.
	pub fn apply(&mut self, refreshed: RefreshedTokens, now: OffsetDateTime) {
		self.access_token = Some(refreshed.access_token);
		self.expires_at = refreshed.expires_at;

		if let Some(refresh) = refreshed.refresh_token {
			self.refresh_token = refresh;
		}

		self.refreshed_at = Some(now);
	}
}
impl Debug for TokenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenState")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("refresh_token", &"<redacted>")
			.field("refreshed_at", &self.refreshed_at)
			.finish()
	}
}

//! Refresh-token exchange against the provider's OAuth token endpoint.
//!
//! The exchange is delegated to the `oauth2` crate with client credentials sent in the request
//! body (`client_id`, `client_secret`, `refresh_token`, `grant_type=refresh_token`). Strava
//! reports an absolute `expires_at` alongside the standard fields, so the token response type
//! carries it as an extra field.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, ExtraTokenFields,
	HttpClientError, RefreshToken, RequestTokenError, StandardRevocableToken,
	StandardTokenResponse, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, RefreshedTokens, TokenSecret},
	error::{ConfigError, TransportError, ValidationError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
};

/// Provider-specific fields returned next to the standard OAuth token response.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StravaTokenFields {
	/// Absolute expiry in epoch seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<i64>,
	/// Summary of the athlete that owns the token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub athlete: Option<Value>,
}
impl ExtraTokenFields for StravaTokenFields {}

/// Token response shape returned by the provider.
pub type StravaTokenResponse = StandardTokenResponse<StravaTokenFields, BasicTokenType>;

type RefreshClient = oauth2::Client<
	BasicErrorResponse,
	StravaTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;

/// Outcome of a refresh attempt, including whether the request reached the provider.
#[derive(Debug)]
pub struct RefreshOutcome {
	/// Parsed tokens or a classified failure.
	pub result: Result<RefreshedTokens>,
	/// `true` when the provider answered (any status), so the call counts against quotas.
	pub dispatched: bool,
}

/// Refresh-grant client bound to one token endpoint and credential set.
pub struct RefreshFacade {
	oauth_client: RefreshClient,
	http_client: ReqwestHttpClient,
}
impl RefreshFacade {
	/// Builds the facade for `token_url`.
	pub fn new(
		token_url: &Url,
		credentials: &Credentials,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let token_url = TokenUrl::new(token_url.to_string())
			.map_err(|source| ConfigError::InvalidUrl { name: "token endpoint", source })?;
		let client_id = ClientId::new(credentials.client_id.clone());
		let oauth_client: RefreshClient = oauth2::Client::new(client_id)
			.set_client_secret(ClientSecret::new(credentials.client_secret.expose().to_owned()))
			.set_auth_type(AuthType::RequestBody)
			.set_token_uri(token_url);

		Ok(Self { oauth_client, http_client })
	}

	/// Exchanges `refresh_token` for a new access token.
	pub async fn refresh(&self, refresh_token: &TokenSecret) -> RefreshOutcome {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let secret = RefreshToken::new(refresh_token.expose().to_owned());
		let response =
			self.oauth_client.exchange_refresh_token(&secret).request_async(&instrumented).await;
		let meta = meta.take();
		let dispatched = meta.as_ref().is_some_and(|value| value.status.is_some());
		let result = match response {
			Ok(response) => map_token_response(response, OffsetDateTime::now_utc()),
			Err(err) => Err(map_request_error(meta.as_ref(), err)),
		};

		RefreshOutcome { result, dispatched }
	}
}
impl Debug for RefreshFacade {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshFacade")
			.field("token_url", &self.oauth_client.token_uri().as_str())
			.finish()
	}
}

/// Converts a successful token response into [`RefreshedTokens`].
///
/// The provider's absolute `expires_at` wins; `expires_in` relative to `now` is the fallback.
pub(crate) fn map_token_response(
	response: StravaTokenResponse,
	now: OffsetDateTime,
) -> Result<RefreshedTokens> {
	let access_token = response.access_token().secret();

	if access_token.is_empty() {
		return Err(ValidationError::MissingField { field: "access_token" }.into());
	}

	let expires_at = match (response.extra_fields().expires_at, response.expires_in()) {
		(Some(epoch), _) => OffsetDateTime::from_unix_timestamp(epoch)
			.map_err(|_| ValidationError::ExpiryOutOfRange)?,
		(None, Some(delta)) => {
			let secs =
				i64::try_from(delta.as_secs()).map_err(|_| ValidationError::ExpiryOutOfRange)?;

			now.checked_add(Duration::seconds(secs)).ok_or(ValidationError::ExpiryOutOfRange)?
		},
		(None, None) => return Err(ValidationError::MissingField { field: "expires_at" }.into()),
	};
	let refresh_token = response
		.refresh_token()
		.map(|token| token.secret())
		.filter(|token| !token.is_empty())
		.map(TokenSecret::new);

	Ok(RefreshedTokens {
		access_token: TokenSecret::new(access_token.to_owned()),
		refresh_token,
		expires_at,
	})
}

fn map_request_error(
	meta: Option<&ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let status = meta.and_then(|value| value.status);
	let retry_after = meta.and_then(|value| value.retry_after);

	match err {
		RequestTokenError::ServerResponse(response) => {
			let reason = match response.error_description() {
				Some(description) => format!("{}: {description}", response.error().as_ref()),
				None => response.error().as_ref().to_owned(),
			};

			classify_token_status(status.unwrap_or(400), reason, retry_after)
		},
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(source, body) => match status {
			Some(code) if !(200..300).contains(&code) => classify_token_status(
				code,
				crate::error::body_preview(&body),
				retry_after,
			),
			_ => ValidationError::Malformed { source, status }.into(),
		},
		RequestTokenError::Other(message) => match status {
			// A 2xx reply `oauth2` refused to read, e.g. one with an unexpected content type.
			Some(code) if (200..300).contains(&code) => ValidationError::UnexpectedResponse {
				reason: message,
				status: Some(code),
			}
			.into(),
			Some(code) => classify_token_status(code, message, retry_after),
			None => TransportError::token_endpoint(std::io::Error::other(message)).into(),
		},
	}
}

/// Token endpoint failures: client/grant problems are authorization failures.
fn classify_token_status(status: u16, reason: String, retry_after: Option<Duration>) -> Error {
	match status {
		400 | 401 | 403 => Error::Auth { reason, status: Some(status) },
		429 => Error::RateLimit { status, retry_after },
		_ => Error::Provider { status, message: reason },
	}
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) if inner.is_builder() => ConfigError::from(*inner).into(),
		HttpClientError::Reqwest(inner) => TransportError::token_endpoint(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) =>
			TransportError::token_endpoint(std::io::Error::other(message)).into(),
		_ => TransportError::token_endpoint(std::io::Error::other(
			"unrecognized HTTP client failure",
		))
		.into(),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn parse(body: &str) -> StravaTokenResponse {
		serde_json::from_str(body).expect("Token response fixture should parse.")
	}

	#[test]
	fn absolute_expiry_wins_over_relative() {
		let now = macros::datetime!(2025-02-01 00:00 UTC);
		let response = parse(
			r#"{"token_type":"Bearer","access_token":"a1","refresh_token":"r1","expires_at":1740871740,"expires_in":21600}"#,
		);
		let tokens = map_token_response(response, now).expect("Response should map to tokens.");

		assert_eq!(tokens.access_token.expose(), "a1");
		assert_eq!(tokens.refresh_token.as_ref().map(TokenSecret::expose), Some("r1"));
		assert_eq!(tokens.expires_at.unix_timestamp(), 1_740_871_740);
	}

	#[test]
	fn relative_expiry_is_the_fallback() {
		let now = macros::datetime!(2025-02-01 00:00 UTC);
		let response = parse(r#"{"token_type":"bearer","access_token":"a1","expires_in":3600}"#);
		let tokens = map_token_response(response, now).expect("Response should map to tokens.");

		assert_eq!(tokens.expires_at, now + Duration::hours(1));
		assert!(tokens.refresh_token.is_none());
	}

	#[test]
	fn missing_expiry_is_a_validation_error() {
		let now = macros::datetime!(2025-02-01 00:00 UTC);
		let response = parse(r#"{"token_type":"Bearer","access_token":"a1"}"#);
		let err = map_token_response(response, now).expect_err("Expiry is required.");

		assert!(matches!(
			err,
			Error::Validation(ValidationError::MissingField { field: "expires_at" })
		));
	}

	#[test]
	fn token_endpoint_statuses_are_classified() {
		assert!(matches!(
			classify_token_status(400, "invalid refresh_token".into(), None),
			Error::Auth { status: Some(400), .. }
		));
		assert!(matches!(
			classify_token_status(429, "slow down".into(), None),
			Error::RateLimit { status: 429, .. }
		));
		assert!(matches!(
			classify_token_status(503, "maintenance".into(), None),
			Error::Provider { status: 503, .. }
		));
	}

	#[test]
	fn unreadable_replies_never_invent_a_status() {
		let other = || -> BasicRequestTokenError<HttpClientError<ReqwestError>> {
			RequestTokenError::Other("unexpected response content type".into())
		};
		let ok = ResponseMetadata { status: Some(200), retry_after: None };
		let err = map_request_error(Some(&ok), other());

		assert!(matches!(
			err,
			Error::Validation(ValidationError::UnexpectedResponse { status: Some(200), .. })
		));
		assert_eq!(err.status(), Some(200));

		let err = map_request_error(None, other());

		assert!(matches!(err, Error::Network(TransportError::Network { .. })));
		assert_eq!(err.status(), None);

		let throttled = ResponseMetadata { status: Some(429), retry_after: None };

		assert!(matches!(
			map_request_error(Some(&throttled), other()),
			Error::RateLimit { status: 429, .. }
		));
	}
}

//! Gateway-level error taxonomy shared by the client, resources, and tool surface.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS) with no response from the provider.
	#[error(transparent)]
	Network(#[from] TransportError),
	/// Provider answered with a success status but the payload is unusable.
	#[error(transparent)]
	Validation(#[from] ValidationError),

	/// Provider rejected the credentials or the access token.
	#[error("Provider rejected authorization: {reason}.")]
	Auth {
		/// Provider- or gateway-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Provider throttled the request after local admission.
	#[error("Provider rate limit exceeded (HTTP {status}).")]
	RateLimit {
		/// HTTP status code returned by the provider.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Any other non-success response.
	#[error("Provider returned HTTP {status}: {message}.")]
	Provider {
		/// HTTP status code returned by the provider.
		status: u16,
		/// Preview of the response body.
		message: String,
	},
}
impl Error {
	/// Classifies a non-success API response into the taxonomy.
	pub fn from_status(status: u16, body: &[u8], retry_after: Option<Duration>) -> Self {
		let preview = body_preview(body);

		match status {
			401 => Self::Auth {
				reason: if preview.is_empty() { "access token rejected".into() } else { preview },
				status: Some(status),
			},
			429 => Self::RateLimit { status, retry_after },
			_ => Self::Provider { status, message: preview },
		}
	}

	/// Returns the provider status code carried by the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Auth { status, .. } => *status,
			Self::RateLimit { status, .. } | Self::Provider { status, .. } => Some(*status),
			Self::Validation(
				ValidationError::Malformed { status, .. }
				| ValidationError::UnexpectedResponse { status, .. },
			) => *status,
			_ => None,
		}
	}

	/// Returns `true` when the failure is worth retrying with backoff.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Network(_) => true,
			Self::Provider { status, .. } => *status >= 500,
			_ => false,
		}
	}
}

/// Configuration and validation failures raised before any request is made.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A configured endpoint is not a valid URL.
	#[error("The {name} URL is invalid.")]
	InvalidUrl {
		/// Which endpoint failed to parse.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},

	/// A required environment variable is absent or empty.
	#[error("Environment variable `{name}` is required.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// An environment variable is present but cannot be interpreted.
	#[error("Environment variable `{name}` is invalid: {reason}.")]
	InvalidVar {
		/// Variable name.
		name: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {target}.")]
	Network {
		/// Human-readable label of the endpoint being called.
		target: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error raised against the REST API.
	pub fn api(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { target: "the Strava API", source: Box::new(src) }
	}

	/// Wraps a transport-specific network error raised against the token endpoint.
	pub fn token_endpoint(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { target: "the token endpoint", source: Box::new(src) }
	}
}

/// Success responses (or caller input) that do not carry what the gateway needs.
#[derive(Debug, ThisError)]
pub enum ValidationError {
	/// Response body could not be decoded into the expected shape.
	#[error("Response body is malformed.")]
	Malformed {
		/// Structured parsing failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Response could not be interpreted at all (wrong content type, unreadable framing).
	#[error("Response is unusable: {reason}.")]
	UnexpectedResponse {
		/// What made the response unusable.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// A required field is absent from the response.
	#[error("Response is missing the `{field}` field.")]
	MissingField {
		/// Field name.
		field: &'static str,
	},
	/// The token response carried an expiry that cannot be represented.
	#[error("Token expiry is out of range.")]
	ExpiryOutOfRange,
	/// A tool or resource invocation carried bad input.
	#[error("Invalid argument `{name}`: {reason}.")]
	InvalidArgument {
		/// Argument name.
		name: String,
		/// Why the value was rejected.
		reason: String,
	},
	/// The tool name or resource URI is not served by the gateway.
	#[error("Unknown {kind} `{name}`.")]
	Unknown {
		/// `tool` or `resource`.
		kind: &'static str,
		/// Requested name or URI.
		name: String,
	},
}
impl ValidationError {
	/// Shorthand for [`ValidationError::InvalidArgument`].
	pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidArgument { name: name.into(), reason: reason.into() }
	}
}

/// Truncates a response body into a single-line preview suitable for error messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let text = text.trim();

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.to_owned();
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_classification_matches_taxonomy() {
		let auth = Error::from_status(401, b"unauthorized", None);

		assert!(matches!(auth, Error::Auth { status: Some(401), .. }));
		assert!(auth.to_string().contains("unauthorized"));

		let throttled = Error::from_status(429, b"rate limit", Some(Duration::seconds(15)));

		assert!(matches!(
			throttled,
			Error::RateLimit { status: 429, retry_after: Some(d) } if d == Duration::seconds(15)
		));

		let server = Error::from_status(500, b"server error", None);

		assert_eq!(server.status(), Some(500));
		assert!(server.to_string().contains("server error"));
		assert!(server.is_transient());

		let missing = Error::from_status(404, b"not found", None);

		assert_eq!(missing.status(), Some(404));
		assert!(!missing.is_transient());
	}

	#[test]
	fn network_errors_are_transient_without_status() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "network down");
		let err = Error::from(TransportError::from(io));

		assert!(err.is_transient());
		assert_eq!(err.status(), None);
	}

	#[test]
	fn body_preview_truncates_long_payloads() {
		let body = "x".repeat(BODY_PREVIEW_LIMIT + 10);
		let preview = body_preview(body.as_bytes());

		assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}
}

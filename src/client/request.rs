//! Request/response types and the retry state machine behind [`StravaClient::make_request`].

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::{StravaClient, parse_url, pause},
	error::{TransportError, ValidationError},
	http::parse_retry_after,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Outbound REST call description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
	method: Method,
	path: String,
	query: Vec<(String, String)>,
}
impl ApiRequest {
	/// Starts a `GET` request for `path`, either relative to the API base or absolute.
	pub fn get(path: impl Into<String>) -> Self {
		Self { method: Method::GET, path: path.into(), query: Vec::new() }
	}

	/// Appends a query parameter.
	pub fn query(mut self, name: impl Into<String>, value: impl Display) -> Self {
		self.query.push((name.into(), value.to_string()));

		self
	}

	/// Appends every pair from an already-built parameter list.
	pub fn params<I>(mut self, pairs: I) -> Self
	where
		I: IntoIterator<Item = (String, String)>,
	{
		self.query.extend(pairs);

		self
	}

	/// HTTP method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Path or absolute URL as supplied.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Query parameters in insertion order.
	pub fn query_pairs(&self) -> &[(String, String)] {
		&self.query
	}
}

/// Successful (2xx) provider response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Decodes the body, reporting the JSON path of any shape mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			ValidationError::Malformed { source, status: Some(self.status.as_u16()) }.into()
		})
	}
}

impl StravaClient {
	/// Performs an authenticated request.
	///
	/// The loop below is the whole recovery policy:
	///
	/// - before every dispatch the rate limiter may impose one fixed cool-down;
	/// - the logical request is registered with the limiter on the first dispatch that yields a
	///   response;
	/// - a 401 triggers one forced re-authentication and one replay, a second 401 surfaces
	///   [`Error::Auth`];
	/// - transport failures and 5xx responses back off exponentially until the retry policy is
	///   exhausted;
	/// - 429 surfaces [`Error::RateLimit`] without a retry.
	pub async fn make_request(&self, request: ApiRequest) -> Result<ApiResponse> {
		let span = OpSpan::new(OpKind::Request, "make_request");

		obs::record_op_outcome(OpKind::Request, OpOutcome::Attempt);

		let result = span.instrument(self.execute(&request)).await;

		match &result {
			Ok(_) => obs::record_op_outcome(OpKind::Request, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(OpKind::Request, OpOutcome::Failure),
		}

		result
	}

	/// Resolves `path` against the API base unless it is already absolute.
	pub fn resolve_url(&self, path: &str) -> Result<Url> {
		if path.starts_with("http://") || path.starts_with("https://") {
			return Ok(parse_url("request", path)?);
		}

		let base = self.settings.api_base.as_str().trim_end_matches('/');
		let path = path.trim_start_matches('/');

		Ok(parse_url("request", &format!("{base}/{path}"))?)
	}

	async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let url = self.resolve_url(&request.path)?;
		let policy = self.settings.retry;
		let mut token = self.access_token().await?;
		let mut attempt = 1;
		let mut registered = false;
		let mut reauthenticated = false;

		loop {
			self.throttle().await;

			let failure = match self.dispatch(request, &url, &token).await {
				Dispatch::Success(response) => {
					self.register_once(&mut registered);

					return Ok(response);
				},
				Dispatch::Rejected { status, body, retry_after } => {
					self.register_once(&mut registered);

					if status == StatusCode::UNAUTHORIZED && !reauthenticated {
						reauthenticated = true;

						self.metrics.record_reauth();
						tracing::warn!(
							path = request.path.as_str(),
							"access token rejected; re-authenticating"
						);

						token = self.reauthenticate(&token).await?;

						continue;
					}

					Error::from_status(status.as_u16(), &body, retry_after)
				},
				Dispatch::Failed(err) => err,
			};

			if !failure.is_transient() || attempt >= policy.max_attempts {
				return Err(failure);
			}

			let delay = policy.delay_for(attempt);

			self.metrics.record_retry();
			tracing::warn!(
				path = request.path.as_str(),
				attempt,
				delay_ms = delay.whole_milliseconds() as u64,
				error = %failure,
				"transient failure; backing off"
			);

			pause(delay).await;

			attempt += 1;
		}
	}

	async fn dispatch(&self, request: &ApiRequest, url: &Url, token: &TokenSecret) -> Dispatch {
		let sent = self
			.http
			.request(request.method.clone(), url.clone())
			.bearer_auth(token.expose())
			.query(&request.query)
			.send()
			.await;
		let response = match sent {
			Ok(response) => response,
			Err(e) => return Dispatch::Failed(TransportError::api(e).into()),
		};
		let status = response.status();
		let retry_after = parse_retry_after(response.headers());
		let body = match response.bytes().await {
			Ok(body) => body.to_vec(),
			// The provider answered; losing the body is still a transport failure.
			Err(e) => return Dispatch::Failed(TransportError::api(e).into()),
		};

		if status.is_success() {
			Dispatch::Success(ApiResponse { status, body })
		} else {
			Dispatch::Rejected { status, body, retry_after }
		}
	}

	fn register_once(&self, registered: &mut bool) {
		if !*registered {
			*registered = true;

			self.register_request();
		}
	}
}

enum Dispatch {
	Success(ApiResponse),
	Rejected { status: StatusCode, body: Vec<u8>, retry_after: Option<Duration> },
	Failed(Error),
}

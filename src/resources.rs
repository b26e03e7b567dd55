//! Read-only resource providers backed by the response cache and the authenticated client.
//!
//! Every read follows the same path: build the cache key from the request path and all of its
//! query parameters, serve a fresh cached body when there is one, otherwise perform the
//! authenticated request, decode the JSON body into the typed model, and cache the raw body only
//! once decoding succeeded.
//! Operations run through [`call`], which owns the span, the outcome counter, and the failure log.

mod activities;
mod athlete;
mod gear;
mod models;

pub use models::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	cache::{CacheKey, ResponseCache},
	client::{ApiRequest, StravaClient},
	error::ValidationError,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Cache-aside accessors for activities, zones, clubs, and gear.
#[derive(Clone, Debug)]
pub struct StravaResources {
	client: Arc<StravaClient>,
	cache: Arc<ResponseCache>,
}
impl StravaResources {
	/// Wires the providers to a client and a cache.
	pub fn new(client: Arc<StravaClient>, cache: Arc<ResponseCache>) -> Self {
		Self { client, cache }
	}

	/// Underlying client.
	pub fn client(&self) -> &Arc<StravaClient> {
		&self.client
	}

	/// Underlying cache.
	pub fn cache(&self) -> &Arc<ResponseCache> {
		&self.cache
	}

	/// Drops every cached response.
	pub fn clear_cache(&self) {
		self.cache.clear();
	}

	async fn fetch<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let key = CacheKey::new(request.path()).params(request.query_pairs()).to_string();

		if let Some(body) = self.cache.get(&key) {
			return decode(body);
		}

		let body = self.client.make_request(request).await?.json::<Value>()?;
		// Only bodies that fit the model are cached.
		let value = decode(body.clone())?;

		self.cache.set(key, body);

		Ok(value)
	}
}

/// Runs one resource operation inside its span, recording the outcome and logging failures.
pub async fn call<T, F>(kind: OpKind, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	let span = OpSpan::new(kind, "resource");

	obs::record_op_outcome(kind, OpOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => obs::record_op_outcome(kind, OpOutcome::Success),
		Err(e) => {
			obs::record_op_outcome(kind, OpOutcome::Failure);
			tracing::error!(
				op = kind.as_str(),
				status = ?e.status(),
				error = %e,
				"resource call failed"
			);
		},
	}

	result
}

fn decode<T>(body: Value) -> Result<T>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(body)
		.map_err(|source| ValidationError::Malformed { source, status: None }.into())
}

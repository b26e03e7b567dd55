//! Thread-safe TTL cache for provider responses.
//!
//! Entries never count against a capacity; they disappear when a read finds them expired or
//! when [`ResponseCache::clear`] runs. Keys for list queries should come from [`CacheKey`] so
//! every filter and pagination combination maps to its own entry.

// self
use crate::_prelude::*;

/// Default time-to-live for cached responses.
pub const DEFAULT_TTL: Duration = Duration::minutes(5);

#[derive(Clone, Debug)]
struct CacheEntry<V> {
	value: V,
	stored_at: OffsetDateTime,
}

/// Key-value cache whose entries are visible while `now - stored_at < ttl`.
#[derive(Debug)]
pub struct ResponseCache<V = Value> {
	ttl: Duration,
	entries: Mutex<HashMap<String, CacheEntry<V>>>,
}
impl<V> ResponseCache<V>
where
	V: Clone,
{
	/// Creates an empty cache with the provided TTL.
	pub fn new(ttl: Duration) -> Self {
		tracing::debug!(ttl_secs = ttl.whole_seconds(), "response cache initialized");

		Self { ttl, entries: Default::default() }
	}

	/// Configured time-to-live.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Returns the cached value when present and fresh.
	pub fn get(&self, key: &str) -> Option<V> {
		self.get_at(key, OffsetDateTime::now_utc())
	}

	/// Clock-explicit variant of [`get`](Self::get); evicts the entry when it has expired.
	pub fn get_at(&self, key: &str, now: OffsetDateTime) -> Option<V> {
		let mut entries = self.entries.lock();
		let fresh = entries.get(key).map(|entry| now - entry.stored_at < self.ttl);

		match fresh {
			Some(true) => {
				tracing::debug!(key, "cache hit");

				entries.get(key).map(|entry| entry.value.clone())
			},
			Some(false) => {
				entries.remove(key);
				tracing::debug!(key, "cache expired");

				None
			},
			None => {
				tracing::debug!(key, "cache miss");

				None
			},
		}
	}

	/// Stores `value` under `key`, replacing any previous entry.
	pub fn set(&self, key: impl Into<String>, value: V) {
		self.set_at(key, value, OffsetDateTime::now_utc());
	}

	/// Clock-explicit variant of [`set`](Self::set).
	pub fn set_at(&self, key: impl Into<String>, value: V, now: OffsetDateTime) {
		let key = key.into();

		tracing::debug!(key = key.as_str(), "cache set");

		self.entries.lock().insert(key, CacheEntry { value, stored_at: now });
	}

	/// Removes every entry.
	pub fn clear(&self) {
		self.entries.lock().clear();

		tracing::info!("response cache cleared");
	}

	/// Number of stored entries, including expired ones not yet evicted.
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}
}
impl<V> Default for ResponseCache<V>
where
	V: Clone,
{
	fn default() -> Self {
		Self::new(DEFAULT_TTL)
	}
}

/// Builder for cache keys that are a stable function of every query parameter.
///
/// Parameters are sorted by name, and absent optional parameters are skipped, so
/// `activities?page=2&per_page=30` never collides with `activities?after=..&page=2&per_page=30`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheKey {
	namespace: String,
	params: BTreeMap<String, String>,
}
impl CacheKey {
	/// Starts a key for the provided namespace (usually the request path).
	pub fn new(namespace: impl Into<String>) -> Self {
		Self { namespace: namespace.into(), params: BTreeMap::new() }
	}

	/// Adds a parameter.
	pub fn param(mut self, name: impl Into<String>, value: impl Display) -> Self {
		self.params.insert(name.into(), value.to_string());

		self
	}

	/// Adds a parameter only when `value` is present.
	pub fn param_opt(self, name: impl Into<String>, value: Option<impl Display>) -> Self {
		match value {
			Some(value) => self.param(name, value),
			None => self,
		}
	}

	/// Adds every pair from an already-built parameter list.
	pub fn params<'a, I>(mut self, pairs: I) -> Self
	where
		I: IntoIterator<Item = &'a (String, String)>,
	{
		for (name, value) in pairs {
			self.params.insert(name.clone(), value.clone());
		}

		self
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.namespace)?;

		for (idx, (name, value)) in self.params.iter().enumerate() {
			let sep = if idx == 0 { '?' } else { '&' };

			write!(f, "{sep}{name}={value}")?;
		}

		Ok(())
	}
}
impl From<CacheKey> for String {
	fn from(value: CacheKey) -> Self {
		value.to_string()
	}
}

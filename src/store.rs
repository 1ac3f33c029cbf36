//! Storage contract and built-in implementation for pending authentication requests.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::AuthenticationRequest};

/// Boxed future returned by [`PendingStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Shared keyed store tracking in-flight authentication attempts.
///
/// The redirect flow inserts, the callback verifier takes; both may run
/// concurrently for independent attempts. [`PendingStore::take`] is the
/// single-use enforcement point and must be atomic: for a given token it
/// returns [`TakeOutcome::Taken`] or [`TakeOutcome::Expired`] to exactly one
/// caller and [`TakeOutcome::Missing`] to every other, no matter how callbacks
/// race or replay.
pub trait PendingStore
where
	Self: Send + Sync,
{
	/// Registers a pending request under its correlation token.
	///
	/// Must complete before the redirect is issued to the user agent.
	fn put(&self, request: AuthenticationRequest) -> StoreFuture<'_, ()>;

	/// Atomically removes and returns the request for `token`.
	///
	/// Expired entries are reclaimed here, on lookup; the entry is deleted
	/// whether the outcome is `Taken` or `Expired`.
	fn take<'a>(&'a self, token: &'a str, now: OffsetDateTime) -> StoreFuture<'a, TakeOutcome>;

	/// Removes every entry expired at `now`, returning the count.
	///
	/// Purely an optional housekeeping aid for a periodic sweep; correctness
	/// never depends on it.
	fn sweep(&self, now: OffsetDateTime) -> StoreFuture<'_, usize>;
}

/// Result of an atomic take attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TakeOutcome {
	/// The request was pending and has now been consumed.
	Taken(AuthenticationRequest),
	/// The request existed but had expired; the entry has been deleted.
	Expired,
	/// No pending request matched the token (unknown or already consumed).
	Missing,
}

/// Error type produced by [`PendingStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn take_outcome_serializes_for_backend_transports() {
		let payload = serde_json::to_string(&TakeOutcome::Missing)
			.expect("TakeOutcome should serialize to JSON.");

		assert_eq!(payload, "\"Missing\"");

		let round_trip: TakeOutcome = serde_json::from_str(&payload)
			.expect("Serialized outcome should deserialize from JSON.");

		assert_eq!(round_trip, TakeOutcome::Missing);
	}
}

//! Thread-safe in-memory [`PendingStore`] implementation for hosts and tests.

// self
use crate::{
	_prelude::*,
	auth::AuthenticationRequest,
	store::{PendingStore, StoreError, StoreFuture, TakeOutcome},
};

type StoreMap = Arc<RwLock<HashMap<String, AuthenticationRequest>>>;

/// Thread-safe store keeping pending requests in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of entries currently held, expired ones included.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Checks whether the store holds no entries.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn put_now(map: StoreMap, request: AuthenticationRequest) -> Result<(), StoreError> {
		map.write().insert(request.correlation_token.as_str().to_owned(), request);

		Ok(())
	}

	// The remove happens under a single write guard, so exactly one racing
	// caller observes the entry.
	fn take_now(map: StoreMap, token: &str, now: OffsetDateTime) -> TakeOutcome {
		match map.write().remove(token) {
			Some(request) if request.is_expired_at(now) => TakeOutcome::Expired,
			Some(request) => TakeOutcome::Taken(request),
			None => TakeOutcome::Missing,
		}
	}

	fn sweep_now(map: StoreMap, now: OffsetDateTime) -> usize {
		let mut guard = map.write();
		let before = guard.len();

		guard.retain(|_, request| !request.is_expired_at(now));

		before - guard.len()
	}
}
impl PendingStore for MemoryStore {
	fn put(&self, request: AuthenticationRequest) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::put_now(map, request) })
	}

	fn take<'a>(&'a self, token: &'a str, now: OffsetDateTime) -> StoreFuture<'a, TakeOutcome> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::take_now(map, token, now)) })
	}

	fn sweep(&self, now: OffsetDateTime) -> StoreFuture<'_, usize> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::sweep_now(map, now)) })
	}
}

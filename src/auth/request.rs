//! Pending authentication requests awaiting their provider callback.

// self
use crate::{_prelude::*, auth::CorrelationToken, config::Country};

/// One in-flight authentication attempt, keyed by its correlation token.
///
/// Created when the redirect is issued, held only by the pending store, and
/// consumed exactly once: taken on callback or reclaimed after expiry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationRequest {
	/// Token binding this attempt to its eventual callback.
	pub correlation_token: CorrelationToken,
	/// Callback URL the provider will deliver the assertion to.
	pub callback_url: Url,
	/// Country whose authentication method was requested.
	pub country: Country,
	/// Instant the attempt was created.
	pub created_at: OffsetDateTime,
	/// Instant after which the attempt must not verify.
	pub expires_at: OffsetDateTime,
}
impl AuthenticationRequest {
	/// Checks whether the attempt has expired at the provided instant.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		now > self.expires_at
	}

	/// Remaining lifetime at the provided instant; zero once expired.
	pub fn ttl_at(&self, now: OffsetDateTime) -> Duration {
		(self.expires_at - now).max(Duration::ZERO)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn fixture(expires_at: OffsetDateTime) -> AuthenticationRequest {
		AuthenticationRequest {
			correlation_token: CorrelationToken::generate(),
			callback_url: Url::parse("https://idsvr.example.com/authn/signicat/callback")
				.expect("Callback URL fixture should parse."),
			country: Country::Sweden,
			created_at: expires_at - Duration::minutes(5),
			expires_at,
		}
	}

	#[test]
	fn expiry_is_strict() {
		let expires = macros::datetime!(2026-02-01 12:00 UTC);
		let request = fixture(expires);

		assert!(!request.is_expired_at(expires));
		assert!(request.is_expired_at(expires + Duration::seconds(1)));
	}

	#[test]
	fn ttl_saturates_at_zero() {
		let expires = macros::datetime!(2026-02-01 12:00 UTC);
		let request = fixture(expires);

		assert_eq!(request.ttl_at(expires - Duration::seconds(30)), Duration::seconds(30));
		assert_eq!(request.ttl_at(expires + Duration::minutes(1)), Duration::ZERO);
	}
}

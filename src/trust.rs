//! Signing-key material and assertion signature verification.
//!
//! Signicat's published protocol signs assertions with X.509 material; this
//! crate's wire contract keeps the verification seam in one place so the MAC
//! scheme below can be swapped for an XML-DSig implementation without touching
//! the callback state machine. The contract is a detached `HMAC-SHA-256` over
//! the raw response bytes, keyed per environment.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
// self
use crate::{_prelude::*, config::SignicatEnvironment};

type HmacSha256 = Hmac<Sha256>;

/// Asserting-party DN published by Signicat for the production environment.
pub const PRODUCTION_ASSERTING_PARTY_DN: &str =
	"CN=id.signicat.com/std, OU=Signicat, O=Signicat, L=Trondheim, ST=Norway, C=NO";
/// Asserting-party DN published by Signicat for non-production environments.
pub const PRE_PRODUCTION_ASSERTING_PARTY_DN: &str =
	"CN=test.signicat.com/std, OU=Signicat, O=Signicat, L=Trondheim, ST=Norway, C=NO";

/// Returns the asserting-party DN expected for the provided environment.
///
/// Custom environments are treated as non-production.
pub fn asserting_party_dn(environment: &SignicatEnvironment) -> &'static str {
	match environment {
		SignicatEnvironment::Production => PRODUCTION_ASSERTING_PARTY_DN,
		SignicatEnvironment::PreProduction | SignicatEnvironment::Custom(_) =>
			PRE_PRODUCTION_ASSERTING_PARTY_DN,
	}
}

/// Redacted signing-key material; formatters never reveal the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);
impl SigningKey {
	/// Wraps raw key material.
	pub fn new(material: impl Into<Vec<u8>>) -> Self {
		Self(material.into())
	}

	/// Decodes base64 key material as published by the key endpoint.
	pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
		STANDARD.decode(encoded).map(Self)
	}

	fn expose(&self) -> &[u8] {
		&self.0
	}
}
impl Debug for SigningKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SigningKey").field(&"<redacted>").finish()
	}
}

/// Per-environment registry of provider signing keys.
///
/// Hosts seed it at startup and may refresh it from the key-publishing
/// endpoint; lookups clone the key so verification never holds the lock.
#[derive(Debug, Default)]
pub struct TrustAnchors(RwLock<HashMap<String, SigningKey>>);
impl TrustAnchors {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Installs (or replaces) the signing key for an environment host.
	pub fn install(&self, host: impl Into<String>, key: SigningKey) {
		self.0.write().insert(host.into(), key);
	}

	/// Returns the signing key registered for `host`, if any.
	pub fn key_for(&self, host: &str) -> Option<SigningKey> {
		self.0.read().get(host).cloned()
	}
}

/// Computes the detached signature for `raw` under `key`.
///
/// Intended for tests and local assertion brokers; the provider performs this
/// step in production.
pub fn sign(key: &SigningKey, raw: &[u8]) -> Vec<u8> {
	let mut mac = HmacSha256::new_from_slice(key.expose())
		.expect("HMAC accepts keys of any length; this cannot fail.");

	mac.update(raw);

	mac.finalize().into_bytes().to_vec()
}

/// Verifies a detached signature over `raw`, comparing in constant time.
pub fn verify(key: &SigningKey, raw: &[u8], signature: &[u8]) -> Result<(), VerifyError> {
	let expected = sign(key, raw);

	if expected.ct_eq(signature).into() {
		Ok(())
	} else {
		Err(VerifyError::SignatureVerification)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn sign_and_verify_round_trip() {
		let key = SigningKey::new(b"trust-anchor-key".to_vec());
		let signature = sign(&key, b"assertion-body");

		verify(&key, b"assertion-body", &signature)
			.expect("Untampered payload should verify under the signing key.");
	}

	#[test]
	fn single_flipped_byte_fails_verification() {
		let key = SigningKey::new(b"trust-anchor-key".to_vec());
		let signature = sign(&key, b"assertion-body");
		let mut tampered = b"assertion-body".to_vec();

		tampered[0] ^= 0x01;

		let err = verify(&key, &tampered, &signature)
			.expect_err("Tampered payload must fail verification.");

		assert_eq!(err, VerifyError::SignatureVerification);
	}

	#[test]
	fn wrong_key_fails_verification() {
		let key = SigningKey::new(b"trust-anchor-key".to_vec());
		let other = SigningKey::new(b"some-other-key".to_vec());
		let signature = sign(&key, b"assertion-body");

		assert!(verify(&other, b"assertion-body", &signature).is_err());
	}

	#[test]
	fn formatters_redact_key_material() {
		let key = SigningKey::new(b"sensitive".to_vec());

		assert_eq!(format!("{key:?}"), "SigningKey(\"<redacted>\")");
	}

	#[test]
	fn anchors_resolve_per_host() {
		let anchors = TrustAnchors::new();

		anchors.install("preprod.signicat.com", SigningKey::new(b"preprod".to_vec()));

		assert!(anchors.key_for("preprod.signicat.com").is_some());
		assert!(anchors.key_for("id.signicat.com").is_none());
	}

	#[test]
	fn custom_environments_use_the_non_production_dn() {
		assert_eq!(
			asserting_party_dn(&SignicatEnvironment::Custom("sandbox.example.com".into())),
			PRE_PRODUCTION_ASSERTING_PARTY_DN
		);
		assert_eq!(
			asserting_party_dn(&SignicatEnvironment::Production),
			PRODUCTION_ASSERTING_PARTY_DN
		);
	}
}

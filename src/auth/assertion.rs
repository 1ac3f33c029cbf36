//! Provider assertions delivered to the callback endpoint.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::_prelude::*;

/// Claim key carrying the asserted subject identifier.
pub const SUBJECT_CLAIM: &str = "subject";
/// Claim key echoing the correlation reference issued with the redirect.
pub const CORRELATION_CLAIM: &str = "correlation";

/// The provider's signed statement of the authenticated user's identity.
///
/// Received once per callback and never persisted beyond verification. The
/// signature is detached: it covers `raw_response` and nothing else.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderAssertion {
	/// Raw response bytes the signature was computed over.
	pub raw_response: Vec<u8>,
	/// Detached signature bytes.
	pub signature: Vec<u8>,
	/// Asserted claims, keyed by claim name.
	pub claims: HashMap<String, String>,
	/// Instant the provider issued the assertion.
	pub issued_at: OffsetDateTime,
}
impl ProviderAssertion {
	/// Assembles an assertion from already-decoded parts.
	pub fn new(
		raw_response: impl Into<Vec<u8>>,
		signature: impl Into<Vec<u8>>,
		claims: HashMap<String, String>,
		issued_at: OffsetDateTime,
	) -> Self {
		Self { raw_response: raw_response.into(), signature: signature.into(), claims, issued_at }
	}

	/// Assembles an assertion from the base64 payloads posted by the provider.
	///
	/// Fails with [`VerifyError::MalformedResponse`] when either payload does
	/// not decode, mirroring a rejected callback rather than a crash.
	pub fn from_encoded(
		raw_response_b64: &str,
		signature_b64: &str,
		claims: HashMap<String, String>,
		issued_at: OffsetDateTime,
	) -> Result<Self, VerifyError> {
		let raw_response =
			STANDARD.decode(raw_response_b64).map_err(|_| VerifyError::MalformedResponse)?;
		let signature =
			STANDARD.decode(signature_b64).map_err(|_| VerifyError::MalformedResponse)?;

		Ok(Self { raw_response, signature, claims, issued_at })
	}

	/// Returns the claim value for `name`, if asserted.
	pub fn claim(&self, name: &str) -> Option<&str> {
		self.claims.get(name).map(String::as_str)
	}

	/// Returns the echoed correlation reference, if present.
	pub fn correlation_reference(&self) -> Option<&str> {
		self.claim(CORRELATION_CLAIM)
	}
}
impl Debug for ProviderAssertion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderAssertion")
			.field("raw_response_len", &self.raw_response.len())
			.field("signature_len", &self.signature.len())
			.field("claims", &self.claims.keys().collect::<Vec<_>>())
			.field("issued_at", &self.issued_at)
			.finish()
	}
}

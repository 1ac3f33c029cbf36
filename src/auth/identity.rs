//! Verified identity values handed to the host's session-issuance path.

// self
use crate::_prelude::*;

/// The asserted identity produced by a successful callback verification.
///
/// Produced exactly once per attempt and never mutated afterwards; attribute
/// insertion order carries no meaning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
	/// Subject identifier asserted by the provider.
	pub subject_id: String,
	/// Remaining asserted attributes, keyed by claim name.
	pub attributes: HashMap<String, String>,
	/// Instant the verification completed.
	pub verified_at: OffsetDateTime,
}
impl VerifiedIdentity {
	/// Returns the attribute value for `name`, if asserted.
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).map(String::as_str)
	}
}

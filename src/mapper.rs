//! Maps verified provider claims into the host's identity representation.

// self
use crate::{
	_prelude::*,
	auth::{CORRELATION_CLAIM, ProviderAssertion, SUBJECT_CLAIM, VerifiedIdentity},
};

/// Converts a verified assertion into a [`VerifiedIdentity`].
///
/// Pure: no side effects, no clock reads; callers supply the verification
/// instant. Fails when the mandated subject claim is absent. The correlation
/// reference is flow plumbing, not an identity attribute, so it is dropped.
pub fn map_assertion(
	assertion: &ProviderAssertion,
	verified_at: OffsetDateTime,
) -> Result<VerifiedIdentity, VerifyError> {
	let subject_id = assertion
		.claim(SUBJECT_CLAIM)
		.ok_or(VerifyError::MissingRequiredClaim { claim: SUBJECT_CLAIM })?
		.to_owned();
	let attributes = assertion
		.claims
		.iter()
		.filter(|(name, _)| *name != SUBJECT_CLAIM && *name != CORRELATION_CLAIM)
		.map(|(name, value)| (name.clone(), value.clone()))
		.collect();

	Ok(VerifiedIdentity { subject_id, attributes, verified_at })
}

//! Callback verification state machine.
//!
//! A callback advances `AwaitingCallback -> Verifying -> {Verified, Rejected,
//! Expired}`. The transition out of `AwaitingCallback` happens at most once
//! per correlation token: the pending store's atomic take consumes the entry,
//! so concurrent duplicate callbacks race to a single `Verifying` pass and
//! every loser terminates as `Rejected`.

// self
use crate::{
	_prelude::*,
	auth::{ProviderAssertion, VerifiedIdentity},
	config::SignicatEnvironment,
	mapper,
	store::{PendingStore, TakeOutcome},
	trust::{self, TrustAnchors},
};

/// States of the callback verifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallbackState {
	/// A pending request exists and no callback has been consumed yet.
	AwaitingCallback,
	/// The pending entry has been taken; signature and claims are being checked.
	Verifying,
	/// Terminal: the assertion verified and an identity was produced.
	Verified,
	/// Terminal: the callback was rejected (unknown token, bad signature, bad claims).
	Rejected,
	/// Terminal: the pending request expired before the callback arrived.
	Expired,
}
impl CallbackState {
	/// Checks whether the state permits no further transitions.
	pub const fn is_terminal(self) -> bool {
		matches!(self, CallbackState::Verified | CallbackState::Rejected | CallbackState::Expired)
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallbackState::AwaitingCallback => "awaiting_callback",
			CallbackState::Verifying => "verifying",
			CallbackState::Verified => "verified",
			CallbackState::Rejected => "rejected",
			CallbackState::Expired => "expired",
		}
	}
}

/// Runs the verification state machine for one delivered assertion.
///
/// Ordering is part of the contract: the atomic take (single-use) happens
/// first, expiry is decided before any signature work, and claims are mapped
/// only once the signature has verified.
pub(crate) async fn process(
	store: &dyn PendingStore,
	trust: &TrustAnchors,
	environment: &SignicatEnvironment,
	assertion: ProviderAssertion,
	now: OffsetDateTime,
) -> Result<VerifiedIdentity> {
	let Some(token) = assertion.correlation_reference() else {
		reject("assertion carried no correlation reference");

		return Err(VerifyError::UnknownOrReusedRequest.into());
	};
	let request = match store.take(token, now).await? {
		TakeOutcome::Taken(request) => request,
		TakeOutcome::Expired => {
			reject("pending request expired before the callback arrived");

			return Err(VerifyError::RequestExpired.into());
		},
		TakeOutcome::Missing => {
			reject("correlation token is unknown or already consumed");

			return Err(VerifyError::UnknownOrReusedRequest.into());
		},
	};
	let host = environment.host();
	let Some(key) = trust.key_for(host) else {
		reject("no signing key installed for the asserting environment");

		return Err(VerifyError::MissingTrustAnchor { host: host.to_owned() }.into());
	};

	if let Err(e) = trust::verify(&key, &assertion.raw_response, &assertion.signature) {
		reject("assertion signature did not verify");

		return Err(e.into());
	}

	let identity = mapper::map_assertion(&assertion, now)?;

	#[cfg(feature = "tracing")]
	tracing::debug!(
		state = CallbackState::Verified.as_str(),
		country = request.country.as_str(),
		"Callback verified.",
	);
	#[cfg(not(feature = "tracing"))]
	let _ = request;

	Ok(identity)
}

// The specific reason stays in logs; hosts surface only the generic fault.
fn reject(reason: &'static str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(state = CallbackState::Rejected.as_str(), reason, "Callback not verified.");
	#[cfg(not(feature = "tracing"))]
	let _ = reason;
}

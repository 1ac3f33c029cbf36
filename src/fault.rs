//! Host-visible fault mapping.
//!
//! The host's exception surface only changes how a failure is represented,
//! never what was decided. Verification internals (expired vs. reused vs.
//! tampered) are deliberately collapsed into one generic message so the
//! response leaks nothing an attacker could use to probe the verifier; the
//! specific [`Error`] kind belongs in logs.

// self
use crate::_prelude::*;

/// Fault representation handed back to the host identity server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FaultResponse {
	/// HTTP-style status the host should surface.
	pub status: u16,
	/// End-user-safe message.
	pub message: &'static str,
}

/// Maps an internal error to its host-visible fault.
pub fn fault_for(error: &Error) -> FaultResponse {
	match error {
		Error::Config(_) =>
			FaultResponse { status: 500, message: "The authentication service is misconfigured." },
		Error::Storage(_) => FaultResponse {
			status: 500,
			message: "The authentication service encountered an internal error.",
		},
		Error::Verify(_) => FaultResponse { status: 401, message: "Authentication failed." },
		Error::ProviderUnavailable { .. }
		| Error::KeyDocumentParse { .. }
		| Error::KeyMaterialDecode { .. } => FaultResponse {
			status: 502,
			message: "The authentication provider is currently unavailable.",
		},
	}
}

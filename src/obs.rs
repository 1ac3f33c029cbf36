//! Optional observability helpers for authentication flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `signicat_authn.flow`
//!   with the `flow` and `stage` fields.
//! - Enable `metrics` to increment the `signicat_authn_flow_total` counter for
//!   every attempt/outcome, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the authenticator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Redirect initiation toward the provider.
	Redirect,
	/// Callback verification from the provider.
	Callback,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Redirect => "redirect",
			FlowKind::Callback => "callback",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow helper.
	Attempt,
	/// Successful completion (redirect issued or identity verified).
	Success,
	/// Callback rejected by the verifier.
	Rejected,
	/// Callback arrived after the pending request expired.
	Expired,
	/// Non-verification failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Derives the terminal label for a flow result.
	pub fn from_result<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => FlowOutcome::Success,
			Err(Error::Verify(VerifyError::RequestExpired)) => FlowOutcome::Expired,
			Err(Error::Verify(_)) => FlowOutcome::Rejected,
			Err(_) => FlowOutcome::Failure,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Rejected => "rejected",
			FlowOutcome::Expired => "expired",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn outcomes_derive_from_flow_results() {
		assert_eq!(FlowOutcome::from_result(&Ok(())), FlowOutcome::Success);
		assert_eq!(
			FlowOutcome::from_result::<()>(&Err(VerifyError::RequestExpired.into())),
			FlowOutcome::Expired
		);
		assert_eq!(
			FlowOutcome::from_result::<()>(&Err(VerifyError::SignatureVerification.into())),
			FlowOutcome::Rejected
		);
		assert_eq!(
			FlowOutcome::from_result::<()>(&Err(Error::ProviderUnavailable {
				reason: "timeout".into()
			})),
			FlowOutcome::Failure
		);
	}
}

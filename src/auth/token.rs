//! Correlation tokens binding outbound redirects to their callbacks.

// std
use std::{borrow::Borrow, ops::Deref};
// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

// 32 alphanumeric characters carry ~190 bits of entropy, comfortably above
// the 128-bit floor required for unguessability.
const TOKEN_LEN: usize = 32;
const TOKEN_MAX_LEN: usize = 128;

/// Error returned when correlation token validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum CorrelationTokenError {
	/// The token was empty.
	#[error("Correlation token cannot be empty.")]
	Empty,
	/// The token contains whitespace characters.
	#[error("Correlation token contains whitespace.")]
	ContainsWhitespace,
	/// The token exceeded the allowed character count.
	#[error("Correlation token exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Unguessable identifier binding an authentication redirect to its callback.
///
/// Generated from a cryptographically secure source, unique per attempt, and
/// consumed at most once by the pending store's atomic take.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CorrelationToken(String);
impl CorrelationToken {
	/// Generates a fresh token from the thread-local CSPRNG.
	pub fn generate() -> Self {
		Self(rand::rng().sample_iter(Alphanumeric).take(TOKEN_LEN).map(char::from).collect())
	}

	/// Wraps an externally supplied token after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, CorrelationTokenError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}

	/// Returns the token value for embedding into URLs and store keys.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Deref for CorrelationToken {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for CorrelationToken {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for CorrelationToken {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<CorrelationToken> for String {
	fn from(value: CorrelationToken) -> Self {
		value.0
	}
}
impl TryFrom<String> for CorrelationToken {
	type Error = CorrelationTokenError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for CorrelationToken {
	type Err = CorrelationTokenError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for CorrelationToken {
	// Tokens are single-use, but logs outlive attempts; keep the tail out.
	// Truncation counts characters, not bytes; external tokens may be multibyte.
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let head: String = self.0.chars().take(8).collect();

		write!(f, "CorrelationToken({head}\u{2026})")
	}
}
impl Display for CorrelationToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), CorrelationTokenError> {
	if view.is_empty() {
		return Err(CorrelationTokenError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(CorrelationTokenError::ContainsWhitespace);
	}
	if view.len() > TOKEN_MAX_LEN {
		return Err(CorrelationTokenError::TooLong { max: TOKEN_MAX_LEN });
	}

	Ok(())
}

//! Error types shared across the redirect flow, the callback verifier, and the stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem; fatal to the flow, never partially authenticated.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Callback verification failure; recoverable with a fresh authentication attempt.
	#[error(transparent)]
	Verify(#[from] VerifyError),

	/// The provider endpoint could not be reached within the configured timeout.
	#[error("Authentication provider is unavailable: {reason}.")]
	ProviderUnavailable {
		/// Transport-supplied reason string.
		reason: String,
	},
	/// Provider signing-key document could not be parsed.
	#[error("Provider signing-key document is malformed.")]
	KeyDocumentParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
	/// Provider signing-key material could not be decoded.
	#[error("Provider signing-key material is not valid base64.")]
	KeyMaterialDecode {
		/// Underlying decoding failure.
		#[source]
		source: base64::DecodeError,
	},
}
impl From<TransportError> for Error {
	// Retry policy belongs to the host; every transport failure surfaces as
	// provider unavailability at the flow level.
	fn from(e: TransportError) -> Self {
		Self::ProviderUnavailable { reason: e.to_string() }
	}
}

/// Configuration and validation failures raised while resolving or applying
/// [`AuthenticationConfig`](crate::config::AuthenticationConfig).
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required configuration key is absent.
	#[error("Required configuration key `{key}` is missing.")]
	MissingKey {
		/// Configuration key that was expected.
		key: &'static str,
	},
	/// A configuration key holds a value that is not a valid URL.
	#[error("Configuration key `{key}` holds an invalid URL.")]
	InvalidUrl {
		/// Configuration key that failed to parse.
		key: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The configured country is not one of the supported values.
	#[error("Unknown country `{value}`.")]
	UnknownCountry {
		/// Rejected configuration value.
		value: String,
	},
	/// The configured environment is not one of the supported values.
	#[error("Unknown environment `{value}`.")]
	UnknownEnvironment {
		/// Rejected configuration value.
		value: String,
	},
	/// A numeric configuration key holds a non-numeric or negative value.
	#[error("Configuration key `{key}` holds an invalid number.")]
	InvalidNumber {
		/// Configuration key that failed to parse.
		key: &'static str,
	},
	/// A boolean configuration key holds neither `true` nor `false`.
	#[error("Configuration key `{key}` holds an invalid flag.")]
	InvalidFlag {
		/// Configuration key that failed to parse.
		key: &'static str,
	},
	/// The callback base cannot be combined with the provider URL into a
	/// valid redirect target.
	#[error("Callback base `{url}` cannot be combined into a redirect target.")]
	InvalidCallback {
		/// Callback base that failed validation.
		url: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Verification failures produced by the callback state machine.
///
/// These map one-to-one onto the terminal rejection reasons: the specific kind
/// is meant for logs and metrics, while [`fault_for`](crate::fault::fault_for)
/// collapses all of them into a generic host-visible response.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum VerifyError {
	/// The correlation token is unknown or has already been consumed.
	#[error("Callback references an unknown or already-consumed authentication request.")]
	UnknownOrReusedRequest,
	/// The pending authentication request expired before the callback arrived.
	#[error("Authentication request has expired.")]
	RequestExpired,
	/// The assertion signature does not match the raw response bytes.
	#[error("Assertion signature verification failed.")]
	SignatureVerification,
	/// A mandated claim is absent from the assertion.
	#[error("Assertion is missing the required `{claim}` claim.")]
	MissingRequiredClaim {
		/// Claim key that was expected.
		claim: &'static str,
	},
	/// The callback payload could not be decoded into an assertion.
	#[error("Callback payload could not be decoded.")]
	MalformedResponse,
	/// No signing key is registered for the asserting environment.
	#[error("No signing key is registered for environment `{host}`.")]
	MissingTrustAnchor {
		/// Environment host that lacked a trust anchor.
		host: String,
	},
}

/// Transport-level failures (network, IO, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The provider endpoint did not answer within the configured timeout.
	#[error("Provider endpoint did not respond within {timeout}.")]
	Timeout {
		/// Timeout that elapsed.
		timeout: Duration,
	},
	/// The provider endpoint answered with a non-success status.
	#[error("Provider endpoint returned HTTP status {status}.")]
	Status {
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

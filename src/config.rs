//! Configuration resolution for the Signicat authenticator.
//!
//! The host supplies configuration through a generic key/value
//! [`ConfigSource`]; [`AuthenticationConfig::resolve`] turns it into an
//! immutable value struct up front so configuration problems surface at
//! startup instead of mid-flow.

// self
use crate::_prelude::*;

/// Configuration keys consumed by [`AuthenticationConfig::resolve`].
pub mod keys {
	/// Country whose authentication method should be required.
	pub const COUNTRY: &str = "country";
	/// Service name registered with Signicat.
	pub const SERVICE_NAME: &str = "service-name";
	/// Standard environment selector (`pre-production` or `production`).
	pub const ENVIRONMENT: &str = "environment";
	/// Custom environment host; overrides [`ENVIRONMENT`] when present.
	pub const CUSTOM_ENVIRONMENT: &str = "custom-environment";
	/// Provider authentication endpoint URL.
	pub const AUTHENTICATION_URL: &str = "authentication-url";
	/// Graphics profile registered with Signicat.
	pub const GRAPHICS_PROFILE: &str = "graphics-profile";
	/// Space-separated BCP-47 locale preference list; only the first entry is used.
	pub const PREFERRED_LANGUAGE: &str = "preferred-language";
	/// Pending-request TTL in seconds; non-negative.
	pub const REQUEST_TTL_SECONDS: &str = "request-ttl-seconds";
	/// Outbound HTTP timeout in seconds; non-negative.
	pub const HTTP_TIMEOUT_SECONDS: &str = "http-timeout-seconds";
	/// Enables the document-signing flow (`true`/`false`).
	pub const USE_SIGNING: &str = "use-signing";
	/// Secret authenticating toward the signing service; required when
	/// [`USE_SIGNING`] is `true`.
	pub const SIGNING_SECRET: &str = "signing-secret";
}

/// Default pending-request TTL applied when [`keys::REQUEST_TTL_SECONDS`] is absent.
pub const DEFAULT_REQUEST_TTL: Duration = Duration::seconds(300);
/// Default outbound HTTP timeout applied when [`keys::HTTP_TIMEOUT_SECONDS`] is absent.
// Generous; the only goal is that no calling thread is consumed indefinitely.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::seconds(10);

/// Externally supplied key/value configuration source.
pub trait ConfigSource
where
	Self: Send + Sync,
{
	/// Returns the raw value for `key`, if present.
	fn get(&self, key: &str) -> Option<String>;
}

/// [`ConfigSource`] backed by an in-process map, for hosts and tests.
#[derive(Clone, Debug, Default)]
pub struct MapConfigSource(HashMap<String, String>);
impl ConfigSource for MapConfigSource {
	fn get(&self, key: &str) -> Option<String> {
		self.0.get(key).cloned()
	}
}
impl<K, V> FromIterator<(K, V)> for MapConfigSource
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

/// Country whose national authentication method the user must use.
///
/// Defaults to [`Country::Sweden`] when the configuration source omits the
/// [`keys::COUNTRY`] key; the default is part of the configuration contract,
/// not an implementation accident.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Country {
	#[default]
	/// Swedish BankID.
	Sweden,
	/// Danish NemID.
	Denmark,
	/// Finnish Tupas.
	Finland,
	/// Norwegian BankID.
	Norway,
	/// Estonian E-ID.
	Estonia,
}
impl Country {
	/// Returns the Signicat method code used in redirect `id` parameters.
	pub const fn method_code(self) -> &'static str {
		match self {
			Country::Sweden => "sbid",
			Country::Denmark => "nemid",
			Country::Finland => "tupas",
			Country::Norway => "nbid",
			Country::Estonia => "esteid",
		}
	}

	/// Returns a stable lowercase label for logs and serialization.
	pub const fn as_str(self) -> &'static str {
		match self {
			Country::Sweden => "sweden",
			Country::Denmark => "denmark",
			Country::Finland => "finland",
			Country::Norway => "norway",
			Country::Estonia => "estonia",
		}
	}
}
impl FromStr for Country {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"sweden" => Ok(Country::Sweden),
			"denmark" => Ok(Country::Denmark),
			"finland" => Ok(Country::Finland),
			"norway" => Ok(Country::Norway),
			"estonia" => Ok(Country::Estonia),
			_ => Err(ConfigError::UnknownCountry { value: s.to_owned() }),
		}
	}
}
impl Display for Country {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Signicat environment the authenticator talks to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignicatEnvironment {
	#[default]
	/// Non-production environment for testing and verification.
	PreProduction,
	/// The production environment.
	Production,
	/// Custom host override for bespoke deployments.
	Custom(String),
}
impl SignicatEnvironment {
	/// Returns the environment host used in provider URLs and trust lookups.
	pub fn host(&self) -> &str {
		match self {
			SignicatEnvironment::PreProduction => "preprod.signicat.com",
			SignicatEnvironment::Production => "id.signicat.com",
			SignicatEnvironment::Custom(host) => host,
		}
	}
}

/// Redacted signing-service secret; formatters never reveal the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceSecret(String);
impl ServiceSecret {
	/// Wraps a raw secret value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the secret for embedding into signing-service requests.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for ServiceSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ServiceSecret").field(&"<redacted>").finish()
	}
}

/// Immutable configuration consumed by the flows.
///
/// Owned exclusively by the resolver; construct once per process or per
/// host-dictated configuration lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationConfig {
	/// Country whose authentication method is required.
	pub country: Country,
	/// Service name registered with Signicat.
	pub service_name: String,
	/// Environment the authenticator connects to.
	pub environment: SignicatEnvironment,
	/// Optional graphics profile presented by Signicat during authentication.
	pub graphics_profile: Option<String>,
	/// Normalized preferred language (lowercase primary subtag), if any.
	pub preferred_language: Option<String>,
	/// Provider authentication endpoint URL.
	pub provider_auth_url: Url,
	/// Signing-service secret; present only when the document-signing flow is
	/// enabled.
	pub signing_secret: Option<ServiceSecret>,
	/// TTL applied to pending authentication requests.
	pub request_ttl: Duration,
	/// Timeout applied to every outbound provider call.
	pub http_timeout: Duration,
}
impl AuthenticationConfig {
	/// Resolves a configuration snapshot from the provided source.
	///
	/// Fails when the provider URL or service name is absent or malformed.
	/// The country defaults to Sweden and the environment to pre-production
	/// when their keys are omitted.
	pub fn resolve(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
		let country = match source.get(keys::COUNTRY) {
			Some(raw) => raw.parse()?,
			None => Country::default(),
		};
		let service_name = source
			.get(keys::SERVICE_NAME)
			.map(|raw| raw.trim().to_owned())
			.filter(|name| !name.is_empty())
			.ok_or(ConfigError::MissingKey { key: keys::SERVICE_NAME })?;
		let environment = resolve_environment(source)?;
		let provider_auth_url = parse_url(source, keys::AUTHENTICATION_URL)?;
		let graphics_profile =
			source.get(keys::GRAPHICS_PROFILE).map(|raw| raw.trim().to_owned());
		let preferred_language =
			source.get(keys::PREFERRED_LANGUAGE).and_then(|raw| preferred_language(&raw));
		let signing_secret = resolve_signing(source)?;
		let request_ttl = parse_seconds(source, keys::REQUEST_TTL_SECONDS, DEFAULT_REQUEST_TTL)?;
		let http_timeout = parse_seconds(source, keys::HTTP_TIMEOUT_SECONDS, DEFAULT_HTTP_TIMEOUT)?;

		Ok(Self {
			country,
			service_name,
			environment,
			graphics_profile,
			preferred_language,
			provider_auth_url,
			signing_secret,
			request_ttl,
			http_timeout,
		})
	}
}

/// Extracts the lowercase primary language subtag from a locale preference
/// list, using only the first entry.
///
/// Malformed tags are dropped rather than sent to the provider.
pub fn preferred_language(locales: &str) -> Option<String> {
	let first = locales.split_whitespace().next()?;
	let subtag = first.split('-').next()?;

	if (2..=8).contains(&subtag.len()) && subtag.bytes().all(|b| b.is_ascii_alphabetic()) {
		Some(subtag.to_ascii_lowercase())
	} else {
		None
	}
}

fn resolve_environment(source: &dyn ConfigSource) -> Result<SignicatEnvironment, ConfigError> {
	// A custom host always wins over the standard selector.
	if let Some(host) = source.get(keys::CUSTOM_ENVIRONMENT) {
		let host = host.trim().to_owned();

		if host.is_empty() {
			return Err(ConfigError::UnknownEnvironment { value: host });
		}

		return Ok(SignicatEnvironment::Custom(host));
	}

	match source.get(keys::ENVIRONMENT) {
		None => Ok(SignicatEnvironment::default()),
		Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
			"pre-production" | "pre_production" | "preprod" =>
				Ok(SignicatEnvironment::PreProduction),
			"production" => Ok(SignicatEnvironment::Production),
			_ => Err(ConfigError::UnknownEnvironment { value: raw }),
		},
	}
}

fn parse_url(source: &dyn ConfigSource, key: &'static str) -> Result<Url, ConfigError> {
	let raw = source.get(key).ok_or(ConfigError::MissingKey { key })?;
	let url = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { key, source })?;

	if url.cannot_be_a_base() {
		return Err(ConfigError::InvalidCallback { url: url.into() });
	}

	Ok(url)
}

fn resolve_signing(source: &dyn ConfigSource) -> Result<Option<ServiceSecret>, ConfigError> {
	match source.get(keys::USE_SIGNING) {
		None => Ok(None),
		Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
			"false" => Ok(None),
			"true" => source
				.get(keys::SIGNING_SECRET)
				.map(|secret| secret.trim().to_owned())
				.filter(|secret| !secret.is_empty())
				.map(|secret| Some(ServiceSecret::new(secret)))
				.ok_or(ConfigError::MissingKey { key: keys::SIGNING_SECRET }),
			_ => Err(ConfigError::InvalidFlag { key: keys::USE_SIGNING }),
		},
	}
}

fn parse_seconds(
	source: &dyn ConfigSource,
	key: &'static str,
	default: Duration,
) -> Result<Duration, ConfigError> {
	match source.get(key) {
		None => Ok(default),
		// A negative TTL or timeout would make every request born expired.
		Some(raw) => raw
			.trim()
			.parse::<i64>()
			.ok()
			.filter(|seconds| *seconds >= 0)
			.map(Duration::seconds)
			.ok_or(ConfigError::InvalidNumber { key }),
	}
}

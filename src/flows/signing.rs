//! Document-signing redirect assembly for authentication-based signatures.
//!
//! Signicat's document service issues a request id for a prepared signing
//! task; this module turns that id into the `docaction` redirect the user
//! agent is sent to. Creating the signing request itself (the document
//! service exchange) stays with the host.

// self
use crate::{
	_prelude::*,
	config::{AuthenticationConfig, keys},
};

/// Task identifier registered with every signing request.
pub const SIGNING_TASK_ID: &str = "task_1";

/// Builds the `docaction` redirect URL for an issued signing request.
///
/// Fails with [`ConfigError::MissingKey`] unless the configuration enables
/// signing; the redirect host follows the configured environment.
pub(crate) fn build_signing_redirect(
	config: &AuthenticationConfig,
	request_id: &str,
) -> Result<Url, ConfigError> {
	if config.signing_secret.is_none() {
		return Err(ConfigError::MissingKey { key: keys::SIGNING_SECRET });
	}

	let host = config.environment.host();
	let mut url = Url::parse(&format!("https://{host}/std/docaction"))
		.map_err(|source| ConfigError::InvalidUrl { key: keys::CUSTOM_ENVIRONMENT, source })?;

	url.path_segments_mut()
		.map_err(|()| ConfigError::UnknownEnvironment { value: host.to_owned() })?
		.push(&config.service_name);

	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("request_id", request_id);
	pairs.append_pair("task_id", SIGNING_TASK_ID);

	drop(pairs);

	Ok(url)
}

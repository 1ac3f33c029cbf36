//! Redirect initiation: correlation token issuance and redirect-URL assembly.

// self
use crate::{
	_prelude::*,
	auth::{AuthenticationRequest, CorrelationToken},
	config::AuthenticationConfig,
	flows::common,
};

/// Query parameter carrying the correlation reference on the callback target.
pub const CORRELATION_PARAM: &str = "ref";

/// Redirect handshake metadata returned by
/// [`Authenticator::start_authentication`](crate::flows::Authenticator::start_authentication).
///
/// Callers should send the user agent to `redirect_url` with a 303 status so
/// a POSTed body is guaranteed to be stripped before the redirect is followed.
#[derive(Clone, Debug)]
pub struct RedirectSession {
	/// Token binding this attempt to its eventual callback.
	pub correlation_token: CorrelationToken,
	/// Fully-formed provider URL the user agent should be sent to.
	pub redirect_url: Url,
	/// Callback target the provider will deliver the assertion to.
	pub callback_url: Url,
	/// Instant after which the attempt must not verify.
	pub expires_at: OffsetDateTime,
}

/// Builds the pending request and its redirect session.
///
/// The caller must register the returned [`AuthenticationRequest`] in the
/// pending store before issuing the redirect.
pub(crate) fn build_session(
	config: &AuthenticationConfig,
	callback_base: &Url,
	now: OffsetDateTime,
) -> Result<(AuthenticationRequest, RedirectSession), ConfigError> {
	if callback_base.cannot_be_a_base() {
		return Err(ConfigError::InvalidCallback { url: callback_base.to_string() });
	}

	let correlation_token = CorrelationToken::generate();
	let mut callback_url = callback_base.clone();

	callback_url.query_pairs_mut().append_pair(CORRELATION_PARAM, correlation_token.as_str());

	let redirect_url = build_redirect_url(config, &callback_url)?;
	let expires_at = now + config.request_ttl;
	let request = AuthenticationRequest {
		correlation_token: correlation_token.clone(),
		callback_url: callback_url.clone(),
		country: config.country,
		created_at: now,
		expires_at,
	};
	let session = RedirectSession { correlation_token, redirect_url, callback_url, expires_at };

	Ok((request, session))
}

fn build_redirect_url(
	config: &AuthenticationConfig,
	callback_url: &Url,
) -> Result<Url, ConfigError> {
	let mut url = config.provider_auth_url.clone();

	url.path_segments_mut()
		.map_err(|()| ConfigError::InvalidCallback { url: config.provider_auth_url.to_string() })?
		.push(&config.service_name);

	let method_id = common::format_method_id(
		config.country,
		config.graphics_profile.as_deref(),
		config.preferred_language.as_deref(),
	);
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("id", &method_id);
	pairs.append_pair("target", callback_url.as_str());

	drop(pairs);

	Ok(url)
}

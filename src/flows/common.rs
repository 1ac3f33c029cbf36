//! Shared helpers for flow implementations.

// self
use crate::config::Country;

/// Formats the Signicat method id (`{method}:{profile}:{language}`).
///
/// The method code always carries its trailing separator; profile and
/// language are appended only when configured, matching the provider's
/// parameter grammar.
pub(crate) fn format_method_id(
	country: Country,
	graphics_profile: Option<&str>,
	language: Option<&str>,
) -> String {
	let mut id = format!("{}:", country.method_code());

	if let Some(profile) = graphics_profile {
		id.push_str(profile);
	}
	if let Some(language) = language {
		id.push(':');
		id.push_str(language);
	}

	id
}

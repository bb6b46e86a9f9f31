//! Short-lived cookies that carry anti-forgery state and PKCE verifiers across the redirect.

// crates.io
use axum::http::{HeaderMap, header::COOKIE};
// self
use crate::auth::ProviderId;

/// Lifetime of the redirect cookies in seconds.
pub const COOKIE_MAX_AGE: u32 = 600;

/// Cookie holding the generated `state` for `provider`.
pub fn state_cookie_name(provider: &ProviderId) -> String {
	format!("oauth2-gate-state-{provider}")
}

/// Cookie holding the PKCE verifier for `provider`.
pub fn verifier_cookie_name(provider: &ProviderId) -> String {
	format!("oauth2-gate-verifier-{provider}")
}

/// `Set-Cookie` value storing `value` for the duration of the redirect.
pub(crate) fn set_cookie(name: &str, value: &str, secure: bool) -> String {
	format!(
		"{name}={value}; Max-Age={COOKIE_MAX_AGE}; Path=/; HttpOnly{}; SameSite=Lax",
		secure_attr(secure)
	)
}

/// `Set-Cookie` value deleting `name`.
pub(crate) fn clear_cookie(name: &str, secure: bool) -> String {
	format!("{name}=; Max-Age=0; Path=/; HttpOnly{}; SameSite=Lax", secure_attr(secure))
}

/// Reads `name` from the request's `Cookie` headers.
pub(crate) fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(key, _)| *key == name)
		.map(|(_, value)| value.trim_matches('"').to_owned())
		.filter(|value| !value.is_empty())
}

fn secure_attr(secure: bool) -> &'static str {
	if secure { "; Secure" } else { "" }
}

#[cfg(test)]
mod tests {
	// crates.io
	use axum::http::HeaderValue;
	// self
	use super::*;

	#[test]
	fn cookies_carry_hardening_attributes() {
		assert_eq!(
			set_cookie("oauth2-gate-state-github", "abc", true),
			"oauth2-gate-state-github=abc; Max-Age=600; Path=/; HttpOnly; Secure; SameSite=Lax"
		);
		assert_eq!(
			clear_cookie("oauth2-gate-state-github", false),
			"oauth2-gate-state-github=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax"
		);
	}

	#[test]
	fn cookies_are_read_across_headers() {
		let mut headers = HeaderMap::new();

		headers.append(COOKIE, HeaderValue::from_static("theme=dark; session=1"));
		headers.append(COOKIE, HeaderValue::from_static("oauth2-gate-state-github=\"xyz\""));
		headers.append(COOKIE, HeaderValue::from_static("oauth2-gate-verifier-github="));

		assert_eq!(read_cookie(&headers, "session").as_deref(), Some("1"));
		assert_eq!(read_cookie(&headers, "oauth2-gate-state-github").as_deref(), Some("xyz"));
		assert_eq!(read_cookie(&headers, "oauth2-gate-verifier-github"), None);
		assert_eq!(read_cookie(&headers, "missing"), None);
	}
}

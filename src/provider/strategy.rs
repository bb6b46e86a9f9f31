//! Provider strategy hooks that customize redirects, token exchanges, and error mapping.
//!
//! Implementations decorate outgoing requests and normalize error mapping
//! without tying flows to any particular HTTP client.

// std
use std::collections::BTreeMap;
// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, provider::descriptor::GrantType};

/// Strategy hook that allows providers to decorate requests and classify errors.
///
/// Implementors are required to be `Send + Sync`, and the hooks intentionally use
/// crate-owned data types so downstream crates never depend on reqwest-specific
/// structures. Only `classify_token_error` is required; the other hooks default to
/// no-ops or the shared heuristics.
pub trait ProviderStrategy: Send + Sync {
	/// Maps low-level HTTP/JSON errors into the gate error taxonomy for a token request.
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind;

	/// Gives providers a chance to add custom form parameters before dispatching.
	///
	/// The default implementation does nothing, which is enough for most providers.
	/// Override the hook when a provider requires extra fields (audience, resource,
	/// etc.).  The method works on a plain `BTreeMap` so implementations remain HTTP
	/// client agnostic.
	fn augment_token_request(&self, _grant: GrantType, _form: &mut BTreeMap<String, String>) {}

	/// Gives providers a chance to append query parameters to the authorization redirect.
	///
	/// Parameters are appended after the standard ones and after any configured extras.
	fn augment_authorize_request(&self, _params: &mut Vec<(String, String)>) {}

	/// Extracts a human-readable message from a user-info error payload.
	///
	/// The default implementation understands the common shapes: `{"message": ..}` (GitHub),
	/// `{"error_description": ..}`, `{"error": ".."}`, and `{"error": {"message": ..}}`
	/// (Google APIs).
	fn profile_error_message(&self, payload: &Value) -> Option<String> {
		default_profile_error_message(payload)
	}
}

/// Canonical provider error categories used by strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// Provider rejected the authorization grant (bad code/refresh token).
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Requested scopes exceed what the token covers.
	InsufficientScope,
	/// Provider-side failure that is not the client's fault (outage, throttling).
	///
	/// The gate never retries; the failure surfaces as [`Error::Upstream`].
	Transient,
}

/// Context passed to provider strategies when classifying token errors.
///
/// The struct keeps only primitive data (status code and OAuth fields) so strategies stay
/// decoupled from any HTTP client. The token facade fills it from the provider's error
/// payload before invoking [`ProviderStrategy::classify_token_error`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// Grant type associated with the failing request.
	pub grant_type: GrantType,
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Provider-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
}
impl ProviderErrorContext {
	/// Creates a new context scoped to the provided grant type.
	pub fn new(grant_type: GrantType) -> Self {
		Self { grant_type, http_status: None, oauth_error: None, error_description: None }
	}

	/// Adds an HTTP status code (e.g., 400, 401, 500).
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth error code string returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}
}

/// Default strategy that applies RFC-guided heuristics.
///
/// It prioritizes exact OAuth `error` codes, then hints inside `error_description`,
/// and finally the HTTP status code.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		classify_oauth_error(ctx.oauth_error.as_deref(), ctx.error_description.as_deref())
			.unwrap_or_else(|| classify_status(ctx.http_status))
	}
}

/// Shared implementation behind [`ProviderStrategy::profile_error_message`].
pub fn default_profile_error_message(payload: &Value) -> Option<String> {
	let text = |value: Option<&Value>| value.and_then(Value::as_str).map(str::to_owned);

	text(payload.get("error_description"))
		.or_else(|| text(payload.get("message")))
		.or_else(|| text(payload.get("error")))
		.or_else(|| text(payload.get("error").and_then(|error| error.get("message"))))
}

fn classify_oauth_error(
	oauth_error: Option<&str>,
	error_description: Option<&str>,
) -> Option<ProviderErrorKind> {
	oauth_error
		.and_then(match_exact_value)
		.or_else(|| error_description.and_then(match_exact_value))
		.or_else(|| classify_description(error_description))
}

fn match_exact_value(value: &str) -> Option<ProviderErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant") || value.eq_ignore_ascii_case("access_denied") {
		Some(ProviderErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(ProviderErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("invalid_scope")
		|| value.eq_ignore_ascii_case("insufficient_scope")
	{
		Some(ProviderErrorKind::InsufficientScope)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(ProviderErrorKind::Transient)
	} else {
		None
	}
}

fn classify_description(description: Option<&str>) -> Option<ProviderErrorKind> {
	let lowered = description?.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") => Some(ProviderErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(ProviderErrorKind::InvalidClient),
		text if text.contains("insufficient_scope") || text.contains("invalid_scope") =>
			Some(ProviderErrorKind::InsufficientScope),
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(ProviderErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(400 | 404 | 410) => ProviderErrorKind::InvalidGrant,
		Some(401) => ProviderErrorKind::InvalidClient,
		Some(403) => ProviderErrorKind::InsufficientScope,
		Some(429) => ProviderErrorKind::Transient,
		Some(code) if code >= 500 => ProviderErrorKind::Transient,
		_ => ProviderErrorKind::Transient,
	}
}

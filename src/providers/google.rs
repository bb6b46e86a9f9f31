//! Google login.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::ConfigError,
	provider::{
		ClientAuthMethod, DefaultProviderStrategy, GrantType, ProviderDescriptor,
		ProviderErrorContext, ProviderErrorKind, ProviderQuirks, ProviderStrategy,
	},
	providers::{self, ProviderPreset},
};

const AUTHORIZATION_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const REVOCATION_URL: &str = "https://oauth2.googleapis.com/revoke";

/// Google-specific authorization parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleOptions {
	/// `offline` asks Google to issue a refresh token.
	pub access_type: Option<String>,
	/// `consent`, `select_account`, or `none`.
	pub prompt: Option<String>,
	/// Pre-fills the account chooser.
	pub login_hint: Option<String>,
}
impl GoogleOptions {
	/// Requests a refresh token and forces the consent screen so one is always issued.
	pub fn offline() -> Self {
		Self {
			access_type: Some("offline".into()),
			prompt: Some("consent".into()),
			..Default::default()
		}
	}
}

/// Builds the Google preset with default options.
pub fn google() -> Result<ProviderPreset> {
	google_with(GoogleOptions::default())
}

/// Builds the Google preset.
pub fn google_with(options: GoogleOptions) -> Result<ProviderPreset> {
	let descriptor = ProviderDescriptor::builder(
		ProviderId::new("google").map_err(ConfigError::from)?,
	)
	.authorization_endpoint(providers::endpoint(AUTHORIZATION_URL)?)
	.token_endpoint(providers::endpoint(TOKEN_URL)?)
	.userinfo_endpoint(providers::endpoint(USERINFO_URL)?)
	.revocation_endpoint(providers::endpoint(REVOCATION_URL)?)
	.support_grant(GrantType::RefreshToken)
	.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
	.quirks(ProviderQuirks::default())
	.build()
	.map_err(ConfigError::from)?;

	Ok(ProviderPreset::custom(descriptor)
		.with_strategy(Arc::new(GoogleStrategy { options }))
		.with_default_scope(["openid", "email", "profile"]))
}

/// Strategy that appends [`GoogleOptions`] to the authorization redirect.
#[derive(Debug, Default)]
pub struct GoogleStrategy {
	/// Options applied to every redirect.
	pub options: GoogleOptions,
}
impl ProviderStrategy for GoogleStrategy {
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		DefaultProviderStrategy.classify_token_error(ctx)
	}

	fn augment_authorize_request(&self, params: &mut Vec<(String, String)>) {
		let options = [
			("access_type", &self.options.access_type),
			("prompt", &self.options.prompt),
			("login_hint", &self.options.login_hint),
		];

		for (key, value) in options {
			if let Some(value) = value
				&& !params.iter().any(|(existing, _)| existing == key)
			{
				params.push((key.to_owned(), value.clone()));
			}
		}
	}
}

/// `oauth2/v2/userinfo` payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleUser {
	/// Stable account id.
	pub id: String,
	/// Primary email, with the `email` scope.
	pub email: Option<String>,
	/// Whether Google verified `email`.
	pub verified_email: Option<bool>,
	/// Full name.
	pub name: Option<String>,
	/// First name.
	pub given_name: Option<String>,
	/// Last name.
	pub family_name: Option<String>,
	/// Avatar URL.
	pub picture: Option<String>,
	/// BCP 47 locale.
	pub locale: Option<String>,
	/// Workspace domain.
	pub hd: Option<String>,
	/// Remaining fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn options_are_appended_once() {
		let strategy = GoogleStrategy {
			options: GoogleOptions {
				login_hint: Some("a@example.com".into()),
				..GoogleOptions::offline()
			},
		};
		let mut params = vec![("prompt".to_string(), "select_account".to_string())];

		strategy.augment_authorize_request(&mut params);

		assert_eq!(
			params,
			vec![
				("prompt".to_string(), "select_account".to_string()),
				("access_type".to_string(), "offline".to_string()),
				("login_hint".to_string(), "a@example.com".to_string()),
			]
		);
	}

	#[test]
	fn preset_supports_refresh_and_revocation() {
		let preset = google().expect("Google preset should build.");

		assert!(preset.descriptor.supports(GrantType::RefreshToken));
		assert!(preset.descriptor.endpoints.revocation.is_some());
		assert_eq!(preset.descriptor.quirks.scope_delimiter, ' ');
	}
}

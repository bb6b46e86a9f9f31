//! LinkedIn login (OpenID Connect product).
//!
//! Scopes are requested space-separated but the token response lists them comma-separated, and
//! the token response carries no `token_type`.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::ConfigError,
	provider::{ClientAuthMethod, ProviderDescriptor, ProviderQuirks},
	providers::{self, ProviderPreset},
};

const AUTHORIZATION_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";
const TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";
const USERINFO_URL: &str = "https://api.linkedin.com/v2/userinfo";

/// Builds the LinkedIn preset.
pub fn linkedin() -> Result<ProviderPreset> {
	let descriptor = ProviderDescriptor::builder(
		ProviderId::new("linkedin").map_err(ConfigError::from)?,
	)
	.authorization_endpoint(providers::endpoint(AUTHORIZATION_URL)?)
	.token_endpoint(providers::endpoint(TOKEN_URL)?)
	.userinfo_endpoint(providers::endpoint(USERINFO_URL)?)
	.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
	.quirks(ProviderQuirks { granted_scope_delimiter: Some(','), ..Default::default() })
	.build()
	.map_err(ConfigError::from)?;

	Ok(ProviderPreset::custom(descriptor).with_default_scope(["openid", "profile", "email"]))
}

/// `v2/userinfo` payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedInUser {
	/// Member id.
	pub sub: String,
	/// Full name.
	pub name: Option<String>,
	/// First name.
	pub given_name: Option<String>,
	/// Last name.
	pub family_name: Option<String>,
	/// Avatar URL.
	pub picture: Option<String>,
	/// Primary email, with the `email` scope.
	pub email: Option<String>,
	/// Whether LinkedIn verified `email`.
	pub email_verified: Option<bool>,
	/// Member locale.
	pub locale: Option<LinkedInLocale>,
	/// Remaining fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

/// Locale object LinkedIn returns in place of a BCP 47 string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedInLocale {
	/// ISO 3166 country code.
	pub country: String,
	/// ISO 639 language code.
	pub language: String,
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::auth::UserProfile;

	#[test]
	fn granted_scopes_use_commas() {
		let preset = linkedin().expect("LinkedIn preset should build.");

		assert_eq!(preset.descriptor.quirks.scope_delimiter, ' ');
		assert_eq!(preset.descriptor.quirks.granted_delimiter(), ',');
	}

	#[test]
	fn user_payload_decodes_locale_object() {
		let Value::Object(fields) = json!({
			"sub": "782bbtaQ",
			"name": "John Doe",
			"email_verified": true,
			"locale": { "country": "US", "language": "en" }
		}) else {
			panic!("Fixture must be a JSON object.");
		};
		let profile = UserProfile::new(ProviderId::new("linkedin").expect("Valid id."), fields);
		let user: LinkedInUser = profile.parse().expect("LinkedIn user should decode.");

		assert_eq!(user.sub, "782bbtaQ");
		assert_eq!(user.locale.map(|locale| locale.country), Some("US".into()));
	}
}

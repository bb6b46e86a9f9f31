//! GitHub login (OAuth Apps and GitHub Apps).
//!
//! GitHub joins scopes with commas, reports token errors with HTTP 200, and names its error
//! codes differently from RFC 6749 (`bad_verification_code`, `incorrect_client_credentials`).

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

const AUTHORIZATION_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USERINFO_URL: &str = "https://api.github.com/user";

/// Kind of GitHub integration the client credentials belong to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GitHubAppKind {
	/// Classic OAuth App: scopes are requested on the redirect, tokens do not expire.
	#[default]
	OAuthApp,
	/// GitHub App acting on behalf of a user: permissions come from the installation, and
	/// expiring user tokens come with a refresh token.
	GitHubApp,
}

/// Builds the GitHub preset.
pub fn github(kind: GitHubAppKind) -> Result<ProviderPreset> {
	let mut builder = ProviderDescriptor::builder(
		ProviderId::new("github").map_err(ConfigError::from)?,
	)
	.authorization_endpoint(providers::endpoint(AUTHORIZATION_URL)?)
	.token_endpoint(providers::endpoint(TOKEN_URL)?)
	.userinfo_endpoint(providers::endpoint(USERINFO_URL)?)
	.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost);
	let mut quirks = ProviderQuirks { scope_delimiter: ',', ..Default::default() };

	if kind == GitHubAppKind::GitHubApp {
		quirks.send_scope = false;
		builder = builder.support_grant(GrantType::RefreshToken);
	}

	let descriptor = builder.quirks(quirks).build().map_err(ConfigError::from)?;

	Ok(ProviderPreset::custom(descriptor)
		.with_strategy(Arc::new(GitHubStrategy))
		.with_default_scope(["read:user", "user:email"]))
}

/// Strategy that understands GitHub's token error codes.
#[derive(Debug, Default)]
pub struct GitHubStrategy;
impl ProviderStrategy for GitHubStrategy {
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		match ctx.oauth_error.as_deref() {
			Some("bad_verification_code" | "bad_refresh_token" | "redirect_uri_mismatch") =>
				ProviderErrorKind::InvalidGrant,
			Some("incorrect_client_credentials" | "unverified_user_email") =>
				ProviderErrorKind::InvalidClient,
			_ => DefaultProviderStrategy.classify_token_error(ctx),
		}
	}
}

/// Subset of the `GET /user` payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
	/// Numeric account id.
	pub id: u64,
	/// Handle.
	pub login: String,
	/// Display name.
	pub name: Option<String>,
	/// Public email.
	pub email: Option<String>,
	/// Avatar URL.
	pub avatar_url: Option<String>,
	/// Profile page.
	pub html_url: Option<String>,
	/// Company field.
	pub company: Option<String>,
	/// Location field.
	pub location: Option<String>,
	/// Biography.
	pub bio: Option<String>,
	/// `User` or `Organization`.
	#[serde(rename = "type")]
	pub kind: Option<String>,
	/// Remaining fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

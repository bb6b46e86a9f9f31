//! Gate configuration: client credentials, requested scopes, and anti-forgery settings.
//!
//! [`GateConfig`] is plain data. It deserializes from any serde format, can be filled from
//! `<PREFIX>_ID` / `<PREFIX>_SECRET` / `<PREFIX>_REDIRECT_URI` environment variables, and is
//! validated against a [`ProviderDescriptor`] when the gate is constructed so misconfiguration
//! fails at startup instead of on the first login.

// std
use std::env;
// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	error::ConfigError,
	provider::ProviderDescriptor,
};

/// User-supplied settings for one provider login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
	/// OAuth client identifier.
	pub client_id: Option<String>,
	/// OAuth client secret; required unless the descriptor uses a public PKCE client.
	pub client_secret: Option<String>,
	/// Requested scopes. An empty list falls back to the provider preset's defaults.
	pub scope: Vec<String>,
	/// Fixed callback URL. Derived from the incoming request when unset.
	pub redirect_uri: Option<Url>,
	/// Fixed anti-forgery state. A random value is generated per redirect when unset.
	pub state: Option<String>,
	/// Extra query parameters appended to the authorization redirect.
	pub authorize_params: BTreeMap<String, String>,
	/// Adds the `Secure` attribute to the gate's cookies (default `true`).
	pub cookie_secure: bool,
}
impl GateConfig {
	/// Creates a configuration for a confidential client.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: Some(client_id.into()),
			client_secret: Some(client_secret.into()),
			..Default::default()
		}
	}

	/// Creates a configuration for a public client that authenticates with PKCE only.
	pub fn public(client_id: impl Into<String>) -> Self {
		Self { client_id: Some(client_id.into()), ..Default::default() }
	}

	/// Reads `<PREFIX>_ID`, `<PREFIX>_SECRET`, and `<PREFIX>_REDIRECT_URI`.
	///
	/// `GateConfig::from_env("GITHUB")` reads `GITHUB_ID` and `GITHUB_SECRET`. Unset variables
	/// leave the corresponding field empty; validation happens when the gate is built.
	pub fn from_env(prefix: &str) -> Result<Self> {
		Self::default().or_env(prefix)
	}

	/// Fills fields that are still unset from `<PREFIX>_*` environment variables.
	pub fn or_env(self, prefix: &str) -> Result<Self> {
		self.or_lookup(prefix, |key| env::var(key).ok())
	}

	fn or_lookup<F>(mut self, prefix: &str, lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |suffix: &str| lookup(&format!("{prefix}_{suffix}")).filter(|v| !v.is_empty());

		if self.client_id.is_none() {
			self.client_id = read("ID");
		}
		if self.client_secret.is_none() {
			self.client_secret = read("SECRET");
		}
		if self.redirect_uri.is_none()
			&& let Some(raw) = read("REDIRECT_URI")
		{
			self.redirect_uri =
				Some(Url::parse(&raw).map_err(|source| ConfigError::InvalidRedirect { source })?);
		}

		Ok(self)
	}

	/// Replaces the requested scopes.
	pub fn with_scope<I, S>(mut self, scope: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scope = scope.into_iter().map(Into::into).collect();

		self
	}

	/// Pins the callback URL instead of deriving it from each request.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Pins the anti-forgery state value.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Appends a query parameter to the authorization redirect.
	pub fn with_authorize_param(
		mut self,
		key: impl Into<String>,
		value: impl Into<String>,
	) -> Self {
		self.authorize_params.insert(key.into(), value.into());

		self
	}

	/// Toggles the `Secure` cookie attribute (disable only for plain-HTTP local development).
	pub fn with_cookie_secure(mut self, secure: bool) -> Self {
		self.cookie_secure = secure;

		self
	}

	/// Checks the configuration against `descriptor` and normalizes the requested scopes.
	pub fn validate(&self, descriptor: &ProviderDescriptor) -> Result<ValidatedConfig> {
		let client_id = self
			.client_id
			.clone()
			.filter(|id| !id.is_empty())
			.ok_or_else(|| ConfigError::MissingClientId { descriptor: descriptor.id.to_string() })?;
		let client_secret = self.client_secret.clone().filter(|secret| !secret.is_empty());

		if descriptor.preferred_client_auth_method.requires_secret() && client_secret.is_none() {
			return Err(ConfigError::MissingClientSecret { descriptor: descriptor.id.to_string() }
				.into());
		}
		if self.state.as_deref().is_some_and(str::is_empty) {
			return Err(ConfigError::EmptyState.into());
		}

		let scope = ScopeSet::new(self.scope.iter().cloned()).map_err(ConfigError::from)?;

		Ok(ValidatedConfig { client_id, client_secret, scope })
	}
}
impl Default for GateConfig {
	fn default() -> Self {
		Self {
			client_id: None,
			client_secret: None,
			scope: Vec::new(),
			redirect_uri: None,
			state: None,
			authorize_params: BTreeMap::new(),
			cookie_secure: true,
		}
	}
}
impl Debug for GateConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GateConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("scope", &self.scope)
			.field("redirect_uri", &self.redirect_uri)
			.field("state_set", &self.state.is_some())
			.field("authorize_params", &self.authorize_params)
			.field("cookie_secure", &self.cookie_secure)
			.finish()
	}
}

/// Output of [`GateConfig::validate`].
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
	/// Non-empty client identifier.
	pub client_id: String,
	/// Client secret, when configured.
	pub client_secret: Option<String>,
	/// Normalized requested scopes.
	pub scope: ScopeSet,
}
impl Debug for ValidatedConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ValidatedConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("scope", &self.scope)
			.finish()
	}
}

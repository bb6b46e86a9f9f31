//! The shared gate and the per-request authorization-code flow it drives.
//!
//! [`OAuthGate`] is constructed once at startup and holds everything that is immutable across
//! requests: the HTTP transport, provider descriptor and strategy, validated client credentials,
//! and anti-forgery settings. Each request gets its own [`AuthFlow`] borrowed from the gate,
//! which walks the redirect, code exchange, and profile fetch steps and is dropped with the
//! request.

pub mod authorize;
pub mod exchange;
pub mod profile;
pub mod refresh;
pub mod revoke;

mod common;

pub use authorize::*;

// self
use crate::{
	_prelude::*,
	auth::{GrantedScopes, ScopeSet, Token, UserProfile},
	config::GateConfig,
	http::ProviderHttpClient,
	oauth::{BasicFacade, TransportErrorMapper},
	provider::{ProviderDescriptor, ProviderStrategy},
};
#[cfg(feature = "reqwest")]
use crate::{
	http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper, providers::ProviderPreset,
};

#[cfg(feature = "reqwest")]
/// Gate specialized for the crate's default reqwest transport stack.
pub type ReqwestGate = OAuthGate<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Process-wide login configuration for a single provider.
///
/// Build it once, wrap it in an [`Arc`], and hand it to
/// [`axum::middleware::from_fn_with_state`] together with
/// [`authenticate`](crate::middleware::authenticate). Construction validates the descriptor
/// and credentials so a misconfigured gate never serves a request.
pub struct OAuthGate<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Provider descriptor that defines OAuth endpoints and quirks.
	pub descriptor: ProviderDescriptor,
	/// Strategy responsible for provider-specific request adjustments and error mapping.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// OAuth 2.0 client identifier used in every grant.
	pub client_id: String,
	/// Requested scopes, normalized.
	pub scope: ScopeSet,
	/// Fixed callback URL; derived per request when unset.
	pub redirect_uri: Option<Url>,
	/// Fixed anti-forgery state; generated per redirect when unset.
	pub state: Option<String>,
	/// Extra authorization-redirect parameters from configuration.
	pub authorize_params: Vec<(String, String)>,
	/// Whether the gate's cookies carry the `Secure` attribute.
	pub cookie_secure: bool,
	client_secret: Option<String>,
	facade: BasicFacade<C, M>,
}
impl<C, M> OAuthGate<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a gate that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		config: GateConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		descriptor.validate().map_err(crate::error::ConfigError::from)?;

		let validated = config.validate(&descriptor)?;
		let http_client = http_client.into();
		let transport_mapper = mapper.into();
		let facade = BasicFacade::from_descriptor(
			&descriptor,
			&validated.client_id,
			validated.client_secret.as_deref(),
			http_client.clone(),
			transport_mapper.clone(),
		)?;

		Ok(Self {
			http_client,
			transport_mapper,
			descriptor,
			strategy,
			client_id: validated.client_id,
			scope: validated.scope,
			redirect_uri: config.redirect_uri,
			state: config.state,
			authorize_params: config.authorize_params.into_iter().collect(),
			cookie_secure: config.cookie_secure,
			client_secret: validated.client_secret,
			facade,
		})
	}

	/// Starts the per-request flow for a callback carrying `code` (and optionally `state`).
	///
	/// Pass `None` for the code on the initial, unauthenticated request.
	pub fn flow(&self, code: Option<String>, state: Option<String>) -> AuthFlow<'_, C, M> {
		AuthFlow {
			gate: self,
			scope: self.scope.clone(),
			code,
			state,
			token: None,
			refresh_token: None,
			user: None,
			granted_scopes: None,
		}
	}

	/// Returns true when a client secret is configured.
	pub fn has_client_secret(&self) -> bool {
		self.client_secret.is_some()
	}

	pub(crate) fn facade(&self) -> &BasicFacade<C, M> {
		&self.facade
	}

	pub(crate) fn client_secret(&self) -> Option<&str> {
		self.client_secret.as_deref()
	}
}
#[cfg(feature = "reqwest")]
impl OAuthGate<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a gate backed by the default reqwest transport (no redirects, gate `User-Agent`).
	pub fn new(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		config: GateConfig,
	) -> Result<Self> {
		Self::with_http_client(
			descriptor,
			strategy,
			config,
			ReqwestHttpClient::new()?,
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Creates a gate for one of the bundled providers.
	///
	/// When `config.scope` is empty, the preset's default scopes are requested.
	pub fn from_preset(preset: ProviderPreset, config: GateConfig) -> Result<Self> {
		let (descriptor, strategy, config) = preset.apply(config);

		Self::new(descriptor, strategy, config)
	}
}
impl<C, M> Debug for OAuthGate<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthGate")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("scope", &self.scope)
			.field("redirect_uri", &self.redirect_uri)
			.field("state_set", &self.state.is_some())
			.field("cookie_secure", &self.cookie_secure)
			.finish()
	}
}

/// Per-request authorization-code flow state.
///
/// Created by [`OAuthGate::flow`] and owned by one middleware invocation. Client credentials
/// are borrowed from the gate; everything else is filled in as the flow advances.
pub struct AuthFlow<'g, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	gate: &'g OAuthGate<C, M>,
	/// Requested scopes.
	pub scope: ScopeSet,
	/// Authorization code received on the callback.
	pub code: Option<String>,
	/// `state` received on the callback.
	pub state: Option<String>,
	/// Access token, once exchanged.
	pub token: Option<Token>,
	/// Refresh token, when the provider issued one.
	pub refresh_token: Option<Token>,
	/// User profile, once fetched.
	pub user: Option<UserProfile>,
	/// Scopes the provider granted, once exchanged.
	pub granted_scopes: Option<GrantedScopes>,
}
impl<'g, C, M> AuthFlow<'g, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Gate this flow belongs to.
	pub fn gate(&self) -> &'g OAuthGate<C, M> {
		self.gate
	}

	/// Client identifier borrowed from the gate.
	pub fn client_id(&self) -> &'g str {
		&self.gate.client_id
	}

	/// Exchanges the code and fetches the user profile.
	///
	/// On success `token`, `granted_scopes`, and `user` are populated (plus `refresh_token` when
	/// issued). No retries: the first failure is returned.
	pub async fn authenticate(
		&mut self,
		redirect_uri: &Url,
		pkce_verifier: Option<&str>,
	) -> Result<()> {
		self.exchange(redirect_uri, pkce_verifier).await?;
		self.fetch_profile().await
	}
}
impl<C, M> Debug for AuthFlow<'_, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthFlow")
			.field("provider", &self.gate.descriptor.id)
			.field("scope", &self.scope)
			.field("code_set", &self.code.is_some())
			.field("state", &self.state)
			.field("token", &self.token)
			.field("refresh_token", &self.refresh_token)
			.field("user", &self.user.as_ref().map(|user| user.var_name()))
			.field("granted_scopes", &self.granted_scopes)
			.finish()
	}
}

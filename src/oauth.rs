//! Token endpoint facade built on the `oauth2` crate, plus transport error mapping.
//!
//! The facade drives the `authorization_code` and `refresh_token` grants and normalizes the
//! provider's answer into a [`TokenGrant`]. It also tolerates the two token-endpoint habits that
//! strict RFC 6749 parsing rejects: error payloads delivered with HTTP 200 (GitHub) and
//! responses without a `token_type` (LinkedIn).

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, ExtraTokenFields, HttpClientError, PkceCodeVerifier, RedirectUrl, RefreshToken,
	RequestTokenError, StandardRevocableToken, StandardTokenResponse, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::{GrantedScopes, ScopeSet, Token, TokenGrant},
	error::{ConfigError, TransientError, TransportError},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::FlowKind,
	provider::{
		ClientAuthMethod, GrantType, ProviderDescriptor, ProviderErrorContext, ProviderErrorKind,
		ProviderStrategy,
	},
};

type GateTokenResponse = StandardTokenResponse<GateTokenFields, BasicTokenType>;
type GateClient<HasAuthUrl = EndpointSet, HasTokenUrl = EndpointSet> = Client<
	BasicErrorResponse,
	GateTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	HasAuthUrl,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	HasTokenUrl,
>;
type UnconfiguredClient = GateClient<EndpointNotSet, EndpointNotSet>;
type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Non-standard token response fields the gate understands.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateTokenFields {
	/// Lifetime of the refresh token in seconds (GitHub Apps with expiring tokens).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token_expires_in: Option<u64>,
}
impl ExtraTokenFields for GateTokenFields {}

/// Maps HTTP transport failures into gate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a gate error.
	fn map_transport_error(
		&self,
		flow: FlowKind,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		flow: FlowKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(flow, meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(flow, meta, message),
			_ => map_unknown_transport_error(flow, meta),
		}
	}
}

/// Inputs for a single `authorization_code` exchange.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CodeExchange<'a> {
	pub(crate) code: &'a str,
	pub(crate) pkce_verifier: Option<&'a str>,
	pub(crate) redirect_uri: &'a Url,
	pub(crate) requested_scope: &'a ScopeSet,
}

pub(crate) trait OAuth2Facade {
	fn exchange_authorization_code<'a, 'strategy, 'req>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		exchange: CodeExchange<'req>,
	) -> FacadeFuture<'a, TokenGrant>
	where
		'strategy: 'a,
		'req: 'a;

	fn refresh_token<'a, 'strategy, 'refresh, 'scope>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		refresh_token: &'refresh str,
		requested_scope: &'scope ScopeSet,
	) -> FacadeFuture<'a, TokenGrant>
	where
		'strategy: 'a,
		'refresh: 'a,
		'scope: 'a;
}

pub(crate) struct BasicFacade<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: GateClient,
	scope_delimiter: char,
	granted_delimiter: char,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_descriptor(
		descriptor: &ProviderDescriptor,
		client_id: &str,
		client_secret: Option<&str>,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let secret = if descriptor.preferred_client_auth_method.requires_secret() {
			client_secret.map(|value| ClientSecret::new(value.to_owned()))
		} else {
			None
		};
		let mut oauth_client: GateClient =
			UnconfiguredClient::new(ClientId::new(client_id.to_owned()))
				.set_auth_uri(auth_url)
				.set_token_uri(token_url);

		if let Some(secret) = secret {
			oauth_client = oauth_client.set_client_secret(secret);
		}
		if matches!(descriptor.preferred_client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self {
			oauth_client,
			scope_delimiter: descriptor.quirks.scope_delimiter,
			granted_delimiter: descriptor.quirks.granted_delimiter(),
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
		})
	}

	async fn finish<F>(
		&self,
		strategy: &dyn ProviderStrategy,
		grant: GrantType,
		meta: &ResponseMetadataSlot,
		requested_scope: &ScopeSet,
		request: F,
	) -> Result<TokenGrant>
	where
		F: Future<
				Output = Result<
					GateTokenResponse,
					BasicRequestTokenError<HttpClientError<C::TransportError>>,
				>,
			>,
	{
		let parts = match request.await {
			Ok(response) => TokenParts::from_response(&response),
			Err(RequestTokenError::Parse(source, body)) => match recover_body(&body) {
				Some(RecoveredBody::Token(parts)) => parts,
				Some(RecoveredBody::Error(response)) =>
					return Err(map_server_response_error(
						strategy,
						grant,
						response,
						meta.take().as_ref(),
					)),
				None =>
					return Err(TransientError::TokenResponseParse {
						source,
						status: meta_status(meta.take().as_ref()),
					}
					.into()),
			},
			Err(err) =>
				return Err(map_request_error(
					strategy,
					grant,
					meta.take(),
					err,
					self.error_mapper.as_ref(),
				)),
		};

		parts.into_grant(requested_scope, self.granted_delimiter)
	}

	fn token_params(
		&self,
		strategy: &dyn ProviderStrategy,
		grant: GrantType,
		requested_scope: Option<&ScopeSet>,
	) -> BTreeMap<String, String> {
		let mut form = BTreeMap::new();

		if let Some(scope) = requested_scope.filter(|scope| !scope.is_empty()) {
			form.insert("scope".into(), scope.join(self.scope_delimiter));
		}

		strategy.augment_token_request(grant, &mut form);

		form
	}
}
impl<C, M> OAuth2Facade for BasicFacade<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn exchange_authorization_code<'a, 'strategy, 'req>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		exchange: CodeExchange<'req>,
	) -> FacadeFuture<'a, TokenGrant>
	where
		'strategy: 'a,
		'req: 'a,
	{
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let redirect_url = RedirectUrl::new(exchange.redirect_uri.to_string())
				.map_err(|source| ConfigError::InvalidRedirect { source })?;
			let params = self.token_params(strategy, GrantType::AuthorizationCode, None);
			let mut request = self
				.oauth_client
				.exchange_code(AuthorizationCode::new(exchange.code.to_owned()))
				.set_redirect_uri(Cow::Owned(redirect_url));

			if let Some(verifier) = exchange.pkce_verifier {
				request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_owned()));
			}
			for (key, value) in params {
				request = request.add_extra_param(key, value);
			}

			self.finish(
				strategy,
				GrantType::AuthorizationCode,
				&meta,
				exchange.requested_scope,
				request.request_async(&instrumented),
			)
			.await
		})
	}

	fn refresh_token<'a, 'strategy, 'refresh, 'scope>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		refresh_token: &'refresh str,
		requested_scope: &'scope ScopeSet,
	) -> FacadeFuture<'a, TokenGrant>
	where
		'strategy: 'a,
		'refresh: 'a,
		'scope: 'a,
	{
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let refresh_secret = RefreshToken::new(refresh_token.to_owned());
			let params =
				self.token_params(strategy, GrantType::RefreshToken, Some(requested_scope));
			let mut request = self.oauth_client.exchange_refresh_token(&refresh_secret);

			for (key, value) in params {
				request = request.add_extra_param(key, value);
			}

			self.finish(
				strategy,
				GrantType::RefreshToken,
				&meta,
				requested_scope,
				request.request_async(&instrumented),
			)
			.await
		})
	}
}

/// Token endpoint answer reduced to the fields the gate consumes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
struct TokenParts {
	access_token: String,
	#[serde(default)]
	expires_in: Option<u64>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	refresh_token_expires_in: Option<u64>,
	#[serde(default)]
	scope: Option<String>,
}
impl TokenParts {
	fn from_response(response: &GateTokenResponse) -> Self {
		Self {
			access_token: response.access_token().secret().to_owned(),
			expires_in: response.expires_in().map(|lifetime| lifetime.as_secs()),
			refresh_token: response.refresh_token().map(|token| token.secret().to_owned()),
			refresh_token_expires_in: response.extra_fields().refresh_token_expires_in,
			// `oauth2` splits on spaces only; rejoin so the provider delimiter can be applied.
			scope: response.scopes().map(|scopes| {
				scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" ")
			}),
		}
	}

	fn into_grant(self, requested_scope: &ScopeSet, delimiter: char) -> Result<TokenGrant> {
		let issued_at = OffsetDateTime::now_utc();
		let token =
			Token::issued_at(self.access_token, lifetime(self.expires_in, issued_at)?, issued_at);
		let refresh_lifetime = lifetime(self.refresh_token_expires_in, issued_at)?;
		let refresh_token =
			self.refresh_token.map(|value| Token::issued_at(value, refresh_lifetime, issued_at));
		let granted_scopes = match self.scope {
			Some(raw) => GrantedScopes::split(&raw, delimiter),
			None => GrantedScopes::from(requested_scope),
		};

		Ok(TokenGrant { token, refresh_token, granted_scopes })
	}
}

enum RecoveredBody {
	Error(BasicErrorResponse),
	Token(TokenParts),
}

/// Salvages a token endpoint body that failed strict parsing.
fn recover_body(body: &[u8]) -> Option<RecoveredBody> {
	if let Ok(response) = serde_json::from_slice::<BasicErrorResponse>(body) {
		return Some(RecoveredBody::Error(response));
	}

	serde_json::from_slice::<TokenParts>(body).ok().map(RecoveredBody::Token)
}

/// Converts a provider-reported lifetime, rejecting values that overflow `issued_at`.
fn lifetime(seconds: Option<u64>, issued_at: OffsetDateTime) -> Result<Option<Duration>> {
	seconds
		.map(|secs| {
			i64::try_from(secs)
				.ok()
				.map(Duration::seconds)
				.filter(|lifetime| issued_at.checked_add(*lifetime).is_some())
				.ok_or(Error::from(ConfigError::ExpiresInOutOfRange))
		})
		.transpose()
}

fn map_request_error<E, M>(
	strategy: &dyn ProviderStrategy,
	grant: GrantType,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(strategy, grant, response, meta_ref),
		RequestTokenError::Request(error) =>
			mapper.map_transport_error(flow_of(grant), meta_ref, error),
		RequestTokenError::Parse(error, _body) =>
			TransientError::TokenResponseParse { source: error, status: meta_status(meta_ref) }
				.into(),
		RequestTokenError::Other(message) => TransientError::Endpoint {
			endpoint: "token",
			message,
			status: meta_status(meta_ref),
		}
		.into(),
	}
}

fn map_server_response_error(
	strategy: &dyn ProviderStrategy,
	grant: GrantType,
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let code = response.error().as_ref().to_string();
	let mut ctx = ProviderErrorContext::new(grant).with_oauth_error(code.clone());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = meta_status(meta) {
		ctx = ctx.with_http_status(status);
	}

	let reason = response.error_description().cloned().unwrap_or(code);

	match strategy.classify_token_error(&ctx) {
		ProviderErrorKind::InvalidGrant => Error::InvalidGrant { reason },
		ProviderErrorKind::InvalidClient => Error::InvalidClient { reason },
		ProviderErrorKind::InsufficientScope => Error::InsufficientScope { reason },
		ProviderErrorKind::Transient => Error::Upstream { reason },
	}
}

fn flow_of(grant: GrantType) -> FlowKind {
	match grant {
		GrantType::AuthorizationCode => FlowKind::TokenExchange,
		GrantType::RefreshToken => FlowKind::Refresh,
	}
}

/// Endpoint label used in transport error messages.
#[cfg(feature = "reqwest")]
fn endpoint_label(flow: FlowKind) -> &'static str {
	match flow {
		FlowKind::AuthorizationCode | FlowKind::TokenExchange | FlowKind::Refresh => "token",
		FlowKind::Profile => "userinfo",
		FlowKind::Revoke => "revocation",
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(flow: FlowKind, meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::Endpoint {
			endpoint: endpoint_label(flow),
			message: "request timed out".into(),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
		}
		.into();
	}

	TransportError::from(err).into()
}

#[cfg(feature = "reqwest")]
fn map_generic_transport_error(
	flow: FlowKind,
	meta: Option<&ResponseMetadata>,
	message: impl Display,
) -> Error {
	TransientError::Endpoint {
		endpoint: endpoint_label(flow),
		message: format!("HTTP client error: {message}"),
		status: meta_status(meta),
	}
	.into()
}

#[cfg(feature = "reqwest")]
fn map_unknown_transport_error(flow: FlowKind, meta: Option<&ResponseMetadata>) -> Error {
	TransientError::Endpoint {
		endpoint: endpoint_label(flow),
		message: "unknown HTTP client error".into(),
		status: meta_status(meta),
	}
	.into()
}

pub(crate) fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// crates.io
	use oauth2::basic::BasicErrorResponseType;
	// self
	use super::*;
	use crate::{auth::ProviderId, http::ReqwestHttpClient, provider::DefaultProviderStrategy};

	fn descriptor(method: ClientAuthMethod) -> ProviderDescriptor {
		let provider_id =
			ProviderId::new("test-provider").expect("Failed to construct provider identifier.");
		let mut builder = ProviderDescriptor::builder(provider_id)
			.authorization_endpoint(
				Url::parse("https://example.com/oauth2/authorize")
					.expect("Failed to parse authorization endpoint URL."),
			)
			.token_endpoint(
				Url::parse("https://example.com/oauth2/token")
					.expect("Failed to parse token endpoint URL."),
			)
			.userinfo_endpoint(
				Url::parse("https://example.com/userinfo")
					.expect("Failed to parse user-info endpoint URL."),
			)
			.preferred_client_auth_method(method);

		if !method.requires_secret() {
			builder.quirks.pkce_required = true;
		}

		builder.build().expect("Failed to build provider descriptor.")
	}

	fn facade(
		method: ClientAuthMethod,
		secret: Option<&str>,
	) -> Result<BasicFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>> {
		BasicFacade::from_descriptor(
			&descriptor(method),
			"client-id",
			secret,
			Arc::new(ReqwestHttpClient::default()),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	#[test]
	fn builds_clients_for_every_auth_method() {
		assert!(facade(ClientAuthMethod::ClientSecretBasic, Some("secret")).is_ok());
		assert!(facade(ClientAuthMethod::ClientSecretPost, Some("secret")).is_ok());
		assert!(facade(ClientAuthMethod::NoneWithPkce, Some("ignored-secret")).is_ok());
	}

	#[test]
	fn error_payloads_delivered_with_success_status_are_recovered() {
		let body = br#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#;
		let Some(RecoveredBody::Error(response)) = recover_body(body) else {
			panic!("GitHub-style error payload should be recovered as an error.");
		};
		let err = map_server_response_error(
			&DefaultProviderStrategy,
			GrantType::AuthorizationCode,
			response,
			None,
		);

		assert_eq!(err.public_message(), "The code passed is incorrect or expired.");
	}

	#[test]
	fn responses_without_token_type_are_recovered() {
		let body = br#"{"access_token":"AQX","expires_in":5184000,"scope":"r_liteprofile"}"#;
		let Some(RecoveredBody::Token(parts)) = recover_body(body) else {
			panic!("Token body without token_type should be recovered.");
		};

		assert_eq!(parts.access_token, "AQX");
		assert_eq!(parts.expires_in, Some(5_184_000));
		assert!(recover_body(b"<html>oops</html>").is_none());
	}

	#[test]
	fn server_errors_fall_back_to_the_error_code() {
		let response = BasicErrorResponse::new(BasicErrorResponseType::InvalidGrant, None, None);
		let err = map_server_response_error(
			&DefaultProviderStrategy,
			GrantType::AuthorizationCode,
			response,
			None,
		);

		assert!(matches!(&err, Error::InvalidGrant { reason } if reason == "invalid_grant"));

		let response = BasicErrorResponse::new(
			BasicErrorResponseType::Extension("slow_down".into()),
			None,
			None,
		);
		let err = map_server_response_error(
			&DefaultProviderStrategy,
			GrantType::RefreshToken,
			response,
			Some(&ResponseMetadata { status: Some(503) }),
		);

		assert!(matches!(&err, Error::Upstream { reason } if reason == "slow_down"));
	}

	#[test]
	fn grants_split_scopes_with_the_provider_delimiter() {
		let requested = ScopeSet::new(["repo", "user"]).expect("Scope fixture should be valid.");
		let parts = TokenParts {
			access_token: "gho_123".into(),
			expires_in: None,
			refresh_token: Some("ghr_456".into()),
			refresh_token_expires_in: Some(15_897_600),
			scope: Some("repo,gist".into()),
		};
		let grant = parts.clone().into_grant(&requested, ',').expect("Grant should build.");

		assert_eq!(grant.token.value.expose(), "gho_123");
		assert_eq!(grant.token.expires_in, None);
		assert_eq!(grant.granted_scopes, GrantedScopes(vec!["repo".into(), "gist".into()]));
		assert_eq!(
			grant.refresh_token.and_then(|token| token.expires_in_seconds()),
			Some(15_897_600)
		);

		let grant = TokenParts { scope: None, ..parts }
			.into_grant(&requested, ',')
			.expect("Grant should build.");

		assert_eq!(grant.granted_scopes, GrantedScopes(vec!["repo".into(), "user".into()]));
	}

	#[test]
	fn oversized_lifetimes_are_rejected() {
		let now = OffsetDateTime::now_utc();

		for secs in [u64::MAX, i64::MAX as u64] {
			assert!(matches!(
				lifetime(Some(secs), now),
				Err(Error::Config(ConfigError::ExpiresInOutOfRange))
			));
		}

		assert_eq!(lifetime(None, now).expect("Missing lifetime is valid."), None);
		assert_eq!(
			lifetime(Some(3600), now).expect("Hour-long lifetime is valid."),
			Some(Duration::hours(1))
		);
	}

	#[test]
	fn grants_reject_lifetimes_past_the_calendar() {
		let requested = ScopeSet::new(["user"]).expect("Scope fixture should be valid.");
		let parts = TokenParts {
			access_token: "a".into(),
			expires_in: Some(i64::MAX as u64),
			refresh_token: None,
			refresh_token_expires_in: None,
			scope: None,
		};

		assert!(matches!(
			parts.into_grant(&requested, ' '),
			Err(Error::Config(ConfigError::ExpiresInOutOfRange))
		));
	}
}

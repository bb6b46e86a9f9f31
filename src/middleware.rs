//! axum middleware that drives the authorization-code login for a route.
//!
//! Each request moves through three states:
//!
//! - **Unauthenticated**: no `code` query parameter. The middleware answers `302 Found` with the
//!   provider's authorization URL and sets short-lived cookies holding the anti-forgery state
//!   (and PKCE verifier, when required). Downstream handlers do not run.
//! - **Exchanging**: a `code` is present. The `state` is checked against the expected value
//!   before any network call; a mismatch answers `401`. The code is then exchanged and the user
//!   profile fetched. Any failure ends the request (`500`, with the provider's message when the
//!   provider reported it).
//! - **Authenticated**: results are published as request variables (see [`vars`]) and the
//!   request continues downstream.
//!
//! Every callback response, successful or not, clears the redirect cookies.

pub mod cookie;
pub mod response;
pub mod vars;

pub use vars::*;

// crates.io
use axum::{
	extract::{Request, State},
	http::{
		HeaderMap, HeaderValue, StatusCode, Uri,
		header::{HOST, LOCATION, SET_COOKIE},
	},
	middleware::Next,
	response::{IntoResponse, Response},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::{AuthorizationRedirect, OAuthGate},
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};
#[cfg(feature = "reqwest")] use crate::flows::ReqwestGate;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Middleware entrypoint for the default reqwest-backed gate.
///
/// ```ignore
/// Router::new()
/// 	.route("/login", get(handler))
/// 	.layer(axum::middleware::from_fn_with_state(gate, middleware::authenticate));
/// ```
#[cfg(feature = "reqwest")]
pub async fn authenticate(
	State(gate): State<Arc<ReqwestGate>>,
	request: Request,
	next: Next,
) -> Response {
	authenticate_with(State(gate), request, next).await
}

/// Middleware entrypoint for gates with a custom transport.
pub async fn authenticate_with<C, M>(
	State(gate): State<Arc<OAuthGate<C, M>>>,
	request: Request,
	next: Next,
) -> Response
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	const KIND: FlowKind = FlowKind::AuthorizationCode;

	let span = FlowSpan::new(KIND, "authenticate");

	obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

	span.instrument(run(&gate, request, next)).await
}

async fn run<C, M>(gate: &OAuthGate<C, M>, request: Request, next: Next) -> Response
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let callback = CallbackQuery::parse(request.uri());
	let redirect_uri = match resolve_redirect_uri(gate, request.uri(), request.headers()) {
		Ok(redirect_uri) => redirect_uri,
		Err(err) => return fail(gate, err),
	};

	if callback.code.is_none() && callback.error.is_none() {
		let redirect = gate.flow(None, None).redirect(&redirect_uri);

		return match redirect_response(gate, &redirect) {
			Ok(response) => {
				obs::record_flow_outcome(FlowKind::AuthorizationCode, FlowOutcome::Redirect);

				response
			},
			Err(err) => fail(gate, err),
		};
	}

	let mut response = complete(gate, request, next, callback, &redirect_uri).await;

	clear_redirect_cookies(gate, response.headers_mut());

	response
}

/// Handles a provider callback: consent check, state check, exchange, and handoff.
async fn complete<C, M>(
	gate: &OAuthGate<C, M>,
	mut request: Request,
	next: Next,
	callback: CallbackQuery,
	redirect_uri: &Url,
) -> Response
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let provider = &gate.descriptor.id;
	let code = match (callback.code, callback.error) {
		(_, Some(error)) => {
			let reason = callback.error_description.unwrap_or(error);

			obs::record_rejection(provider, "provider denied the authorization request");

			return Error::AccessDenied { reason }.into_response();
		},
		(Some(code), None) => code,
		(None, None) => return fail(gate, ConfigError::MissingFlowInput { field: "code" }.into()),
	};
	let expected_state = gate
		.state
		.clone()
		.or_else(|| cookie::read_cookie(request.headers(), &cookie::state_cookie_name(provider)));

	if let Err(err) = verify_state(
		expected_state.as_deref(),
		callback.state.as_deref(),
		gate.descriptor.quirks.verify_state,
	) {
		obs::record_rejection(provider, "state mismatch");

		return err.into_response();
	}

	let pkce_verifier = gate
		.descriptor
		.quirks
		.pkce_required
		.then(|| cookie::read_cookie(request.headers(), &cookie::verifier_cookie_name(provider)))
		.flatten();
	let mut flow = gate.flow(Some(code), callback.state);

	if let Err(err) = flow.authenticate(redirect_uri, pkce_verifier.as_deref()).await {
		return fail(gate, err);
	}

	let (Some(token), Some(user)) = (flow.token.take(), flow.user.take()) else {
		return fail(gate, ConfigError::MissingFlowInput { field: "token" }.into());
	};

	vars::publish(
		request.extensions_mut(),
		token,
		flow.refresh_token.take(),
		user,
		flow.granted_scopes.take().unwrap_or_default(),
	);
	obs::record_flow_outcome(FlowKind::AuthorizationCode, FlowOutcome::Success);

	next.run(request).await
}

/// Query parameters the provider appends to the callback.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct CallbackQuery {
	code: Option<String>,
	state: Option<String>,
	error: Option<String>,
	error_description: Option<String>,
}
impl CallbackQuery {
	fn parse(uri: &Uri) -> Self {
		let mut query = Self::default();

		for (key, value) in form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes()) {
			let slot = match key.as_ref() {
				"code" => &mut query.code,
				"state" => &mut query.state,
				"error" => &mut query.error,
				"error_description" => &mut query.error_description,
				_ => continue,
			};

			if slot.is_none() && !value.is_empty() {
				*slot = Some(value.into_owned());
			}
		}

		query
	}
}

/// Checks the callback `state` against the expected value.
///
/// A received state that differs from the expected one is always rejected. When `required`
/// is set, a callback is also rejected if either side is missing.
fn verify_state(expected: Option<&str>, received: Option<&str>, required: bool) -> Result<()> {
	match (expected, received) {
		(Some(expected), Some(received)) if expected == received => Ok(()),
		(Some(_), Some(_)) => Err(Error::StateMismatch),
		_ if required => Err(Error::StateMismatch),
		_ => Ok(()),
	}
}

/// Configured redirect URI, or `{scheme}://{host}{path}` of the current request.
fn resolve_redirect_uri<C, M>(
	gate: &OAuthGate<C, M>,
	uri: &Uri,
	headers: &HeaderMap,
) -> Result<Url>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	if let Some(redirect_uri) = &gate.redirect_uri {
		return Ok(redirect_uri.clone());
	}

	let scheme = headers
		.get(FORWARDED_PROTO)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.split(',').next())
		.map(str::trim)
		.filter(|value| !value.is_empty())
		.or_else(|| uri.scheme_str())
		.unwrap_or("https");
	let host = headers
		.get(HOST)
		.and_then(|value| value.to_str().ok())
		.or_else(|| uri.authority().map(|authority| authority.as_str()))
		.ok_or(ConfigError::UnresolvableRedirect)?;

	Url::parse(&format!("{scheme}://{host}{}", uri.path()))
		.map_err(|source| ConfigError::InvalidRedirect { source }.into())
}

fn redirect_response<C, M>(
	gate: &OAuthGate<C, M>,
	redirect: &AuthorizationRedirect,
) -> Result<Response>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let provider = &gate.descriptor.id;
	let mut response = StatusCode::FOUND.into_response();
	let headers = response.headers_mut();

	let location = HeaderValue::from_str(redirect.url.as_str()).map_err(ConfigError::from)?;

	headers.insert(LOCATION, location);

	if gate.state.is_none() {
		let value = cookie::set_cookie(
			&cookie::state_cookie_name(provider),
			&redirect.state,
			gate.cookie_secure,
		);

		headers.append(SET_COOKIE, HeaderValue::from_str(&value).map_err(ConfigError::from)?);
	}
	if let Some(verifier) = &redirect.pkce_verifier {
		let value = cookie::set_cookie(
			&cookie::verifier_cookie_name(provider),
			verifier,
			gate.cookie_secure,
		);

		headers.append(SET_COOKIE, HeaderValue::from_str(&value).map_err(ConfigError::from)?);
	}

	Ok(response)
}

/// Expires the state and verifier cookies; they are single-use whatever the callback outcome.
fn clear_redirect_cookies<C, M>(gate: &OAuthGate<C, M>, headers: &mut HeaderMap)
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let provider = &gate.descriptor.id;

	for name in [cookie::state_cookie_name(provider), cookie::verifier_cookie_name(provider)] {
		if let Ok(value) = HeaderValue::from_str(&cookie::clear_cookie(&name, gate.cookie_secure)) {
			headers.append(SET_COOKIE, value);
		}
	}
}

fn fail<C, M>(gate: &OAuthGate<C, M>, err: Error) -> Response
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	obs::record_failure(&gate.descriptor.id, &err);
	obs::record_flow_outcome(FlowKind::AuthorizationCode, FlowOutcome::Failure);

	err.into_response()
}

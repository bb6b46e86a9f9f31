//! Authorization redirect construction (the Unauthenticated step).

// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	flows::{AuthFlow, common},
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	provider::ProviderDescriptor,
};

/// RFC 7636 challenge method used for every PKCE redirect.
pub const PKCE_METHOD: &str = "S256";

/// Where to send the user, plus the values the callback must be checked against.
#[derive(Clone)]
pub struct AuthorizationRedirect {
	/// Fully-formed authorization URL.
	pub url: Url,
	/// Anti-forgery value embedded in `url`.
	pub state: String,
	/// PKCE verifier paired with the challenge in `url`, for descriptors that require PKCE.
	pub pkce_verifier: Option<String>,
}
impl Debug for AuthorizationRedirect {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationRedirect")
			.field("url", &self.url)
			.field("state", &self.state)
			.field("pkce_verifier_set", &self.pkce_verifier.is_some())
			.finish()
	}
}

impl<C, M> AuthFlow<'_, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the authorization redirect for this flow.
	///
	/// Uses the configured state when present and a fresh random one otherwise. A PKCE pair is
	/// generated when the descriptor requires it.
	pub fn redirect(&self, redirect_uri: &Url) -> AuthorizationRedirect {
		let gate = self.gate;
		let state = gate.state.clone().unwrap_or_else(common::random_state);
		let pkce_verifier = gate.descriptor.quirks.pkce_required.then(common::random_pkce_verifier);
		let challenge = pkce_verifier.as_deref().map(common::compute_pkce_challenge);
		let mut extra_params = gate.authorize_params.clone();

		gate.strategy.augment_authorize_request(&mut extra_params);

		let url = authorization_url(
			&gate.descriptor,
			&gate.client_id,
			redirect_uri,
			&self.scope,
			Some(&state),
			challenge.as_deref(),
			&extra_params,
		);

		AuthorizationRedirect { url, state, pkce_verifier }
	}
}

/// Builds the provider authorization URL.
///
/// Parameters are appended in a fixed order: `response_type`, `client_id`, `redirect_uri`,
/// `scope` (joined with the provider delimiter; skipped when empty or when the descriptor
/// disables it), `state`, `code_challenge` + `code_challenge_method`, then `extra_params`.
/// Values are form-encoded.
pub fn authorization_url(
	descriptor: &ProviderDescriptor,
	client_id: &str,
	redirect_uri: &Url,
	scope: &ScopeSet,
	state: Option<&str>,
	pkce_challenge: Option<&str>,
	extra_params: &[(String, String)],
) -> Url {
	let mut url = descriptor.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", client_id);
	pairs.append_pair("redirect_uri", redirect_uri.as_str());

	if descriptor.quirks.send_scope && !scope.is_empty() {
		pairs.append_pair("scope", &scope.join(descriptor.quirks.scope_delimiter));
	}
	if let Some(state) = state {
		pairs.append_pair("state", state);
	}
	if let Some(challenge) = pkce_challenge {
		pairs.append_pair("code_challenge", challenge);
		pairs.append_pair("code_challenge_method", PKCE_METHOD);
	}

	for (key, value) in extra_params {
		pairs.append_pair(key, value);
	}

	drop(pairs);

	url
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::ProviderId, provider::ProviderQuirks};

	fn descriptor(quirks: ProviderQuirks) -> ProviderDescriptor {
		ProviderDescriptor::builder(
			ProviderId::new("github").expect("Provider fixture should be valid."),
		)
		.authorization_endpoint(
			Url::parse("https://github.com/login/oauth/authorize")
				.expect("Authorization endpoint fixture should parse."),
		)
		.token_endpoint(
			Url::parse("https://github.com/login/oauth/access_token")
				.expect("Token endpoint fixture should parse."),
		)
		.userinfo_endpoint(
			Url::parse("https://api.github.com/user").expect("User-info fixture should parse."),
		)
		.quirks(quirks)
		.build()
		.expect("Descriptor fixture should build.")
	}

	fn pairs(url: &Url) -> Vec<(String, String)> {
		url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
	}

	#[test]
	fn scopes_and_state_follow_the_provider_delimiter() {
		let descriptor =
			descriptor(ProviderQuirks { scope_delimiter: ',', ..Default::default() });
		let redirect = Url::parse("https://app.example/login").expect("Redirect should parse.");
		let scope = ScopeSet::new(["a", "b"]).expect("Scope fixture should be valid.");
		let url =
			authorization_url(&descriptor, "client-123", &redirect, &scope, Some("s"), None, &[]);

		assert_eq!(
			pairs(&url),
			vec![
				("response_type".into(), "code".into()),
				("client_id".into(), "client-123".into()),
				("redirect_uri".into(), "https://app.example/login".into()),
				("scope".into(), "a,b".into()),
				("state".into(), "s".into()),
			]
		);
		assert!(url.as_str().contains("client_id=client-123"));
		assert!(url.as_str().contains("scope=a%2Cb&state=s"));
	}

	#[test]
	fn optional_parameters_are_skipped_or_appended() {
		let descriptor = descriptor(ProviderQuirks { send_scope: false, ..Default::default() });
		let redirect = Url::parse("https://app.example/cb").expect("Redirect should parse.");
		let scope = ScopeSet::new(["email"]).expect("Scope fixture should be valid.");
		let extra = vec![("prompt".to_string(), "consent".to_string())];
		let challenge = Some("challenge");
		let url = authorization_url(&descriptor, "id", &redirect, &scope, None, challenge, &extra);
		let pairs = pairs(&url);

		assert!(!pairs.iter().any(|(k, _)| k == "scope" || k == "state"));
		assert!(pairs.contains(&("code_challenge".into(), "challenge".into())));
		assert!(pairs.contains(&("code_challenge_method".into(), "S256".into())));
		assert_eq!(pairs.last(), Some(&("prompt".into(), "consent".into())));
	}
}

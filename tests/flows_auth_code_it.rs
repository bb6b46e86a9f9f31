#![cfg(all(feature = "reqwest", feature = "test"))]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_gate::{
	_preludet::*,
	auth::ProviderId,
	config::GateConfig,
	error::{ConfigError, Error},
	provider::{ClientAuthMethod, ProviderDescriptor, ProviderQuirks},
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";

fn build_descriptor(server: &MockServer, quirks: ProviderQuirks) -> ProviderDescriptor {
	let provider_id = ProviderId::new("mock-http")
		.expect("Provider identifier should be valid for auth code test.");

	ProviderDescriptor::builder(provider_id)
		.authorization_endpoint(
			Url::parse(&server.url("/authorize"))
				.expect("Mock authorization endpoint should parse successfully."),
		)
		.token_endpoint(
			Url::parse(&server.url("/token"))
				.expect("Mock token endpoint should parse successfully."),
		)
		.userinfo_endpoint(
			Url::parse(&server.url("/userinfo"))
				.expect("Mock user-info endpoint should parse successfully."),
		)
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.quirks(quirks)
		.build()
		.expect("Provider descriptor should build successfully.")
}

fn redirect_uri() -> Url {
	Url::parse("https://app.example.com/callback").expect("Redirect URI should parse successfully.")
}

#[tokio::test]
async fn redirect_then_authenticate_populates_the_flow() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server, ProviderQuirks::default());
	let gate = build_reqwest_test_gate(
		descriptor,
		GateConfig::new(CLIENT_ID, CLIENT_SECRET).with_scope(["openid", "profile"]),
	);
	let redirect = gate.flow(None, None).redirect(&redirect_uri());

	assert_eq!(redirect.state.len(), 32);
	assert!(redirect.pkce_verifier.is_none());

	let authorize_pairs: HashMap<_, _> = redirect.url.query_pairs().into_owned().collect();

	assert_eq!(authorize_pairs.get("client_id"), Some(&CLIENT_ID.into()));
	assert_eq!(authorize_pairs.get("scope"), Some(&"openid profile".into()));
	assert_eq!(authorize_pairs.get("state"), Some(&redirect.state));

	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "code-123")
				.form_urlencoded_tuple("redirect_uri", "https://app.example.com/callback")
				.form_urlencoded_tuple("client_id", CLIENT_ID)
				.form_urlencoded_tuple("client_secret", CLIENT_SECRET);
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-success\",\"refresh_token\":\"refresh-success\",\"token_type\":\"bearer\",\"expires_in\":3600,\"scope\":\"openid\"}",
			);
		})
		.await;
	let userinfo = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo").header("authorization", "Bearer access-success");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"sub\":\"user-1\",\"name\":\"Jane\"}");
		})
		.await;
	let mut flow = gate.flow(Some("code-123".into()), Some(redirect.state.clone()));

	flow.authenticate(&redirect_uri(), None).await.expect("Authentication should succeed.");

	let access = flow.token.as_ref().expect("Access token should be set.");

	assert_eq!(access.value.expose(), "access-success");
	assert_eq!(access.expires_in_seconds(), Some(3600));
	assert_eq!(
		flow.refresh_token.as_ref().map(|token| token.value.expose()),
		Some("refresh-success")
	);
	assert_eq!(
		flow.granted_scopes.as_ref().map(|scopes| scopes.iter().collect::<Vec<_>>()),
		Some(vec!["openid"])
	);

	let user = flow.user.as_ref().expect("User profile should be set.");

	assert_eq!(user.var_name(), "user-mock-http");
	assert_eq!(user.get_str("sub"), Some("user-1"));
	assert!(!format!("{flow:?}").contains("access-success"), "Debug output must redact tokens.");

	token.assert_async().await;
	userinfo.assert_async().await;
}

#[tokio::test]
async fn token_response_without_token_type_is_accepted() {
	let server = MockServer::start_async().await;
	let quirks = ProviderQuirks { granted_scope_delimiter: Some(','), ..Default::default() };
	let gate = build_reqwest_test_gate(
		build_descriptor(&server, quirks),
		GateConfig::new(CLIENT_ID, CLIENT_SECRET).with_scope(["openid", "profile", "email"]),
	);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"AQV-linkedin\",\"expires_in\":5183999,\"scope\":\"email,openid,profile\"}",
			);
		})
		.await;

	let mut flow = gate.flow(Some("li-code".into()), None);

	flow.exchange(&redirect_uri(), None).await.expect("Lenient token response should be accepted.");

	assert_eq!(flow.token.as_ref().map(|token| token.value.expose()), Some("AQV-linkedin"));
	assert_eq!(
		flow.granted_scopes.as_ref().map(|scopes| scopes.iter().collect::<Vec<_>>()),
		Some(vec!["email", "openid", "profile"])
	);
	assert!(flow.user.is_none(), "Exchange alone must not fetch the profile.");
}

#[tokio::test]
async fn exchange_without_code_is_a_local_error() {
	let server = MockServer::start_async().await;
	let gate = build_reqwest_test_gate(
		build_descriptor(&server, ProviderQuirks::default()),
		GateConfig::new(CLIENT_ID, CLIENT_SECRET),
	);
	let mut flow = gate.flow(None, None);
	let err = flow.exchange(&redirect_uri(), None).await.expect_err("Exchange requires a code.");

	assert!(matches!(err, Error::Config(ConfigError::MissingFlowInput { field: "code" })));
}

#[tokio::test]
async fn rejected_code_maps_to_invalid_grant() {
	let server = MockServer::start_async().await;
	let gate = build_reqwest_test_gate(
		build_descriptor(&server, ProviderQuirks::default()),
		GateConfig::new(CLIENT_ID, CLIENT_SECRET),
	);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body(
					"{\"error\":\"invalid_grant\",\"error_description\":\"Code was already redeemed.\"}",
				);
		})
		.await;
	let mut flow = gate.flow(Some("reused".into()), None);
	let err = flow
		.authenticate(&redirect_uri(), None)
		.await
		.expect_err("Reused code should fail the exchange.");

	match &err {
		Error::InvalidGrant { reason } => assert_eq!(reason, "Code was already redeemed."),
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(err.is_provider_error());
	assert!(flow.token.is_none());

	mock.assert_async().await;
}

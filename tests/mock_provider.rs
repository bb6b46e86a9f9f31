// std
use std::collections::BTreeMap;
// self
use oauth2_gate::{
	auth::ProviderId,
	provider::{
		ClientAuthMethod, DefaultProviderStrategy, GrantType, ProviderDescriptor,
		ProviderDescriptorBuilder, ProviderDescriptorError, ProviderErrorContext,
		ProviderErrorKind, ProviderQuirks, ProviderStrategy,
	},
	url::Url,
};

fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse mock provider URL.")
}

fn builder(id: &str) -> ProviderDescriptorBuilder {
	let provider_id =
		ProviderId::new(id).expect("Failed to build provider identifier for mock descriptor.");

	ProviderDescriptor::builder(provider_id)
}

fn complete(id: &str) -> ProviderDescriptorBuilder {
	builder(id)
		.authorization_endpoint(url("https://example.com/auth"))
		.token_endpoint(url("https://example.com/token"))
		.userinfo_endpoint(url("https://example.com/userinfo"))
}

#[test]
fn descriptor_rejects_insecure_and_missing_endpoints() {
	let err = builder("mock")
		.authorization_endpoint(url("http://example.com/auth"))
		.token_endpoint(url("https://example.com/token"))
		.userinfo_endpoint(url("https://example.com/userinfo"))
		.build()
		.expect_err("Descriptor builder should reject insecure authorization endpoints.");

	assert!(matches!(
		err,
		ProviderDescriptorError::InsecureEndpoint { endpoint: "authorization", .. }
	));

	let err = builder("mock")
		.authorization_endpoint(url("https://example.com/auth"))
		.token_endpoint(url("https://example.com/token"))
		.build()
		.expect_err("Descriptor builder should require a user-info endpoint.");

	assert_eq!(err, ProviderDescriptorError::MissingUserInfoEndpoint);
}

#[test]
fn descriptor_support_helpers_cover_flags() {
	let descriptor = complete("grants")
		.revocation_endpoint(url("https://example.com/revoke"))
		.support_grants([GrantType::AuthorizationCode, GrantType::RefreshToken])
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.expect("Descriptor builder should succeed for secure endpoints.");

	assert!(descriptor.supports(GrantType::AuthorizationCode));
	assert!(descriptor.supports(GrantType::RefreshToken));
	assert_eq!(descriptor.endpoints.userinfo.as_str(), "https://example.com/userinfo");
	assert_eq!(
		descriptor
			.endpoints
			.revocation
			.as_ref()
			.expect("Revocation endpoint should be populated when configured.")
			.as_str(),
		"https://example.com/revoke",
	);
	assert!(!descriptor.quirks.pkce_required);
	assert!(descriptor.quirks.verify_state);
	assert!(descriptor.quirks.send_scope);
	assert_eq!(descriptor.quirks.scope_delimiter, ' ');
	assert_eq!(descriptor.quirks.granted_delimiter(), ' ');
}

#[test]
fn public_clients_require_pkce() {
	let err = complete("public")
		.preferred_client_auth_method(ClientAuthMethod::NoneWithPkce)
		.build()
		.expect_err("Public clients without PKCE should be rejected.");

	assert_eq!(err, ProviderDescriptorError::PublicClientWithoutPkce);

	complete("public")
		.preferred_client_auth_method(ClientAuthMethod::NoneWithPkce)
		.quirks(ProviderQuirks { pkce_required: true, ..ProviderQuirks::default() })
		.build()
		.expect("Public clients with PKCE should be accepted.");
}

#[test]
fn control_characters_are_rejected_as_delimiters() {
	let err = complete("delimiter")
		.quirks(ProviderQuirks { granted_scope_delimiter: Some('\n'), ..ProviderQuirks::default() })
		.build()
		.expect_err("Control delimiters should be rejected.");

	assert_eq!(err, ProviderDescriptorError::InvalidScopeDelimiter { delimiter: '\n' });
}

#[test]
fn descriptor_deserializes_with_default_quirks() {
	let descriptor: ProviderDescriptor = serde_json::from_str(
		r#"{
			"id": "custom",
			"endpoints": {
				"authorization": "https://id.example.com/authorize",
				"token": "https://id.example.com/token",
				"userinfo": "https://id.example.com/me",
				"revocation": null
			},
			"supported_grants": { "authorization_code": true, "refresh_token": false },
			"preferred_client_auth_method": "client_secret_basic",
			"quirks": { "scope_delimiter": "," }
		}"#,
	)
	.expect("Descriptor should deserialize.");

	descriptor.validate().expect("Deserialized descriptor should validate.");

	assert_eq!(descriptor.preferred_client_auth_method, ClientAuthMethod::ClientSecretBasic);
	assert_eq!(descriptor.quirks.scope_delimiter, ',');
	assert!(descriptor.quirks.verify_state);
}

#[test]
fn default_strategy_prefers_oauth_error_fields() {
	let strategy = DefaultProviderStrategy;
	let ctx = ProviderErrorContext::new(GrantType::AuthorizationCode)
		.with_http_status(400)
		.with_oauth_error("invalid_grant");

	assert_eq!(strategy.classify_token_error(&ctx), ProviderErrorKind::InvalidGrant);

	let ctx = ProviderErrorContext::new(GrantType::AuthorizationCode)
		.with_http_status(401)
		.with_oauth_error("invalid_client");

	assert_eq!(strategy.classify_token_error(&ctx), ProviderErrorKind::InvalidClient);
}

#[test]
fn default_strategy_falls_back_to_description_and_status() {
	let strategy = DefaultProviderStrategy;
	let ctx = ProviderErrorContext::new(GrantType::AuthorizationCode).with_http_status(401);

	assert_eq!(strategy.classify_token_error(&ctx), ProviderErrorKind::InvalidClient);

	let described = ProviderErrorContext::new(GrantType::RefreshToken)
		.with_oauth_error("unknown")
		.with_error_description("Token is missing a grant: invalid_scope");

	assert_eq!(strategy.classify_token_error(&described), ProviderErrorKind::InsufficientScope);

	let unavailable = ProviderErrorContext::new(GrantType::RefreshToken).with_http_status(503);

	assert_eq!(strategy.classify_token_error(&unavailable), ProviderErrorKind::Transient);
}

#[test]
fn custom_strategy_can_augment_requests() {
	struct AudienceStrategy;
	impl ProviderStrategy for AudienceStrategy {
		fn classify_token_error(&self, _ctx: &ProviderErrorContext) -> ProviderErrorKind {
			ProviderErrorKind::InvalidGrant
		}

		fn augment_token_request(&self, grant: GrantType, form: &mut BTreeMap<String, String>) {
			form.insert("audience".into(), format!("for:{grant}"));
		}

		fn augment_authorize_request(&self, params: &mut Vec<(String, String)>) {
			params.push(("hd".into(), "example.com".into()));
		}
	}

	let strategy = AudienceStrategy;
	let mut form = BTreeMap::new();
	let mut params = Vec::new();

	strategy.augment_token_request(GrantType::AuthorizationCode, &mut form);
	strategy.augment_authorize_request(&mut params);

	assert_eq!(form.get("audience").map(String::as_str), Some("for:authorization_code"));
	assert_eq!(params, vec![("hd".to_string(), "example.com".to_string())]);
}

//! RFC 7009 token revocation for providers that expose a revocation endpoint.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::{
	basic::BasicErrorResponse,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
	},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::Token,
	error::{ConfigError, TransientError},
	flows::{OAuthGate, common},
	http::{self, ProviderHttpClient, ResponseMetadataSlot},
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ClientAuthMethod,
};

impl<C, M> OAuthGate<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Revokes `token` at the descriptor's revocation endpoint.
	///
	/// Fails with [`ConfigError::UnsupportedOperation`] when the descriptor declares none.
	pub async fn revoke_token(&self, token: &Token) -> Result<()> {
		const KIND: FlowKind = FlowKind::Revoke;

		let endpoint = self
			.descriptor
			.endpoints
			.revocation
			.as_ref()
			.ok_or_else(|| common::unsupported(&self.descriptor, "token revocation"))?;
		let span = FlowSpan::new(KIND, "revoke_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.revoke_inner(endpoint, token)).await;

		obs::record_result(KIND, &result);

		result
	}

	async fn revoke_inner(&self, endpoint: &Url, token: &Token) -> Result<()> {
		let mut form = form_urlencoded::Serializer::new(String::new());

		form.append_pair("token", token.value.expose());

		let mut builder = Request::builder()
			.method(Method::POST)
			.uri(endpoint.as_str())
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(ACCEPT, "application/json")
			.header(USER_AGENT, http::USER_AGENT);

		match (self.descriptor.preferred_client_auth_method, self.client_secret()) {
			(ClientAuthMethod::ClientSecretBasic, Some(secret)) => {
				builder = builder.header(AUTHORIZATION, basic_auth(&self.client_id, secret));
			},
			(_, secret) => {
				form.append_pair("client_id", &self.client_id);

				if let Some(secret) = secret.filter(|_| {
					self.descriptor.preferred_client_auth_method.requires_secret()
				}) {
					form.append_pair("client_secret", secret);
				}
			},
		}

		let request = builder.body(form.finish().into_bytes()).map_err(ConfigError::from)?;
		let slot = ResponseMetadataSlot::default();
		let response =
			http::dispatch(self.http_client.as_ref(), slot.clone(), request).await.map_err(|err| {
				self.transport_mapper.map_transport_error(
					FlowKind::Revoke,
					slot.take().as_ref(),
					err,
				)
			})?;
		let status = response.status();

		if status.is_success() {
			return Ok(());
		}
		if let Ok(payload) = serde_json::from_slice::<BasicErrorResponse>(response.body()) {
			let reason = payload
				.error_description()
				.cloned()
				.unwrap_or_else(|| payload.error().as_ref().to_owned());

			return Err(Error::Upstream { reason });
		}

		Err(TransientError::RevocationEndpoint { status: status.as_u16() }.into())
	}
}

/// `Authorization: Basic` value with RFC 6749 section 2.3.1 form-encoding of the credentials.
fn basic_auth(client_id: &str, client_secret: &str) -> String {
	let id: String = form_urlencoded::byte_serialize(client_id.as_bytes()).collect();
	let secret: String = form_urlencoded::byte_serialize(client_secret.as_bytes()).collect();

	format!("Basic {}", STANDARD.encode(format!("{id}:{secret}")))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn basic_auth_form_encodes_credentials() {
		assert_eq!(basic_auth("client", "secret"), "Basic Y2xpZW50OnNlY3JldA==");
		// `a b` and `p:w` are encoded to `a+b` and `p%3Aw` before base64.
		assert_eq!(basic_auth("a b", "p:w"), format!("Basic {}", STANDARD.encode("a+b:p%3Aw")));
	}
}

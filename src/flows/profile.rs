//! User-info fetch with the freshly issued bearer token.

// crates.io
use oauth2::http::{
	Method, Request, StatusCode,
	header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{Token, UserProfile},
	error::{ConfigError, TransientError},
	flows::{AuthFlow, OAuthGate},
	http::{self, ProviderHttpClient, ResponseMetadataSlot},
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderStrategy,
};

impl<C, M> OAuthGate<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the authenticated user's profile with a single GET to the user-info endpoint.
	pub async fn fetch_user(&self, token: &Token) -> Result<UserProfile> {
		const KIND: FlowKind = FlowKind::Profile;

		let span = FlowSpan::new(KIND, "fetch_user");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.fetch_user_inner(token)).await;

		obs::record_result(KIND, &result);

		result
	}

	async fn fetch_user_inner(&self, token: &Token) -> Result<UserProfile> {
		let request = Request::builder()
			.method(Method::GET)
			.uri(self.descriptor.endpoints.userinfo.as_str())
			.header(AUTHORIZATION, format!("Bearer {}", token.value.expose()))
			.header(ACCEPT, "application/json")
			.header(USER_AGENT, http::USER_AGENT)
			.body(Vec::new())
			.map_err(ConfigError::from)?;
		let slot = ResponseMetadataSlot::default();
		let response =
			http::dispatch(self.http_client.as_ref(), slot.clone(), request).await.map_err(|err| {
				self.transport_mapper.map_transport_error(
					FlowKind::Profile,
					slot.take().as_ref(),
					err,
				)
			})?;
		let status = response.status();

		if !status.is_success() {
			return Err(Error::Profile {
				status: Some(status.as_u16()),
				message: profile_error_message(self.strategy.as_ref(), status, response.body()),
			});
		}

		let mut deserializer = serde_json::Deserializer::from_slice(response.body());
		let fields: Map<String, Value> = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| TransientError::ProfileResponseParse {
				source,
				status: Some(status.as_u16()),
			})?;

		Ok(UserProfile::new(self.descriptor.id.clone(), fields))
	}
}

impl<C, M> AuthFlow<'_, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the user profile for the exchanged access token and stores it in `user`.
	pub async fn fetch_profile(&mut self) -> Result<()> {
		let token = self.token.as_ref().ok_or(ConfigError::MissingFlowInput { field: "token" })?;
		let user = self.gate.fetch_user(token).await?;

		self.user = Some(user);

		Ok(())
	}
}

fn profile_error_message(
	strategy: &dyn ProviderStrategy,
	status: StatusCode,
	body: &[u8],
) -> String {
	if let Some(message) = serde_json::from_slice::<Value>(body)
		.ok()
		.and_then(|payload| strategy.profile_error_message(&payload))
	{
		return message;
	}

	status.canonical_reason().unwrap_or("User-info request failed").to_owned()
}

//! Code-for-token exchange (Exchanging step).

// self
use crate::{
	_prelude::*,
	auth::TokenGrant,
	error::ConfigError,
	flows::AuthFlow,
	http::ProviderHttpClient,
	oauth::{CodeExchange, OAuth2Facade, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C, M> AuthFlow<'_, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the received code for tokens with a single token-endpoint call.
	///
	/// `redirect_uri` must equal the one used on the authorization redirect. `pkce_verifier` is
	/// the verifier paired with that redirect's challenge, if any. Populates `token`,
	/// `refresh_token`, and `granted_scopes`.
	pub async fn exchange(
		&mut self,
		redirect_uri: &Url,
		pkce_verifier: Option<&str>,
	) -> Result<()> {
		const KIND: FlowKind = FlowKind::TokenExchange;

		let code = self
			.code
			.as_deref()
			.ok_or(ConfigError::MissingFlowInput { field: "code" })?;
		let gate = self.gate;
		let span = FlowSpan::new(KIND, "exchange");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(gate.facade().exchange_authorization_code(
				gate.strategy.as_ref(),
				CodeExchange {
					code,
					pkce_verifier,
					redirect_uri,
					requested_scope: &self.scope,
				},
			))
			.await;

		obs::record_result(KIND, &result);

		let TokenGrant { token, refresh_token, granted_scopes } = result?;

		self.token = Some(token);
		self.refresh_token = refresh_token;
		self.granted_scopes = Some(granted_scopes);

		Ok(())
	}
}

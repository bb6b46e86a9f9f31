//! Refresh token grant without any token storage.
//!
//! The gate never persists tokens; callers that kept the `refresh-token` variable hand it back
//! here to obtain a new access token. Providers that do not rotate refresh tokens get the
//! original one carried over into the returned grant.

// self
use crate::{
	_prelude::*,
	auth::{Token, TokenGrant},
	error::ConfigError,
	flows::OAuthGate,
	http::ProviderHttpClient,
	oauth::{OAuth2Facade, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::GrantType,
};

impl<C, M> OAuthGate<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges `refresh_token` for a new access token with one `grant_type=refresh_token` call.
	pub async fn refresh_token(&self, refresh_token: &Token) -> Result<TokenGrant> {
		const KIND: FlowKind = FlowKind::Refresh;

		self.ensure_refresh_supported()?;

		let span = FlowSpan::new(KIND, "refresh_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(self.facade().refresh_token(
				self.strategy.as_ref(),
				refresh_token.value.expose(),
				&self.scope,
			))
			.await
			.map(|mut grant| {
				if grant.refresh_token.is_none() {
					grant.refresh_token = Some(refresh_token.clone());
				}

				grant
			});

		obs::record_result(KIND, &result);

		result
	}

	fn ensure_refresh_supported(&self) -> Result<()> {
		if self.descriptor.supports(GrantType::RefreshToken) {
			Ok(())
		} else {
			Err(ConfigError::UnsupportedGrant {
				descriptor: self.descriptor.id.to_string(),
				grant: "refresh_token",
			}
			.into())
		}
	}
}

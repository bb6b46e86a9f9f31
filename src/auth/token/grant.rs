//! Immutable token values and the bundle returned by a successful grant.

// self
use crate::{
	_prelude::*,
	auth::{GrantedScopes, token::secret::TokenSecret},
};

/// An access or refresh token together with its advertised lifetime.
///
/// Tokens are immutable once constructed. `expires_in` mirrors the provider's relative
/// lifetime; providers such as GitHub OAuth Apps issue non-expiring tokens and omit it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Token secret; callers must avoid logging it.
	pub value: TokenSecret,
	/// Relative lifetime reported by the provider.
	pub expires_in: Option<Duration>,
	/// Instant the gate received the token.
	pub issued_at: OffsetDateTime,
}
impl Token {
	/// Creates a token issued now.
	pub fn new(value: impl Into<String>, expires_in: Option<Duration>) -> Self {
		Self::issued_at(value, expires_in, OffsetDateTime::now_utc())
	}

	/// Creates a token with an explicit issue instant.
	pub fn issued_at(
		value: impl Into<String>,
		expires_in: Option<Duration>,
		issued_at: OffsetDateTime,
	) -> Self {
		Self { value: TokenSecret::new(value), expires_in, issued_at }
	}

	/// Lifetime in whole seconds, when the provider reported one.
	pub fn expires_in_seconds(&self) -> Option<i64> {
		self.expires_in.map(|lifetime| lifetime.whole_seconds())
	}

	/// Absolute expiry instant, when the provider reported a lifetime.
	///
	/// Lifetimes that land outside the representable calendar yield `None`.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_in.and_then(|lifetime| self.issued_at.checked_add(lifetime))
	}

	/// Returns `true` once the token's lifetime has elapsed at `instant`.
	///
	/// Tokens without a reported lifetime never expire locally.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at().is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns `true` if the token has expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}

/// Output of a successful code exchange or refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
	/// Access token used for bearer calls.
	pub token: Token,
	/// Refresh token, if the provider issued one.
	pub refresh_token: Option<Token>,
	/// Scopes the provider reports as granted.
	pub granted_scopes: GrantedScopes,
}

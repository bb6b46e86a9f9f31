//! Typed request variables published by the middleware.
//!
//! After a successful callback the middleware stores its results in the request's
//! [`Extensions`]. Handlers read them through [`OAuthVars`] (on [`Extensions`], [`Request`], or
//! [`Parts`]) or extract everything at once with [`OAuthSession`]. Each value also answers to
//! its variable name via [`OAuthVars::var`]: `token`, `refresh-token`, `user-<provider>`, and
//! `granted-scopes`.

// crates.io
use axum::{
	extract::FromRequestParts,
	http::{Extensions, Request, request::Parts},
};
// self
use crate::{
	_prelude::*,
	auth::{GrantedScopes, Token, UserProfile},
};

/// Variable name of the access token.
pub const TOKEN_VAR: &str = "token";
/// Variable name of the refresh token.
pub const REFRESH_TOKEN_VAR: &str = "refresh-token";
/// Variable name of the granted scopes.
pub const GRANTED_SCOPES_VAR: &str = "granted-scopes";
/// Prefix of the per-provider user variable.
pub const USER_VAR_PREFIX: &str = "user-";

/// Access token issued during the callback (`token`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessToken(pub Token);

/// Refresh token issued during the callback (`refresh-token`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshToken(pub Token);

/// A variable looked up by name.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Var<'a> {
	/// `token`
	Token(&'a Token),
	/// `refresh-token`
	RefreshToken(&'a Token),
	/// `user-<provider>`
	User(&'a UserProfile),
	/// `granted-scopes`
	GrantedScopes(&'a GrantedScopes),
}

/// Read access to the variables the middleware stores on a request.
pub trait OAuthVars {
	/// Extensions backing the variables.
	fn vars(&self) -> &Extensions;

	/// `token`
	fn token(&self) -> Option<&Token> {
		self.vars().get::<AccessToken>().map(|token| &token.0)
	}

	/// `refresh-token`
	fn refresh_token(&self) -> Option<&Token> {
		self.vars().get::<RefreshToken>().map(|token| &token.0)
	}

	/// `user-<provider>`
	fn user(&self) -> Option<&UserProfile> {
		self.vars().get::<UserProfile>()
	}

	/// `granted-scopes`
	fn granted_scopes(&self) -> Option<&GrantedScopes> {
		self.vars().get::<GrantedScopes>()
	}

	/// Looks a variable up by its name.
	fn var(&self, name: &str) -> Option<Var<'_>> {
		match name {
			TOKEN_VAR => self.token().map(Var::Token),
			REFRESH_TOKEN_VAR => self.refresh_token().map(Var::RefreshToken),
			GRANTED_SCOPES_VAR => self.granted_scopes().map(Var::GrantedScopes),
			_ => {
				let provider = name.strip_prefix(USER_VAR_PREFIX)?;

				self.user().filter(|user| user.provider.as_ref() == provider).map(Var::User)
			},
		}
	}
}
impl OAuthVars for Extensions {
	fn vars(&self) -> &Extensions {
		self
	}
}
impl<B> OAuthVars for Request<B> {
	fn vars(&self) -> &Extensions {
		self.extensions()
	}
}
impl OAuthVars for Parts {
	fn vars(&self) -> &Extensions {
		&self.extensions
	}
}

/// Stores the variables on `extensions`.
pub(crate) fn publish(
	extensions: &mut Extensions,
	token: Token,
	refresh_token: Option<Token>,
	user: UserProfile,
	granted_scopes: GrantedScopes,
) {
	extensions.insert(AccessToken(token));

	if let Some(refresh_token) = refresh_token {
		extensions.insert(RefreshToken(refresh_token));
	}

	extensions.insert(user);
	extensions.insert(granted_scopes);
}

/// Everything the middleware learned about the signed-in user.
///
/// Extracting it from a request the middleware did not authenticate is rejected with
/// `401 Unauthorized`.
#[derive(Clone, Debug, PartialEq)]
pub struct OAuthSession {
	/// Access token.
	pub token: Token,
	/// Refresh token, when issued.
	pub refresh_token: Option<Token>,
	/// User profile.
	pub user: UserProfile,
	/// Scopes the provider granted.
	pub granted_scopes: GrantedScopes,
}
impl OAuthSession {
	/// Collects the session from stored variables.
	pub fn from_vars(vars: &impl OAuthVars) -> Option<Self> {
		Some(Self {
			token: vars.token()?.clone(),
			refresh_token: vars.refresh_token().cloned(),
			user: vars.user()?.clone(),
			granted_scopes: vars.granted_scopes().cloned().unwrap_or_default(),
		})
	}
}
impl<S> FromRequestParts<S> for OAuthSession
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Self::from_vars(&*parts).ok_or(Error::Unauthenticated)
	}
}

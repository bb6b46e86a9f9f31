//! Serves `/login` behind the GitHub gate and greets the signed-in user.
//!
//! Set `GITHUB_ID` and `GITHUB_SECRET` (and optionally `GITHUB_REDIRECT_URI`), register
//! `http://localhost:3000/login` as the OAuth App callback, then open that URL.

// std
use std::sync::Arc;
// crates.io
use axum::{Router, routing::get};
use color_eyre::Result;
// self
use oauth2_gate::{
	config::GateConfig,
	flows::OAuthGate,
	middleware::{self, OAuthSession},
	providers::{self, GitHubAppKind, GitHubUser},
};

async fn profile(session: OAuthSession) -> String {
	match session.user.parse::<GitHubUser>() {
		Ok(user) => format!(
			"Hello, {} (scopes: {}).",
			user.name.unwrap_or(user.login),
			session.granted_scopes.iter().collect::<Vec<_>>().join(", ")
		),
		Err(e) => format!("Signed in, but the profile could not be decoded at `{}`.", e.path()),
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	// Plain HTTP on localhost: the derived callback would default to `https`, and the cookies
	// cannot be `Secure`.
	let mut config = GateConfig::from_env("GITHUB")?.with_cookie_secure(false);

	if config.redirect_uri.is_none() {
		config = config.with_redirect_uri("http://localhost:3000/login".parse()?);
	}

	let preset = providers::github(GitHubAppKind::OAuthApp)?;
	let gate = Arc::new(OAuthGate::from_preset(preset, config)?);
	let app = Router::new()
		.route("/login", get(profile))
		.layer(axum::middleware::from_fn_with_state(gate, middleware::authenticate));
	let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;

	println!("Open http://localhost:3000/login to sign in with GitHub.");

	axum::serve(listener, app).await?;

	Ok(())
}

//! Drop-in OAuth 2.0 authorization-code middleware for axum. Bundled presets cover GitHub,
//! Google, and LinkedIn; results reach handlers as typed request extensions.
//!
//! Build an [`OAuthGate`](flows::OAuthGate) once at startup, share it behind an [`Arc`], and
//! mount [`middleware::authenticate`] on the routes that require a signed-in user:
//!
//! ```ignore
//! let preset = providers::github(GitHubAppKind::OAuthApp)?;
//! let gate = Arc::new(OAuthGate::from_preset(preset, config)?);
//! let app = Router::new()
//! 	.route("/login", get(profile))
//! 	.layer(axum::middleware::from_fn_with_state(gate, middleware::authenticate));
//! ```

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod middleware;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod providers;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::GateConfig,
		flows::OAuthGate,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{DefaultProviderStrategy, ProviderDescriptor, ProviderStrategy},
	};

	/// Gate type alias used by reqwest-backed integration tests.
	pub type ReqwestTestGate = OAuthGate<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`OAuthGate`] backed by the default provider strategy and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_gate(
		descriptor: ProviderDescriptor,
		config: GateConfig,
	) -> Arc<ReqwestTestGate> {
		let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);

		build_reqwest_test_gate_with_strategy(descriptor, strategy, config)
	}

	/// Same as [`build_reqwest_test_gate`] but with a caller-supplied provider strategy.
	pub fn build_reqwest_test_gate_with_strategy(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		config: GateConfig,
	) -> Arc<ReqwestTestGate> {
		let http_client = test_reqwest_http_client();
		let mapper = Arc::new(ReqwestTransportErrorMapper);
		let gate = OAuthGate::with_http_client(descriptor, strategy, config, http_client, mapper)
			.expect("Test gate configuration should be valid.");

		Arc::new(gate)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use axum;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _, tower as _};

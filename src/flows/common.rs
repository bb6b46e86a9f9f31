//! Shared helpers for flow implementations (random values, PKCE, guards).

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, error::ConfigError, provider::ProviderDescriptor};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Generates an opaque anti-forgery `state` value.
pub(crate) fn random_state() -> String {
	random_string(STATE_LEN)
}

/// Generates a PKCE verifier within the RFC 7636 43..=128 character window.
pub(crate) fn random_pkce_verifier() -> String {
	random_string(PKCE_VERIFIER_LEN)
}

/// Derives the `S256` code challenge for `verifier`.
pub(crate) fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Fails with [`ConfigError::UnsupportedOperation`] when the descriptor lacks an endpoint.
pub(crate) fn unsupported(descriptor: &ProviderDescriptor, operation: &'static str) -> Error {
	ConfigError::UnsupportedOperation { descriptor: descriptor.id.to_string(), operation }.into()
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

//! Bundled provider presets.
//!
//! A [`ProviderPreset`] pairs a validated [`ProviderDescriptor`] with the strategy that knows the
//! provider's error dialect and the scopes requested when the configuration names none. Pass it
//! to [`OAuthGate::from_preset`](crate::flows::OAuthGate::from_preset).

pub mod github;
pub mod google;
pub mod linkedin;

pub use github::{GitHubAppKind, GitHubStrategy, GitHubUser, github};
pub use google::{GoogleOptions, GoogleStrategy, GoogleUser, google, google_with};
pub use linkedin::{LinkedInLocale, LinkedInUser, linkedin};

// self
use crate::{
	_prelude::*,
	config::GateConfig,
	error::ConfigError,
	provider::{DefaultProviderStrategy, ProviderDescriptor, ProviderStrategy},
};

/// Descriptor, strategy, and default scopes for one provider.
#[derive(Clone)]
pub struct ProviderPreset {
	/// Validated provider descriptor.
	pub descriptor: ProviderDescriptor,
	/// Provider-specific strategy.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// Scopes requested when the configuration leaves `scope` empty.
	pub default_scope: Vec<String>,
}
impl ProviderPreset {
	/// Wraps a descriptor with the default strategy and no default scopes.
	pub fn custom(descriptor: ProviderDescriptor) -> Self {
		Self { descriptor, strategy: Arc::new(DefaultProviderStrategy), default_scope: Vec::new() }
	}

	/// Replaces the strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Replaces the default scopes.
	pub fn with_default_scope<I, S>(mut self, scope: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.default_scope = scope.into_iter().map(Into::into).collect();

		self
	}

	/// Splits the preset into gate inputs, filling an empty `config.scope` with the defaults.
	pub fn apply(
		self,
		mut config: GateConfig,
	) -> (ProviderDescriptor, Arc<dyn ProviderStrategy>, GateConfig) {
		if config.scope.is_empty() {
			config.scope = self.default_scope;
		}

		(self.descriptor, self.strategy, config)
	}
}
impl Debug for ProviderPreset {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderPreset")
			.field("descriptor", &self.descriptor)
			.field("default_scope", &self.default_scope)
			.finish()
	}
}

fn endpoint(raw: &str) -> Result<Url> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidDescriptor { source }.into())
}

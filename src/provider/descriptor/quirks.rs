// self
use crate::_prelude::*;

/// Provider-specific quirks that influence how flows behave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Indicates whether PKCE must be supplied even for confidential clients.
	pub pkce_required: bool,
	/// Rejects callbacks whose `state` cannot be matched against an expected value.
	///
	/// When disabled, a callback without any `state` is accepted, but a `state` that is
	/// present and wrong is still rejected.
	pub verify_state: bool,
	/// Indicates whether the `scope` parameter is sent on the authorization redirect.
	///
	/// GitHub Apps derive permissions from the app installation and ignore it.
	pub send_scope: bool,
	/// Character used to join requested scopes (and split granted scopes unless overridden).
	pub scope_delimiter: char,
	/// Character the token endpoint uses in its `scope` field when it differs from
	/// `scope_delimiter` (LinkedIn requests with spaces but answers with commas).
	pub granted_scope_delimiter: Option<char>,
}
impl ProviderQuirks {
	/// Delimiter used to split the token endpoint's `scope` field.
	pub fn granted_delimiter(&self) -> char {
		self.granted_scope_delimiter.unwrap_or(self.scope_delimiter)
	}
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			pkce_required: false,
			verify_state: true,
			send_scope: true,
			scope_delimiter: ' ',
			granted_scope_delimiter: None,
		}
	}
}

//! Opaque user profiles returned by provider user-info endpoints.

// crates.io
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::ProviderId};

/// Provider-specific key-value record describing the authenticated user.
///
/// Downstream handlers read it from the `user-<provider>` variable and either inspect the raw
/// fields or decode them into a typed struct via [`UserProfile::parse`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Provider that produced the profile.
	pub provider: ProviderId,
	/// Raw JSON object returned by the user-info endpoint.
	pub fields: Map<String, Value>,
}
impl UserProfile {
	/// Wraps a user-info payload.
	pub fn new(provider: ProviderId, fields: Map<String, Value>) -> Self {
		Self { provider, fields }
	}

	/// Name under which the profile is exposed to downstream handlers.
	pub fn var_name(&self) -> String {
		format!("user-{}", self.provider)
	}

	/// Returns a raw field.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.fields.get(key)
	}

	/// Returns a string field.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.fields.get(key).and_then(Value::as_str)
	}

	/// Decodes the profile into a typed struct, reporting the failing JSON path on error.
	pub fn parse<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		let value = Value::Object(self.fields.clone());

		serde_path_to_error::deserialize(value)
	}
}

//! Gate-level error types shared across flows, providers, and the middleware.
//!
//! Every variant knows the HTTP status it surfaces as once it reaches the middleware:
//! anti-forgery and consent failures answer `401`, provider-reported errors answer `500` with
//! the provider's own message as the body, and everything else (malformed upstream payloads,
//! network failures, local misconfiguration) answers a generic `500`.

// crates.io
use axum::http::{StatusCode, header::InvalidHeaderValue};
// self
use crate::_prelude::*;

/// Gate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gate error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Upstream answered with something the gate could not interpret.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Returned `state` does not match the expected anti-forgery value.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// The user (or provider) declined the authorization request.
	#[error("Provider denied the authorization request: {reason}.")]
	AccessDenied {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Downstream code asked for OAuth variables on a request the gate never authenticated.
	#[error("Request has not been authenticated.")]
	Unauthenticated,
	/// Requested scopes exceed what the client may obtain.
	#[error("Token lacks the required scopes: {reason}.")]
	InsufficientScope {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Provider rejected the grant (e.g., bad or reused code).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Provider reported an error the strategy considers temporary or unclassified.
	#[error("Provider reported an error: {reason}.")]
	Upstream {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// User-info endpoint answered with an error payload.
	#[error("User-info endpoint returned an error: {message}.")]
	Profile {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Provider-supplied message.
		message: String,
	},
}
impl Error {
	/// HTTP status the middleware responds with for this error.
	pub fn status_code(&self) -> StatusCode {
		match self {
			Self::StateMismatch | Self::AccessDenied { .. } | Self::Unauthenticated =>
				StatusCode::UNAUTHORIZED,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Message that may be echoed back to the client.
	///
	/// Provider-reported failures pass the provider's text through verbatim. Everything else
	/// stays opaque so transport or configuration details never reach end users.
	pub fn public_message(&self) -> &str {
		match self {
			Self::AccessDenied { reason }
			| Self::InsufficientScope { reason }
			| Self::InvalidGrant { reason }
			| Self::InvalidClient { reason }
			| Self::Upstream { reason } => reason,
			Self::Profile { message, .. } => message,
			Self::StateMismatch | Self::Unauthenticated => "Unauthorized",
			_ => "Internal Server Error",
		}
	}

	/// Returns true when the provider itself reported the failure.
	pub fn is_provider_error(&self) -> bool {
		matches!(
			self,
			Self::InsufficientScope { .. }
				| Self::InvalidGrant { .. }
				| Self::InvalidClient { .. }
				| Self::Upstream { .. }
				| Self::Profile { .. }
		)
	}
}

/// Configuration and validation failures raised by the gate.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A computed header value is not representable.
	#[error(transparent)]
	InvalidHeader(#[from] InvalidHeaderValue),
	/// Provider descriptor contains an invalid URL.
	#[error("Descriptor contains an invalid URL.")]
	InvalidDescriptor {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Provider identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Redirect URI was not configured and the request carries no usable host.
	#[error("Redirect URI cannot be derived from the request.")]
	UnresolvableRedirect,

	/// No client identifier was configured.
	#[error("Client ID is required for the `{descriptor}` provider.")]
	MissingClientId {
		/// Provider identifier string.
		descriptor: String,
	},
	/// No client secret was configured for a confidential client.
	#[error("Client secret is required for the `{descriptor}` provider.")]
	MissingClientSecret {
		/// Provider identifier string.
		descriptor: String,
	},
	/// A flow step was invoked before its input was available.
	#[error("Flow step requires `{field}`, which is not set.")]
	MissingFlowInput {
		/// Missing field name.
		field: &'static str,
	},
	/// Configured anti-forgery state is empty.
	#[error("Configured state must not be empty.")]
	EmptyState,
	/// Descriptor does not enable the requested grant.
	#[error("Descriptor `{descriptor}` does not enable the {grant} grant.")]
	UnsupportedGrant {
		/// Provider identifier string.
		descriptor: String,
		/// Disabled grant label.
		grant: &'static str,
	},
	/// Descriptor does not declare the endpoint an operation needs.
	#[error("Descriptor `{descriptor}` does not support {operation}.")]
	UnsupportedOperation {
		/// Provider identifier string.
		descriptor: String,
		/// Operation label.
		operation: &'static str,
	},
	/// Request scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Upstream responses the gate could not act on.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider endpoint answered in a way the gate could not act on (timeouts included).
	#[error("The {endpoint} endpoint returned an unexpected response: {message}.")]
	Endpoint {
		/// Endpoint label (`token`, `userinfo`, `revocation`).
		endpoint: &'static str,
		/// Gate-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// User-info endpoint responded with a body that is not a JSON object.
	#[error("User-info endpoint returned malformed JSON.")]
	ProfileResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Revocation endpoint refused the request without an OAuth error payload.
	#[error("Revocation endpoint returned HTTP {status}.")]
	RevocationEndpoint {
		/// HTTP status code.
		status: u16,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn provider_errors_pass_their_message_through() {
		let err = Error::InvalidGrant { reason: "invalid_grant".into() };

		assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(err.public_message(), "invalid_grant");
		assert!(err.is_provider_error());

		let err = Error::Profile { status: Some(401), message: "Bad credentials".into() };

		assert_eq!(err.public_message(), "Bad credentials");
	}

	#[test]
	fn anti_forgery_failures_are_unauthorized() {
		assert_eq!(Error::StateMismatch.status_code(), StatusCode::UNAUTHORIZED);
		assert_eq!(
			Error::AccessDenied { reason: "access_denied".into() }.status_code(),
			StatusCode::UNAUTHORIZED
		);
		assert!(!Error::StateMismatch.is_provider_error());
	}

	#[test]
	fn local_failures_stay_opaque() {
		let err: Error = ConfigError::UnresolvableRedirect.into();

		assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(err.public_message(), "Internal Server Error");

		let err: Error =
			TransportError::Io(std::io::Error::other("connection reset by peer")).into();

		assert_eq!(err.public_message(), "Internal Server Error");
	}
}

//! HTTP rendering of gate errors.

// crates.io
use axum::response::{IntoResponse, Response};
// self
use crate::_prelude::*;

impl IntoResponse for Error {
	/// Renders the error as a plain-text body with [`Error::status_code`].
	///
	/// The body is [`Error::public_message`]: the provider's own text for provider errors and a
	/// generic phrase for everything else.
	fn into_response(self) -> Response {
		(self.status_code(), self.public_message().to_owned()).into_response()
	}
}

//! Token values produced by the token exchanger and refresh helper.

pub mod grant;
pub mod secret;

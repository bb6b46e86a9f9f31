//! Auth-domain identifiers, scope sets, tokens, and user profiles.

pub mod id;
pub mod profile;
pub mod scope;
pub mod token;

pub use id::*;
pub use profile::*;
pub use scope::*;
pub use token::{grant::*, secret::*};

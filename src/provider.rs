//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering HTTPS-only
//! endpoints (authorization, token, user-info, optional revocation), supported grant flags,
//! client authentication preferences, and provider quirks (PKCE requirement, anti-forgery
//! state verification, scope delimiter). `strategy` defines [`ProviderStrategy`], an
//! HTTP-client-agnostic hook used by flows to decorate outgoing requests and map provider
//! error payloads into the gate error taxonomy.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;

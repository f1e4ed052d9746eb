//! Credential checking and per-connection session authorization for the relay.
//!
//! Nothing in this crate knows about HTTP. The `web` crate extracts the raw
//! credentials from a request, hands them to this layer, and translates the
//! resulting `error::Error` into a status code.

pub mod api_key;
pub mod error;
pub mod jwt;
pub mod session;

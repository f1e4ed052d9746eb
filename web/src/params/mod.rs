//! This module holds typed parameters for the relay's endpoint inputs.
//!
//! Each parameter type is deserialized straight from the request (query string or JSON
//! body) and converted into the type the lower layers work with, so handlers never pass
//! raw request data down.

pub(crate) mod publish;
pub(crate) mod stream;

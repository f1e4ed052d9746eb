//! SSE HTTP handler for the web layer.
//!
//! This module contains only the Axum handler for the stream endpoint.
//! The broadcast transport (Manager, ConnectionRegistry, Message types)
//! lives in the `sse` crate and session authorization in `domain`.

pub(crate) mod handler;

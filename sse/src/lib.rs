//! Server-Sent Events (SSE) broadcast transport for the relay.
//!
//! Holds the live stream connections, routes each published message to the
//! connections subscribed to its topic, and optionally keeps a short journal of
//! recent messages so reconnecting consumers can resume with `Last-Event-ID`.
//!
//! # Architecture
//!
//! - **Topic-indexed registry**: connections are stored by `ConnectionId` with a
//!   secondary `topic -> connections` index, both DashMaps, so registration and
//!   routing don't contend on one lock.
//! - **Default topic**: every connection is also subscribed to `DEFAULT_TOPIC`,
//!   which receives messages published with an empty event name.
//! - **Ephemeral delivery**: messages go only to connections open at publish
//!   time. Nothing is persisted beyond the bounded in-memory journal.
//! - **Ordered ids**: publishes are serialized by the `Manager`, so ids increase
//!   and every connection receives its messages in id order.
//!
//! # Message Flow
//!
//! 1. A consumer opens the stream endpoint and is authorized by the web layer
//! 2. The handler calls `Manager::subscribe` with the consumer's topics and
//!    keeps the returned `ConnectionGuard` inside the response stream
//! 3. A producer posts a `Message`; the handler calls `Manager::publish`
//! 4. The manager assigns an id, journals the message, and queues one frame on
//!    every connection subscribed to `message.topic()`
//! 5. When the consumer disconnects the stream is dropped, and with it the
//!    guard, which unregisters the connection from every topic
//!
//! # Example: Publishing a message
//!
//! ```rust,ignore
//! use sse::message::Message;
//!
//! app_state.sse_manager.publish(Message::new("Test message", "test"))?;
//! ```
//!
//! # Modules
//!
//! - `connection`: ConnectionRegistry with its topic index and type-safe ConnectionId
//! - `manager`: publish/subscribe entry points and the connection guard
//! - `message`: the published envelope, its frame encoding and the default topic
//! - `replay`: id assignment and the bounded resumption journal

pub mod connection;
pub mod manager;
pub mod message;
pub mod replay;

pub use manager::{ConnectionGuard, Manager};
pub use message::{Message, DEFAULT_TOPIC};

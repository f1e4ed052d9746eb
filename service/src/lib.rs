//! Infrastructure shared by every layer of the relay: process configuration and logging.

pub mod config;
pub mod logging;

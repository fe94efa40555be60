//! NATS JetStream integration module
//!
//! Announces finished batches on a JetStream subject

pub mod event;
pub mod client;

pub use event::CompletionEvent;
pub use client::{NatsClient, NatsConfig};

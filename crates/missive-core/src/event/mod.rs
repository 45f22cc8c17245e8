//! Real-time notification of message writes.
//!
//! Provides the `MessageNotifier` port and an `EventBus` implementation that
//! distributes `MessageEvent`s to all subscribers via a
//! `tokio::sync::broadcast` channel.

pub mod bus;

pub use bus::{EventBus, MessageNotifier};

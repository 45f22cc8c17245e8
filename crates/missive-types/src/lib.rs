//! Shared domain types for Missive.
//!
//! This crate contains the message record, its external views, the
//! broadcast event payloads, configuration types, and the error taxonomy
//! shared by every other crate in the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod message;

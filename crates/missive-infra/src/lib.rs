//! Infrastructure layer for Missive.
//!
//! Contains implementations of the repository traits defined in `missive-core`:
//! SQLite storage, configuration loading, and API key digests.

pub mod config;
pub mod crypto;
pub mod sqlite;

//! Cryptographic helpers for Missive.
//!
//! - `hash`: SHA-256 digests used to verify API keys

pub mod hash;

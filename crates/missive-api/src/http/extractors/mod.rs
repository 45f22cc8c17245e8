//! Request extractors: API key authentication and lenient query parsing.

pub mod auth;
pub mod query;

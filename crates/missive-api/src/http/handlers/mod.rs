//! HTTP request handlers for the REST API.

pub mod message;
pub mod search;
pub mod session;
pub mod ws;

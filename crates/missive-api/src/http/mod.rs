//! HTTP/REST API layer for Missive.
//!
//! Axum-based REST API under `/api/` with API key authentication on read
//! endpoints, envelope response format, WebSocket broadcast and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;

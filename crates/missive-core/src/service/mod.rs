//! Service layer orchestrating validation, filtering and persistence.

pub mod message;

pub use message::MessageService;

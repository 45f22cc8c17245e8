//! Business logic and repository trait definitions for Missive.
//!
//! This crate defines the "ports" (repository and notifier traits) that the
//! infrastructure layer implements. It depends only on `missive-types` --
//! never on `missive-infra` or any database/IO crate.

pub mod event;
pub mod filter;
pub mod pagination;
pub mod repository;
pub mod service;
pub mod validation;

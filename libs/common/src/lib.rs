//! Common library for the mentoring marketplace
//!
//! This crate provides shared functionality used across different services
//! in the marketplace, currently the error types shared by the
//! session-integrity verification components.

pub mod error;

pub use error::{ValidationError, ValidationResult};

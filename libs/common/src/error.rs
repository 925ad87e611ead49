//! Custom error types for the common library
//!
//! This module defines application-specific error types that can be used
//! throughout the verification components.

use thiserror::Error;

/// Custom error type for input validation
///
/// Business-logic "no" answers (ineligible refunds, high risk scores) are
/// structured verdicts, never errors. `ValidationError` is reserved for
/// input shapes that cannot describe a real session at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Scheduled duration is zero or negative
    #[error("scheduled duration must be positive, got {0} minutes")]
    NonPositiveDuration(i64),

    /// A leave timestamp precedes the matching join timestamp
    #[error("{role} leave timestamp precedes join timestamp")]
    LeaveBeforeJoin {
        /// Which party the timestamps belong to ("mentor" or "student")
        role: &'static str,
    },

    /// Verification code does not match the expected shape
    #[error("malformed verification code: {0:?}")]
    MalformedVerificationCode(String),

    /// Log entry metadata variant does not match the entry action
    #[error("activity log entry {index} carries metadata inconsistent with action {action}")]
    MetadataActionMismatch {
        /// Index of the offending entry in the activity log
        index: usize,
        /// Wire name of the entry action
        action: &'static str,
    },

    /// Evidence metadata variant does not match the evidence type
    #[error("evidence item {index} carries metadata inconsistent with type {evidence_type}")]
    MetadataTypeMismatch {
        /// Index of the offending item in the evidence list
        index: usize,
        /// Wire name of the evidence type
        evidence_type: &'static str,
    },
}

/// Type alias for Result with ValidationError
pub type ValidationResult<T> = Result<T, ValidationError>;

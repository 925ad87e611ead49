//! Verification service models

pub mod evidence;
pub mod session;

// Re-export for convenience
pub use evidence::{ActivityStatus, Evidence, EvidenceMetadata, EvidenceType, validate_evidence};
pub use session::{
    ActivityAction, ActivityLogEntry, ActivityMetadata, Screenshot, Session, SessionStatus,
};

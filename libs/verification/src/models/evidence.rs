//! Evidence model for dispute submissions
//!
//! Evidence items are artifacts attached to a filed dispute. They are
//! independent of the session's activity log: the log is recorded live by
//! the platform, evidence is submitted afterwards by the disputing party.

use chrono::{DateTime, Utc};
use common::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

/// Kind of dispute evidence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    Screenshot,
    ChatLog,
    ActivityLog,
    SystemLog,
}

impl EvidenceType {
    /// Wire name of the evidence type
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceType::Screenshot => "screenshot",
            EvidenceType::ChatLog => "chat_log",
            EvidenceType::ActivityLog => "activity_log",
            EvidenceType::SystemLog => "system_log",
        }
    }
}

/// Activity status reported by an activity-log evidence item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Active,
    Inactive,
}

/// Structured metadata attached to an evidence item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvidenceMetadata {
    /// Activity status claimed by an activity-log excerpt
    Activity { status: ActivityStatus },
}

/// One item of evidence submitted with a dispute
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Evidence {
    #[serde(rename = "type")]
    pub evidence_type: EvidenceType,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EvidenceMetadata>,
}

impl Evidence {
    /// True if this item claims an inactivity period
    pub fn reports_inactivity(&self) -> bool {
        matches!(
            self.metadata,
            Some(EvidenceMetadata::Activity {
                status: ActivityStatus::Inactive,
            })
        )
    }
}

/// Validate an evidence list at the boundary
///
/// Metadata variants must match the item's type; only activity-log excerpts
/// may claim an activity status.
pub fn validate_evidence(evidence: &[Evidence]) -> ValidationResult<()> {
    for (index, item) in evidence.iter().enumerate() {
        let consistent = match (&item.evidence_type, &item.metadata) {
            (_, None) => true,
            (EvidenceType::ActivityLog, Some(EvidenceMetadata::Activity { .. })) => true,
            _ => false,
        };
        if !consistent {
            return Err(ValidationError::MetadataTypeMismatch {
                index,
                evidence_type: item.evidence_type.as_str(),
            });
        }
    }
    Ok(())
}

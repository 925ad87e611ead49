//! Dispute credibility analyzer
//!
//! Holistic verdict for a human moderator reviewing a filed dispute. It
//! combines the submitted evidence set with the fraud scorer's output into
//! three sub-scores and a weighted overall credibility. Sub-scores start at
//! 100, only decrease, and floor at zero.

use chrono::Duration;
use common::error::ValidationResult;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::fraud::FraudDetectionResult;
use crate::models::{validate_evidence, Evidence, EvidenceType, Session};

/// Weights for the overall credibility combination
#[derive(Debug, Clone)]
pub struct CredibilityWeights {
    pub consistency: f64,
    pub evidence_strength: f64,
    pub timeline_accuracy: f64,
    /// Weight of the inverted fraud risk score
    pub fraud: f64,
}

impl Default for CredibilityWeights {
    fn default() -> Self {
        Self {
            consistency: 0.30,
            evidence_strength: 0.25,
            timeline_accuracy: 0.25,
            fraud: 0.20,
        }
    }
}

/// Credibility analyzer configuration
#[derive(Debug, Clone)]
pub struct CredibilityConfig {
    /// Penalty when any evidence falls outside the session window
    pub timeline_penalty: f64,
    /// Penalty when a required evidence type is missing
    pub missing_evidence_penalty: f64,
    /// Penalty per inactivity claim contradicted by chat activity
    pub contradiction_penalty: f64,
    /// Penalty when the fraud scorer reports high risk
    pub high_risk_penalty: f64,
    /// Chat within this many seconds of a claimed inactivity contradicts it
    pub contradiction_window_seconds: i64,
    /// Fraud risk scores strictly above this count as high risk
    pub high_risk_threshold: u32,
    pub weights: CredibilityWeights,
}

impl Default for CredibilityConfig {
    fn default() -> Self {
        Self {
            timeline_penalty: 30.0,
            missing_evidence_penalty: 25.0,
            contradiction_penalty: 15.0,
            high_risk_penalty: 20.0,
            contradiction_window_seconds: 60,
            high_risk_threshold: 50,
            weights: CredibilityWeights::default(),
        }
    }
}

/// Credibility verdict for a dispute report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportAnalysis {
    pub consistency_score: f64,
    pub evidence_strength: f64,
    pub timeline_accuracy: f64,
    /// Weighted combination of the sub-scores and the inverted risk score
    pub overall_credibility: f64,
    pub flags: Vec<String>,
    /// Banded free-text recommendation for the moderator
    pub recommendation: String,
}

/// Dispute credibility analyzer
#[derive(Debug, Clone, Default)]
pub struct DisputeAnalyzer {
    config: CredibilityConfig,
}

impl DisputeAnalyzer {
    /// Create a new dispute analyzer
    pub fn new(config: CredibilityConfig) -> Self {
        Self { config }
    }

    /// Get the analyzer configuration
    pub fn config(&self) -> &CredibilityConfig {
        &self.config
    }

    /// Analyze a dispute report
    ///
    /// `evidence` holds the dispute-submission artifacts, independent of the
    /// session's own activity log; `fraud_result` is the precomputed verdict
    /// of the fraud scorer for the same session.
    pub fn analyze(
        &self,
        session: &Session,
        evidence: &[Evidence],
        fraud_result: &FraudDetectionResult,
    ) -> ValidationResult<ReportAnalysis> {
        session.validate()?;
        validate_evidence(evidence)?;
        info!("Analyzing dispute credibility for session: {}", session.session_id);

        let mut consistency = 100.0_f64;
        let mut evidence_strength = 100.0_f64;
        let mut timeline_accuracy = 100.0_f64;
        let mut flags = Vec::new();

        // Every evidence timestamp must fall inside the scheduled session
        // window. One penalty no matter how many items fall outside.
        let window_start = session.scheduled_start();
        let window_end = window_start + session.scheduled_duration();
        if evidence
            .iter()
            .any(|item| item.timestamp < window_start || item.timestamp > window_end)
        {
            flags.push(
                "timeline inconsistency: evidence timestamped outside the session window"
                    .to_string(),
            );
            timeline_accuracy -= self.config.timeline_penalty;
        }

        // A credible dispute needs an activity-log excerpt and a chat log.
        // The first missing type is flagged and the check stops there.
        for required in [EvidenceType::ActivityLog, EvidenceType::ChatLog] {
            if !evidence.iter().any(|item| item.evidence_type == required) {
                flags.push(format!("missing required evidence: {}", required.as_str()));
                evidence_strength -= self.config.missing_evidence_penalty;
                break;
            }
        }

        // Each claimed inactivity period with chat activity nearby is a
        // contradiction, penalized individually.
        let contradiction_window = Duration::seconds(self.config.contradiction_window_seconds);
        for claim in evidence.iter().filter(|item| {
            item.evidence_type == EvidenceType::ActivityLog && item.reports_inactivity()
        }) {
            let contradicted = evidence.iter().any(|chat| {
                chat.evidence_type == EvidenceType::ChatLog
                    && (chat.timestamp - claim.timestamp).abs() <= contradiction_window
            });
            if contradicted {
                flags.push("chat activity detected during reported inactivity period".to_string());
                consistency -= self.config.contradiction_penalty;
            }
        }

        if fraud_result.risk_score > self.config.high_risk_threshold {
            flags.push("high risk score from fraud detection".to_string());
            consistency -= self.config.high_risk_penalty;
        }

        let consistency = consistency.max(0.0);
        let evidence_strength = evidence_strength.max(0.0);
        let timeline_accuracy = timeline_accuracy.max(0.0);

        let weights = &self.config.weights;
        let overall_credibility = (weights.consistency * consistency
            + weights.evidence_strength * evidence_strength
            + weights.timeline_accuracy * timeline_accuracy
            + weights.fraud * (100.0 - f64::from(fraud_result.risk_score)))
        .max(0.0);

        Ok(ReportAnalysis {
            consistency_score: consistency,
            evidence_strength,
            timeline_accuracy,
            overall_credibility,
            flags,
            recommendation: recommendation_for(overall_credibility),
        })
    }
}

/// Banded free-text recommendation for a credibility score
fn recommendation_for(overall: f64) -> String {
    if overall >= 80.0 {
        "Approve: the submitted evidence consistently supports the dispute claim.".to_string()
    } else if overall >= 60.0 {
        "Review: the evidence largely supports the claim but contains minor inconsistencies."
            .to_string()
    } else if overall >= 40.0 {
        "Investigate: significant inconsistencies require manual investigation before resolution."
            .to_string()
    } else {
        "Reject: the evidence does not credibly support the dispute claim.".to_string()
    }
}

//! Fraud risk scorer
//!
//! Advisory triage over a finished session, distinct from the hard refund
//! gate: a session can pass the eligibility checks and still come back
//! flagged for investigation here. Penalties are independent and additive;
//! each one that fires pushes a human-readable flag.

use chrono::Duration;
use common::error::ValidationResult;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{ActivityAction, ActivityMetadata, Session};
use crate::timeline::{actual_log_duration, both_parties_present, detect_gap};

/// Penalty table for the fraud checks
#[derive(Debug, Clone)]
pub struct FraudPenalties {
    /// Logged duration below the scheduled-duration fraction
    pub duration_shortfall: u32,
    /// Gap detected between consecutive log entries
    pub activity_gap: u32,
    /// Mentor or student never appears in the log
    pub participant_absence: u32,
    /// Fewer verification entries than required
    pub low_verification: u32,
    /// No screenshot evidence in the log
    pub missing_screenshots: u32,
}

impl Default for FraudPenalties {
    fn default() -> Self {
        Self {
            duration_shortfall: 30,
            activity_gap: 20,
            participant_absence: 25,
            low_verification: 15,
            missing_screenshots: 10,
        }
    }
}

/// Fraud scorer configuration
#[derive(Debug, Clone)]
pub struct FraudConfig {
    /// Minimum logged duration as a fraction of the scheduled duration
    pub min_duration_fraction: f64,
    /// Largest tolerated silence between consecutive log entries, in minutes
    pub max_gap_minutes: i64,
    /// Verification entries expected in a mutually attested session
    pub min_verification_entries: usize,
    /// Penalty table
    pub penalties: FraudPenalties,
    /// Scores strictly below this recommend approval
    pub approve_below: u32,
    /// Scores strictly above this recommend rejection
    pub reject_above: u32,
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            min_duration_fraction: 0.8,
            max_gap_minutes: 5,
            min_verification_entries: 2,
            penalties: FraudPenalties::default(),
            approve_below: 30,
            reject_above: 70,
        }
    }
}

impl FraudConfig {
    /// Create a new FraudConfig from environment variables
    ///
    /// # Environment Variables
    /// - `FRAUD_MIN_DURATION_FRACTION`: Minimum duration fraction (default: 0.8)
    /// - `FRAUD_MAX_GAP_MINUTES`: Gap threshold in minutes (default: 5)
    /// - `FRAUD_MIN_VERIFICATION_ENTRIES`: Expected verification entries (default: 2)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let min_duration_fraction = std::env::var("FRAUD_MIN_DURATION_FRACTION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.min_duration_fraction);

        let max_gap_minutes = std::env::var("FRAUD_MAX_GAP_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_gap_minutes);

        let min_verification_entries = std::env::var("FRAUD_MIN_VERIFICATION_ENTRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.min_verification_entries);

        Self {
            min_duration_fraction,
            max_gap_minutes,
            min_verification_entries,
            ..defaults
        }
    }
}

/// Which evidence categories support the session claim
///
/// Each boolean is the inverse of the corresponding penalty check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceSummary {
    /// Both participants appear in the activity log
    pub session_logs: bool,
    /// Screenshot evidence was captured
    pub screenshots: bool,
    /// Verification code usage looks mutual
    pub verification_code: bool,
    /// Timeline is continuous and covers the scheduled duration
    pub activity_timeline: bool,
}

/// Fraud triage recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FraudRecommendation {
    Approve,
    Investigate,
    Reject,
}

/// Fraud detection verdict
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FraudDetectionResult {
    /// Additive risk score, clamped to the 0..=100 range
    pub risk_score: u32,
    /// One human-readable reason per penalty that fired
    pub flags: Vec<String>,
    pub evidence: EvidenceSummary,
    pub recommendation: FraudRecommendation,
}

/// Fraud risk scorer
#[derive(Debug, Clone, Default)]
pub struct FraudScorer {
    config: FraudConfig,
}

impl FraudScorer {
    /// Create a new fraud scorer
    pub fn new(config: FraudConfig) -> Self {
        Self { config }
    }

    /// Get the scorer configuration
    pub fn config(&self) -> &FraudConfig {
        &self.config
    }

    /// Score a session for fraud risk
    pub fn score(&self, session: &Session) -> ValidationResult<FraudDetectionResult> {
        session.validate()?;
        info!("Scoring fraud risk for session: {}", session.session_id);

        let log = &session.activity_log;
        let penalties = &self.config.penalties;
        let mut risk_score: u32 = 0;
        let mut flags = Vec::new();

        let scheduled_ms = session.scheduled_duration().num_milliseconds() as f64;
        let logged = actual_log_duration(log);
        let duration_ok =
            logged.num_milliseconds() as f64 >= self.config.min_duration_fraction * scheduled_ms;
        if !duration_ok {
            risk_score += penalties.duration_shortfall;
            flags.push(format!(
                "logged duration of {} minutes falls short of the scheduled {} minutes",
                logged.num_minutes(),
                session.duration_minutes
            ));
        }

        let gap_free = !detect_gap(log, Duration::minutes(self.config.max_gap_minutes));
        if !gap_free {
            risk_score += penalties.activity_gap;
            flags.push("suspicious gaps in the activity timeline".to_string());
        }

        let both_present = both_parties_present(log, session.mentor_id, session.student_id);
        if !both_present {
            risk_score += penalties.participant_absence;
            flags.push("mentor and student do not both appear in the activity log".to_string());
        }

        let verification_entries = log
            .iter()
            .filter(|entry| entry.action == ActivityAction::Verification)
            .count();
        let verification_ok = verification_entries >= self.config.min_verification_entries;
        if !verification_ok {
            risk_score += penalties.low_verification;
            flags.push(format!(
                "only {} of {} expected verification entries recorded",
                verification_entries, self.config.min_verification_entries
            ));
        }

        let screenshots_ok = log.iter().any(|entry| {
            matches!(
                entry.metadata,
                Some(ActivityMetadata::Screenshots { count }) if count > 0
            )
        });
        if !screenshots_ok {
            risk_score += penalties.missing_screenshots;
            flags.push("no screenshot evidence in the activity log".to_string());
        }

        // The default table happens to sum to 100; the clamp makes the
        // documented range hold for any configured table.
        let risk_score = risk_score.min(100);

        let recommendation = if risk_score < self.config.approve_below {
            FraudRecommendation::Approve
        } else if risk_score > self.config.reject_above {
            FraudRecommendation::Reject
        } else {
            FraudRecommendation::Investigate
        };

        Ok(FraudDetectionResult {
            risk_score,
            flags,
            evidence: EvidenceSummary {
                session_logs: both_present,
                screenshots: screenshots_ok,
                verification_code: verification_ok,
                activity_timeline: duration_ok && gap_free,
            },
            recommendation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLogEntry, SessionStatus};
    use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
    use uuid::Uuid;

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn entry(
        action: ActivityAction,
        user_id: Uuid,
        minute: i64,
        metadata: Option<ActivityMetadata>,
    ) -> ActivityLogEntry {
        ActivityLogEntry {
            action,
            user_id,
            timestamp: at(minute),
            metadata,
        }
    }

    /// Continuous 60-minute log with mutual verification and a screenshot
    fn clean_log(mentor_id: Uuid, student_id: Uuid) -> Vec<ActivityLogEntry> {
        let mut log = vec![
            entry(ActivityAction::Join, student_id, 0, None),
            entry(ActivityAction::Join, mentor_id, 1, None),
            entry(
                ActivityAction::Verification,
                student_id,
                2,
                Some(ActivityMetadata::VerificationCode {
                    code: "A1B2C3".to_string(),
                }),
            ),
            entry(
                ActivityAction::Verification,
                mentor_id,
                3,
                Some(ActivityMetadata::VerificationCode {
                    code: "A1B2C3".to_string(),
                }),
            ),
            entry(
                ActivityAction::ScreenShare,
                mentor_id,
                5,
                Some(ActivityMetadata::Screenshots { count: 1 }),
            ),
        ];
        // Chat entries every 5 minutes until the final leave at minute 60
        for minute in (10..60).step_by(5) {
            log.push(entry(ActivityAction::Chat, student_id, minute, None));
        }
        log.push(entry(ActivityAction::Leave, mentor_id, 60, None));
        log
    }

    fn session_with_log(mentor_id: Uuid, student_id: Uuid, log: Vec<ActivityLogEntry>) -> Session {
        Session {
            session_id: Uuid::new_v4(),
            mentor_id,
            student_id,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            duration_minutes: 60,
            status: SessionStatus::Completed,
            verification_code: "A1B2C3".to_string(),
            is_verified: true,
            joined_at: Some(at(0)),
            left_at: Some(at(60)),
            mentor_joined_at: Some(at(1)),
            mentor_left_at: Some(at(60)),
            activity_log: log,
            screenshots: vec![],
        }
    }

    #[test]
    fn test_clean_session_scores_zero() {
        let mentor_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let session = session_with_log(mentor_id, student_id, clean_log(mentor_id, student_id));

        let result = FraudScorer::default().score(&session).unwrap();
        assert_eq!(result.risk_score, 0);
        assert!(result.flags.is_empty());
        assert_eq!(result.recommendation, FraudRecommendation::Approve);
        assert!(result.evidence.session_logs);
        assert!(result.evidence.screenshots);
        assert!(result.evidence.verification_code);
        assert!(result.evidence.activity_timeline);
    }

    #[test]
    fn test_duration_shortfall_scores_thirty() {
        let mentor_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        // Same continuous log compressed into 15 of the 60 scheduled minutes
        let mut log = clean_log(mentor_id, student_id);
        for (i, entry) in log.iter_mut().enumerate() {
            entry.timestamp = at(i as i64);
        }
        let session = session_with_log(mentor_id, student_id, log);

        let result = FraudScorer::default().score(&session).unwrap();
        assert_eq!(result.risk_score, 30);
        assert_eq!(result.recommendation, FraudRecommendation::Investigate);
        assert!(!result.evidence.activity_timeline);
    }

    #[test]
    fn test_gap_scores_twenty_and_flags_gaps() {
        let mentor_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let mut log = clean_log(mentor_id, student_id);
        // Remove the chat entries between minute 10 and 20 to open a gap
        log.retain(|e| {
            let minute = (e.timestamp - at(0)).num_minutes();
            !(10..20).contains(&minute)
        });
        let session = session_with_log(mentor_id, student_id, log);

        let result = FraudScorer::default().score(&session).unwrap();
        assert_eq!(result.risk_score, 20);
        assert!(result.flags.iter().any(|f| f.contains("gaps")));
        assert_eq!(result.recommendation, FraudRecommendation::Approve);
    }

    #[test]
    fn test_every_penalty_fires_and_score_clamps() {
        // Two stranger entries ten minutes apart: short duration, a gap,
        // neither party present, no verification, no screenshots.
        let session = session_with_log(
            Uuid::new_v4(),
            Uuid::new_v4(),
            vec![
                entry(ActivityAction::Join, Uuid::new_v4(), 0, None),
                entry(ActivityAction::Join, Uuid::new_v4(), 10, None),
            ],
        );

        let result = FraudScorer::default().score(&session).unwrap();
        assert_eq!(result.risk_score, 100);
        assert_eq!(result.flags.len(), 5);
        assert_eq!(result.recommendation, FraudRecommendation::Reject);
    }

    #[test]
    fn test_score_is_deterministic() {
        let mentor_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let session = session_with_log(mentor_id, student_id, clean_log(mentor_id, student_id));

        let scorer = FraudScorer::default();
        let first = scorer.score(&session).unwrap();
        let second = scorer.score(&session).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_adding_a_gap_never_decreases_risk() {
        let mentor_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let mut session =
            session_with_log(mentor_id, student_id, clean_log(mentor_id, student_id));

        let scorer = FraudScorer::default();
        let before = scorer.score(&session).unwrap();

        // Drop the chat entries between minutes 30 and 45 to open a gap
        session.activity_log.retain(|e| {
            let minute = (e.timestamp - at(0)).num_minutes();
            !(30..45).contains(&minute)
        });
        let after = scorer.score(&session).unwrap();

        assert!(after.risk_score >= before.risk_score);
        assert!(after.flags.iter().any(|f| f.contains("gaps")));
    }
}

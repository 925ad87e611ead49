//! Refund eligibility evaluator
//!
//! Hard gate run before a refund/dispute request is opened for human
//! review. All checks must pass; the first failing check short-circuits
//! with a specific reason the caller can show to the user. Missing data is
//! never an error here — absence of proof resolves to "not eligible".

use chrono::{DateTime, Duration, Utc};
use common::error::ValidationResult;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::Session;
use crate::timeline::{detect_gap, role_bounded_duration};

/// Refund eligibility configuration
#[derive(Debug, Clone)]
pub struct EligibilityConfig {
    /// Minimum verified duration as a fraction of the scheduled duration
    pub min_duration_fraction: f64,
    /// Largest tolerated silence between consecutive log entries, in minutes
    pub max_gap_minutes: i64,
    /// Refund window after session end, in hours
    pub refund_window_hours: i64,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_duration_fraction: 0.8,
            max_gap_minutes: 5,
            refund_window_hours: 24,
        }
    }
}

impl EligibilityConfig {
    /// Create a new EligibilityConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REFUND_MIN_DURATION_FRACTION`: Minimum duration fraction (default: 0.8)
    /// - `REFUND_MAX_GAP_MINUTES`: Gap threshold in minutes (default: 5)
    /// - `REFUND_WINDOW_HOURS`: Refund window in hours (default: 24)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let min_duration_fraction = std::env::var("REFUND_MIN_DURATION_FRACTION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.min_duration_fraction);

        let max_gap_minutes = std::env::var("REFUND_MAX_GAP_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_gap_minutes);

        let refund_window_hours = std::env::var("REFUND_WINDOW_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.refund_window_hours);

        Self {
            min_duration_fraction,
            max_gap_minutes,
            refund_window_hours,
        }
    }
}

/// Refund eligibility verdict
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefundEligibility {
    pub eligible: bool,
    /// Reason for the first failing check, absent when eligible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RefundEligibility {
    fn eligible() -> Self {
        Self {
            eligible: true,
            reason: None,
        }
    }

    fn ineligible(reason: &str) -> Self {
        Self {
            eligible: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Refund eligibility evaluator
#[derive(Debug, Clone, Default)]
pub struct RefundEvaluator {
    config: EligibilityConfig,
}

impl RefundEvaluator {
    /// Create a new refund evaluator
    pub fn new(config: EligibilityConfig) -> Self {
        Self { config }
    }

    /// Get the evaluator configuration
    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    /// Evaluate a refund request against the eligibility gate
    ///
    /// `now` is passed explicitly so the verdict stays a pure function of
    /// its inputs. A positive verdict means the caller may transition the
    /// session to `disputed`; the transition itself is the caller's job.
    pub fn evaluate(
        &self,
        session: &Session,
        now: DateTime<Utc>,
    ) -> ValidationResult<RefundEligibility> {
        session.validate()?;
        info!(
            "Evaluating refund eligibility for session: {}",
            session.session_id
        );

        // 1. Both parties must have started the session.
        if session.joined_at.is_none() || session.mentor_joined_at.is_none() {
            return Ok(RefundEligibility::ineligible(
                "session never started: both parties must join",
            ));
        }

        // 2. A verification code must have been issued at session start.
        if session.verification_code.is_empty() {
            return Ok(RefundEligibility::ineligible(
                "no verification code was issued for this session",
            ));
        }

        // 3. The verified overlap duration must cover enough of the
        //    scheduled duration. No overlap window means the session has
        //    not ended; that fails closed rather than counting as zero.
        let scheduled_ms = session.scheduled_duration().num_milliseconds() as f64;
        match role_bounded_duration(session) {
            None => {
                return Ok(RefundEligibility::ineligible("session has not ended yet"));
            }
            Some(actual)
                if (actual.num_milliseconds() as f64)
                    < self.config.min_duration_fraction * scheduled_ms =>
            {
                return Ok(RefundEligibility::ineligible(
                    "session too short: verified duration below the refund threshold",
                ));
            }
            Some(_) => {}
        }

        // 4. The activity log must be continuous.
        if detect_gap(
            &session.activity_log,
            Duration::minutes(self.config.max_gap_minutes),
        ) {
            return Ok(RefundEligibility::ineligible(
                "suspicious inactivity gaps in the activity log",
            ));
        }

        // 5. The request must fall inside the refund window. Ending exactly
        //    on the boundary is still eligible.
        let session_end = match session.session_end() {
            Some(end) => end,
            None => {
                return Ok(RefundEligibility::ineligible("session has not ended yet"));
            }
        };
        if now - session_end > Duration::hours(self.config.refund_window_hours) {
            return Ok(RefundEligibility::ineligible("refund window expired"));
        }

        Ok(RefundEligibility::eligible())
    }
}

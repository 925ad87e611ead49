//! Session model and related functionality

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use common::error::{ValidationError, ValidationResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

/// Session lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Booked, not yet confirmed by the mentor
    Pending,
    /// Confirmed by both parties, not yet started
    Confirmed,
    /// Ended with a matching verification code
    Completed,
    /// Cancelled before it started
    Cancelled,
    /// Under review after a refund request
    Disputed,
}

/// Action recorded by an activity log entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Join,
    Leave,
    ScreenShare,
    Chat,
    Verification,
}

impl ActivityAction {
    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Join => "join",
            ActivityAction::Leave => "leave",
            ActivityAction::ScreenShare => "screen_share",
            ActivityAction::Chat => "chat",
            ActivityAction::Verification => "verification",
        }
    }
}

/// Structured metadata attached to an activity log entry
///
/// The wire format keys each variant by `kind`; which variants are legal for
/// a given entry depends on its action and is checked by
/// [`Session::validate`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityMetadata {
    /// The verification code a party typed
    VerificationCode { code: String },
    /// Number of screenshots captured during a screen share
    Screenshots { count: u32 },
}

/// One entry of a session's append-only activity log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityLogEntry {
    pub action: ActivityAction,
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ActivityMetadata>,
}

/// Screenshot captured during a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Screenshot {
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

/// Mentoring session entity
///
/// A consistent snapshot fetched by the caller; the verification components
/// only read it. `activity_log` insertion order is expected to be
/// chronological, but the timeline functions sort defensively rather than
/// trusting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub mentor_id: Uuid,
    pub student_id: Uuid,
    /// Scheduled date of the session
    pub date: NaiveDate,
    /// Scheduled start time of the session
    pub start_time: NaiveTime,
    /// Scheduled duration in minutes
    pub duration_minutes: i64,
    pub status: SessionStatus,
    /// One-time code generated at session start; empty until then
    pub verification_code: String,
    pub is_verified: bool,
    pub joined_at: Option<DateTime<Utc>>,
    pub left_at: Option<DateTime<Utc>>,
    pub mentor_joined_at: Option<DateTime<Utc>>,
    pub mentor_left_at: Option<DateTime<Utc>>,
    pub activity_log: Vec<ActivityLogEntry>,
    pub screenshots: Vec<Screenshot>,
}

impl Session {
    /// Scheduled start instant, combining `date` and `start_time`
    pub fn scheduled_start(&self) -> DateTime<Utc> {
        self.date.and_time(self.start_time).and_utc()
    }

    /// Scheduled duration as a `chrono::Duration`
    pub fn scheduled_duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }

    /// Instant the session ended, preferring the student's leave timestamp
    pub fn session_end(&self) -> Option<DateTime<Utc>> {
        self.left_at.or(self.mentor_left_at)
    }

    /// Validate the session shape at the boundary
    ///
    /// Rejects input that cannot describe a real session: non-positive
    /// scheduled duration, leave-before-join timestamp pairs, a malformed
    /// verification code, or log metadata inconsistent with its entry
    /// action. Missing timestamps and empty logs are legal — the evaluators
    /// resolve those to conservative verdicts.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.duration_minutes <= 0 {
            return Err(ValidationError::NonPositiveDuration(self.duration_minutes));
        }

        if let (Some(joined), Some(left)) = (self.joined_at, self.left_at) {
            if left < joined {
                return Err(ValidationError::LeaveBeforeJoin { role: "student" });
            }
        }

        if let (Some(joined), Some(left)) = (self.mentor_joined_at, self.mentor_left_at) {
            if left < joined {
                return Err(ValidationError::LeaveBeforeJoin { role: "mentor" });
            }
        }

        // Empty means "not yet issued"; that is a business outcome for the
        // eligibility gate, not a shape error.
        if !self.verification_code.is_empty()
            && !verification_code_regex().is_match(&self.verification_code)
        {
            return Err(ValidationError::MalformedVerificationCode(
                self.verification_code.clone(),
            ));
        }

        for (index, entry) in self.activity_log.iter().enumerate() {
            let consistent = match (&entry.action, &entry.metadata) {
                (_, None) => true,
                (ActivityAction::Verification, Some(ActivityMetadata::VerificationCode { .. })) => {
                    true
                }
                (ActivityAction::ScreenShare, Some(ActivityMetadata::Screenshots { .. })) => true,
                _ => false,
            };
            if !consistent {
                return Err(ValidationError::MetadataActionMismatch {
                    index,
                    action: entry.action.as_str(),
                });
            }
        }

        Ok(())
    }
}

/// Regex for the verification code shape (six uppercase alphanumerics)
fn verification_code_regex() -> &'static Regex {
    static VERIFICATION_CODE_REGEX: OnceLock<Regex> = OnceLock::new();
    VERIFICATION_CODE_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Z0-9]{6}$").expect("Failed to compile verification code regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_session() -> Session {
        Session {
            session_id: Uuid::new_v4(),
            mentor_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            duration_minutes: 60,
            status: SessionStatus::Completed,
            verification_code: "A1B2C3".to_string(),
            is_verified: true,
            joined_at: None,
            left_at: None,
            mentor_joined_at: None,
            mentor_left_at: None,
            activity_log: vec![],
            screenshots: vec![],
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_session() {
        assert!(base_session().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_duration() {
        let mut session = base_session();
        session.duration_minutes = 0;
        assert_eq!(
            session.validate(),
            Err(ValidationError::NonPositiveDuration(0))
        );
    }

    #[test]
    fn test_validate_rejects_leave_before_join() {
        let mut session = base_session();
        session.joined_at = Some(Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap());
        session.left_at = Some(Utc.with_ymd_and_hms(2025, 6, 1, 13, 0, 0).unwrap());
        assert_eq!(
            session.validate(),
            Err(ValidationError::LeaveBeforeJoin { role: "student" })
        );
    }

    #[test]
    fn test_validate_rejects_malformed_verification_code() {
        let mut session = base_session();
        session.verification_code = "abc".to_string();
        assert!(matches!(
            session.validate(),
            Err(ValidationError::MalformedVerificationCode(_))
        ));
    }

    #[test]
    fn test_validate_allows_unissued_verification_code() {
        let mut session = base_session();
        session.verification_code = String::new();
        assert!(session.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_metadata_action_mismatch() {
        let mut session = base_session();
        session.activity_log.push(ActivityLogEntry {
            action: ActivityAction::Chat,
            user_id: session.student_id,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 14, 5, 0).unwrap(),
            metadata: Some(ActivityMetadata::Screenshots { count: 2 }),
        });
        assert_eq!(
            session.validate(),
            Err(ValidationError::MetadataActionMismatch {
                index: 0,
                action: "chat",
            })
        );
    }

    #[test]
    fn test_activity_action_wire_names() {
        let entry = ActivityLogEntry {
            action: ActivityAction::ScreenShare,
            user_id: Uuid::new_v4(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 14, 5, 0).unwrap(),
            metadata: Some(ActivityMetadata::Screenshots { count: 1 }),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["action"], "screen_share");
        assert_eq!(json["metadata"]["kind"], "screenshots");
    }

    #[test]
    fn test_scheduled_start_combines_date_and_time() {
        let session = base_session();
        assert_eq!(
            session.scheduled_start(),
            Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap()
        );
        assert_eq!(session.scheduled_duration(), Duration::minutes(60));
    }
}

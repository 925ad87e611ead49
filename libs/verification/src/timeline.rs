//! Activity timeline validator
//!
//! Turns a raw activity log into the timing facts the eligibility evaluator
//! and fraud scorer consume. The log is expected to arrive in chronological
//! insertion order, but every function here works over a sorted copy of the
//! timestamps, so unsorted callers still get correct answers.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{ActivityLogEntry, Session};

/// Collect entry timestamps in ascending order
fn sorted_timestamps(log: &[ActivityLogEntry]) -> Vec<DateTime<Utc>> {
    let mut timestamps: Vec<DateTime<Utc>> = log.iter().map(|entry| entry.timestamp).collect();
    timestamps.sort_unstable();
    timestamps
}

/// Duration spanned by the activity log
///
/// Last entry minus first entry, zero for logs with fewer than two entries.
/// This measures what the log shows, not what the join/leave timestamps
/// claim — the two are compared by the fraud scorer.
pub fn actual_log_duration(log: &[ActivityLogEntry]) -> Duration {
    let timestamps = sorted_timestamps(log);
    match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) if timestamps.len() >= 2 => *last - *first,
        _ => Duration::zero(),
    }
}

/// Duration both parties were present together
///
/// Overlap window from the later join to the earlier leave. Returns `None`
/// when any of the four timestamps is missing: the session has not ended
/// yet, which callers must treat as "unknown", never as a zero-length
/// session. A negative overlap clamps to zero.
pub fn role_bounded_duration(session: &Session) -> Option<Duration> {
    let joined = session.joined_at?;
    let mentor_joined = session.mentor_joined_at?;
    let left = session.left_at?;
    let mentor_left = session.mentor_left_at?;

    let start = joined.max(mentor_joined);
    let end = left.min(mentor_left);
    Some((end - start).max(Duration::zero()))
}

/// True if any two consecutive entries are separated by more than `max_gap`
///
/// An empty or single-entry log has no gap.
pub fn detect_gap(log: &[ActivityLogEntry], max_gap: Duration) -> bool {
    sorted_timestamps(log)
        .windows(2)
        .any(|pair| pair[1] - pair[0] > max_gap)
}

/// True only if both the mentor and the student appear in the log
pub fn both_parties_present(log: &[ActivityLogEntry], mentor_id: Uuid, student_id: Uuid) -> bool {
    let mentor_seen = log.iter().any(|entry| entry.user_id == mentor_id);
    let student_seen = log.iter().any(|entry| entry.user_id == student_id);
    mentor_seen && student_seen
}

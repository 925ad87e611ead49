//! Session-integrity verification for the mentoring marketplace
//!
//! This crate decides, from a session's append-only activity timeline and
//! submitted dispute evidence, whether a paid mentoring session actually
//! happened as claimed, whether a refund request is legitimate, and how much
//! fraud risk a session or dispute report carries.
//!
//! Four cooperating pure-logic components, leaves first:
//! - [`timeline`] derives duration and gap/presence facts from the log
//! - [`eligibility`] gates refund requests on those facts
//! - [`fraud`] produces a weighted risk score and triage recommendation
//! - [`credibility`] combines dispute evidence with the fraud verdict into
//!   a credibility score for human moderators
//!
//! Data flows one direction: session + logs → timeline facts →
//! {eligibility, risk score} → credibility. Every component is a
//! synchronous pure function of its inputs plus an explicitly passed "now";
//! persistence, HTTP and notifications belong to the callers.

pub mod credibility;
pub mod eligibility;
pub mod fraud;
pub mod models;
pub mod timeline;

pub use credibility::{CredibilityConfig, DisputeAnalyzer, ReportAnalysis};
pub use eligibility::{EligibilityConfig, RefundEligibility, RefundEvaluator};
pub use fraud::{FraudConfig, FraudDetectionResult, FraudRecommendation, FraudScorer};
pub use models::{Evidence, Session};

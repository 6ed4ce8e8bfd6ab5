//! Completion record model definition.

use jiff::{civil::Date, Timestamp};
use serde::{Deserialize, Serialize};

use super::{CompletionStatus, StepId, UserScope};

/// Fact that a step was completed or skipped on a calendar day.
///
/// At most one record exists per (`step_id`, `date`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRecord {
    /// Unique identifier assigned by the store
    pub id: u64,

    pub step_id: StepId,

    pub user_id: UserScope,

    /// Calendar day the record applies to
    pub date: Date,

    pub status: CompletionStatus,

    /// What was actually applied; only kept for completed records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_used: Option<String>,

    /// When the action was recorded (audit only)
    pub completed_at: Timestamp,
}

impl CompletionRecord {
    /// Ledger key of the record.
    pub fn key(&self) -> (StepId, Date) {
        (self.step_id, self.date)
    }

    pub fn is_completed(&self) -> bool {
        self.status == CompletionStatus::Completed
    }

    pub fn is_skipped(&self) -> bool {
        self.status == CompletionStatus::Skipped
    }
}

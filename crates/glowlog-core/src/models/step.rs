//! Routine step model definition and related functionality.

use std::fmt;

use jiff::{civil::Date, Timestamp};
use serde::{Deserialize, Serialize};

use super::{StepCategory, TimeOfDay};
use crate::schedule::Schedule;

/// Identifier of a routine step, assigned by the store.
pub type StepId = u64;

/// Opaque identifier of a product in the external catalog.
pub type ProductId = String;

/// Owner scope of steps and completion records.
///
/// The core never interprets the value: it is a fixed local identity for
/// on-device storage or an authenticated user id for a shared database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserScope(String);

impl UserScope {
    /// Identity used for single-user on-device storage.
    pub const LOCAL: &'static str = "local";

    /// Creates a scope for the given user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The fixed local scope.
    pub fn local() -> Self {
        Self::new(Self::LOCAL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserScope {
    fn default() -> Self {
        Self::local()
    }
}

impl fmt::Display for UserScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scheduled action within the user's skincare routine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutineStep {
    /// Unique identifier for the step
    pub id: StepId,

    /// Owner of the step
    pub user_id: UserScope,

    /// Display name, e.g. "Vitamin C serum"
    pub name: String,

    /// Free-text product name shown alongside the step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    #[serde(default)]
    pub category: StepCategory,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub time_of_day: TimeOfDay,

    /// Position within the routine; lower sorts first
    pub order: u32,

    /// Weak reference to a catalog product
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,

    /// Recurrence; stored flat alongside the other fields
    #[serde(flatten)]
    pub schedule: Schedule,

    /// Timestamp when the step was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the step was last updated (UTC)
    pub updated_at: Timestamp,
}

impl RoutineStep {
    /// Sort key giving stable routine order: `order`, then insertion.
    pub fn sort_key(&self) -> (u32, StepId) {
        (self.order, self.id)
    }
}

/// A step due on a given day together with that day's record, if any.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TodayStep {
    #[serde(flatten)]
    pub step: RoutineStep,
    pub is_completed: bool,
    pub is_skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_used: Option<String>,
}

/// Completed versus due steps for one day.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Whether every due step has been completed.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Steps due on one calendar day, in routine order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DaySchedule {
    pub date: Date,
    pub steps: Vec<RoutineStep>,
}

impl DaySchedule {
    pub fn step_ids(&self) -> Vec<StepId> {
        self.steps.iter().map(|s| s.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

//! Request types for creating and updating models.

use jiff::{civil::Date, Timestamp};
use serde::{Deserialize, Serialize};

use super::{CompletionStatus, ProductId, RoutineStep, StepCategory, StepId, TimeOfDay};
use crate::schedule::Schedule;

/// Everything needed to create a routine step. Identity, order and timestamps
/// are assigned on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepDraft {
    pub name: String,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub category: StepCategory,
    #[serde(default)]
    pub notes: Option<String>,
    pub time_of_day: TimeOfDay,
    #[serde(flatten)]
    pub schedule: Schedule,
}

impl StepDraft {
    /// Creates a draft with the required fields; the rest default to empty.
    pub fn new(name: impl Into<String>, time_of_day: TimeOfDay, schedule: Schedule) -> Self {
        Self {
            name: name.into(),
            product_name: None,
            product_id: None,
            category: StepCategory::default(),
            notes: None,
            time_of_day,
            schedule,
        }
    }

    pub fn with_category(mut self, category: StepCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_product(mut self, product_id: impl Into<ProductId>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn with_product_name(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = Some(product_name.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update of a step. `None` leaves a field untouched; for clearable
/// fields `Some(None)` clears the stored value.
///
/// Setting `schedule` replaces the whole schedule, so values belonging to the
/// previous shape are discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepPatch {
    pub name: Option<String>,
    pub product_name: Option<Option<String>>,
    pub product_id: Option<Option<ProductId>>,
    pub category: Option<StepCategory>,
    pub notes: Option<Option<String>>,
    pub time_of_day: Option<TimeOfDay>,
    pub schedule: Option<Schedule>,
}

impl StepPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.product_name.is_none()
            && self.product_id.is_none()
            && self.category.is_none()
            && self.notes.is_none()
            && self.time_of_day.is_none()
            && self.schedule.is_none()
    }

    /// Merges the provided fields into `step` and stamps `updated_at`.
    pub fn apply_to(&self, step: &mut RoutineStep, now: Timestamp) {
        if let Some(name) = &self.name {
            step.name.clone_from(name);
        }
        if let Some(product_name) = &self.product_name {
            step.product_name.clone_from(product_name);
        }
        if let Some(product_id) = &self.product_id {
            step.product_id.clone_from(product_id);
        }
        if let Some(category) = self.category {
            step.category = category;
        }
        if let Some(notes) = &self.notes {
            step.notes.clone_from(notes);
        }
        if let Some(time_of_day) = self.time_of_day {
            step.time_of_day = time_of_day;
        }
        if let Some(schedule) = &self.schedule {
            step.schedule.clone_from(schedule);
        }
        step.updated_at = now;
    }
}

/// New position of a single step in a reorder batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderUpdate {
    pub id: StepId,
    pub order: u32,
}

/// A completion record before the store assigns its identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCompletion {
    pub step_id: StepId,
    pub date: Date,
    pub status: CompletionStatus,
    #[serde(default)]
    pub product_used: Option<String>,
    pub completed_at: Timestamp,
}

impl NewCompletion {
    /// A completed record, optionally noting the product applied.
    pub fn completed(step_id: StepId, date: Date, product_used: Option<String>) -> Self {
        Self {
            step_id,
            date,
            status: CompletionStatus::Completed,
            product_used,
            completed_at: Timestamp::now(),
        }
    }

    /// A skipped record. Skips never carry a product.
    pub fn skipped(step_id: StepId, date: Date) -> Self {
        Self {
            step_id,
            date,
            status: CompletionStatus::Skipped,
            product_used: None,
            completed_at: Timestamp::now(),
        }
    }
}

//! Result wrapper types for displaying operation outcomes.

use std::fmt;

use jiff::civil::Date;

use crate::models::{CompletionRecord, Product, RoutineStep, TimeOfDay};

/// Wrapper type for displaying the result of create operations.
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<RoutineStep> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created step with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<Product> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Added product '{}'", self.resource.name)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of update operations, with the
/// list of fields that changed.
///
/// # Examples
///
/// ```rust
/// use glowlog_core::{
///     display::UpdateResult,
///     models::{RoutineStep, StepCategory, TimeOfDay, UserScope},
///     schedule::Schedule,
/// };
/// use jiff::Timestamp;
///
/// let step = RoutineStep {
///     id: 4,
///     user_id: UserScope::local(),
///     name: "Moisturizer".to_string(),
///     product_name: None,
///     category: StepCategory::Moisturizer,
///     notes: None,
///     time_of_day: TimeOfDay::Both,
///     order: 3,
///     product_id: None,
///     schedule: Schedule::daily(),
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
/// };
///
/// let result = UpdateResult::with_changes(step, vec!["Updated name".to_string()]);
/// assert!(result.to_string().contains("- Updated name"));
/// ```
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }
}

impl fmt::Display for UpdateResult<RoutineStep> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated step with ID: {}", self.resource.id)?;

        if !self.changes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of delete operations.
pub struct DeleteResult<T> {
    pub resource: T,
}

impl<T> DeleteResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for DeleteResult<RoutineStep> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted step '{}' (ID: {})",
            self.resource.name, self.resource.id
        )
    }
}

/// Outcome of toggling a step's completion or skip on a day.
pub struct ToggleResult<'a> {
    pub step: &'a RoutineStep,
    pub date: Date,
    /// Record left in place, `None` when the toggle cleared the day
    pub record: Option<CompletionRecord>,
}

impl fmt::Display for ToggleResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.record {
            Some(record) => {
                write!(
                    f,
                    "{} '{}' on {}",
                    record.status.with_icon(),
                    self.step.name,
                    self.date
                )?;
                if let Some(product) = &record.product_used {
                    write!(f, " with {product}")?;
                }
                writeln!(f)
            }
            None => writeln!(f, "Cleared '{}' on {}", self.step.name, self.date),
        }
    }
}

/// Outcome of finishing a routine.
pub struct FinishResult {
    pub date: Date,
    pub time_of_day: Option<TimeOfDay>,
    pub skipped: usize,
}

impl fmt::Display for FinishResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = match self.time_of_day {
            Some(TimeOfDay::Morning) => "morning routine",
            Some(TimeOfDay::Evening) => "evening routine",
            Some(TimeOfDay::Both) | None => "routine",
        };
        match self.skipped {
            0 => writeln!(f, "Finished {part} for {}; nothing left to skip", self.date),
            1 => writeln!(f, "Finished {part} for {}; skipped 1 step", self.date),
            n => writeln!(f, "Finished {part} for {}; skipped {n} steps", self.date),
        }
    }
}

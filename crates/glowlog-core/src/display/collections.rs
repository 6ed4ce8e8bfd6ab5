//! Collection wrapper types for displaying groups of domain objects.
//!
//! Each wrapper handles the empty case with a short sentence instead of
//! printing nothing.

use std::fmt;

use jiff::civil::Date;

use super::datetime::DayHeading;
use crate::models::{DaySchedule, Product, Progress, RoutineStep, TimeOfDay, TodayStep};

/// Newtype wrapper for displaying collections of steps.
///
/// # Examples
///
/// ```rust
/// use glowlog_core::{
///     display::Steps,
///     models::{RoutineStep, StepCategory, TimeOfDay, UserScope},
///     schedule::Schedule,
/// };
/// use jiff::Timestamp;
///
/// let step = RoutineStep {
///     id: 1,
///     user_id: UserScope::local(),
///     name: "Cleanser".to_string(),
///     product_name: None,
///     category: StepCategory::Cleanser,
///     notes: None,
///     time_of_day: TimeOfDay::Morning,
///     order: 0,
///     product_id: None,
///     schedule: Schedule::daily(),
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
/// };
///
/// let output = format!("{}", Steps(vec![step]));
/// assert!(output.contains("### 1. Cleanser"));
/// ```
pub struct Steps(pub Vec<RoutineStep>);

impl Steps {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Steps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No steps in this routine.");
        }
        for step in &self.0 {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// The checklist for one day, with its progress line.
pub struct TodaySteps {
    pub date: Date,
    pub time_of_day: Option<TimeOfDay>,
    pub steps: Vec<TodayStep>,
}

impl TodaySteps {
    fn progress(&self) -> Progress {
        Progress {
            completed: self.steps.iter().filter(|s| s.is_completed).count(),
            total: self.steps.len(),
        }
    }
}

impl fmt::Display for TodaySteps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time_of_day {
            Some(time_of_day) => writeln!(
                f,
                "# {} · {}",
                DayHeading(self.date),
                time_of_day.with_icon()
            )?,
            None => writeln!(f, "# {}", DayHeading(self.date))?,
        }
        writeln!(f)?;

        if self.steps.is_empty() {
            return writeln!(f, "Nothing scheduled.");
        }
        for step in &self.steps {
            write!(f, "{step}")?;
        }
        writeln!(f)?;
        writeln!(f, "Progress: {}", self.progress())
    }
}

/// Newtype wrapper for a multi-day schedule preview.
pub struct Upcoming(pub Vec<DaySchedule>);

impl fmt::Display for Upcoming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(DaySchedule::is_empty) {
            return writeln!(f, "No steps scheduled in this period.");
        }
        for day in &self.0 {
            writeln!(f, "## {}", DayHeading(day.date))?;
            writeln!(f)?;
            if day.steps.is_empty() {
                writeln!(f, "Rest day.")?;
            }
            for step in &day.steps {
                writeln!(
                    f,
                    "- {}. {} ({})",
                    step.id,
                    step.name,
                    step.time_of_day.as_str()
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Newtype wrapper for the product shelf.
pub struct Products(pub Vec<Product>);

impl fmt::Display for Products {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No products on the shelf.");
        }
        for product in &self.0 {
            write!(f, "{product}")?;
        }
        Ok(())
    }
}

//! Display implementations for domain models.
//!
//! Kept apart from the model definitions. Everything renders as markdown so
//! the terminal renderer can style headers and lists.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{
    CompletionRecord, CompletionStatus, Product, ProductStatus, Progress, RoutineStep,
    StepCategory, TimeOfDay, TodayStep,
};

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StepCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RoutineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.id,
            self.name,
            self.time_of_day.with_icon()
        )?;
        writeln!(f)?;

        writeln!(f, "- Category: {}", self.category)?;
        writeln!(f, "- Schedule: {}", self.schedule)?;
        writeln!(f, "- Order: {}", self.order)?;
        if let Some(product) = &self.product_name {
            writeln!(f, "- Product: {product}")?;
        }
        if let Some(product_id) = &self.product_id {
            writeln!(f, "- Product ID: {product_id}")?;
        }
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if let Some(notes) = &self.notes {
            writeln!(f)?;
            writeln!(f, "{notes}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for TodayStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.is_completed {
            "[x]"
        } else if self.is_skipped {
            "[-]"
        } else {
            "[ ]"
        };
        write!(f, "- {mark} {}. {}", self.step.id, self.step.name)?;
        if let Some(product) = self.product_used.as_ref().or(self.step.product_name.as_ref()) {
            write!(f, " ({product})")?;
        }
        if self.step.time_of_day == TimeOfDay::Both {
            write!(f, " ◐")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for CompletionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Step {} on {}: {}",
            self.step_id,
            self.date,
            self.status.with_icon()
        )?;
        if let Some(product) = &self.product_used {
            write!(f, " with {product}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return write!(f, "Nothing scheduled");
        }
        let percentage = (self.completed as f64 / self.total as f64 * 100.0).round() as u32;
        write!(f, "{}/{} done ({percentage}%)", self.completed, self.total)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = match self.status {
            ProductStatus::Active => "●",
            ProductStatus::Shelf => "○",
        };
        writeln!(f, "- {icon} {} ({})", self.name, self.status)?;
        writeln!(f, "  - ID: {}", self.id)
    }
}

//! Enumerations for step placement, categories, and record statuses.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Part of the day a step belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Evening,
    /// Performed in both routines; matches either morning or evening queries
    Both,
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morning" | "am" => Ok(TimeOfDay::Morning),
            "evening" | "pm" | "night" => Ok(TimeOfDay::Evening),
            "both" => Ok(TimeOfDay::Both),
            _ => Err(format!("Invalid time of day: {s}")),
        }
    }
}

impl TimeOfDay {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Both => "both",
        }
    }

    /// Whether a step placed at `self` belongs in a `query` listing.
    ///
    /// A `both` step matches any query, and a `both` query matches any step.
    pub fn matches(self, query: TimeOfDay) -> bool {
        self == query || self == TimeOfDay::Both || query == TimeOfDay::Both
    }

    /// Get the time of day with an icon for display.
    pub fn with_icon(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "☀ Morning",
            TimeOfDay::Evening => "☾ Evening",
            TimeOfDay::Both => "◐ Morning & Evening",
        }
    }
}

/// Kind of skincare action a step performs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepCategory {
    Cleanser,
    Toner,
    Essence,
    Serum,
    Treatment,
    Exfoliant,
    Mask,
    EyeCream,
    Moisturizer,
    Oil,
    Sunscreen,
    #[default]
    Other,
}

impl FromStr for StepCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "cleanser" => Ok(StepCategory::Cleanser),
            "toner" => Ok(StepCategory::Toner),
            "essence" => Ok(StepCategory::Essence),
            "serum" => Ok(StepCategory::Serum),
            "treatment" => Ok(StepCategory::Treatment),
            "exfoliant" => Ok(StepCategory::Exfoliant),
            "mask" => Ok(StepCategory::Mask),
            "eye_cream" | "eyecream" => Ok(StepCategory::EyeCream),
            "moisturizer" => Ok(StepCategory::Moisturizer),
            "oil" => Ok(StepCategory::Oil),
            "sunscreen" | "spf" => Ok(StepCategory::Sunscreen),
            "other" => Ok(StepCategory::Other),
            _ => Err(format!("Invalid step category: {s}")),
        }
    }
}

impl StepCategory {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StepCategory::Cleanser => "cleanser",
            StepCategory::Toner => "toner",
            StepCategory::Essence => "essence",
            StepCategory::Serum => "serum",
            StepCategory::Treatment => "treatment",
            StepCategory::Exfoliant => "exfoliant",
            StepCategory::Mask => "mask",
            StepCategory::EyeCream => "eye_cream",
            StepCategory::Moisturizer => "moisturizer",
            StepCategory::Oil => "oil",
            StepCategory::Sunscreen => "sunscreen",
            StepCategory::Other => "other",
        }
    }
}

/// Outcome recorded for a step on a given day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Completed,
    Skipped,
}

impl FromStr for CompletionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(CompletionStatus::Completed),
            "skipped" => Ok(CompletionStatus::Skipped),
            _ => Err(format!("Invalid completion status: {s}")),
        }
    }
}

impl CompletionStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::Completed => "completed",
            CompletionStatus::Skipped => "skipped",
        }
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// ```rust
    /// use glowlog_core::models::CompletionStatus;
    ///
    /// assert_eq!(CompletionStatus::Completed.with_icon(), "✓ Done");
    /// assert_eq!(CompletionStatus::Skipped.with_icon(), "– Skipped");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            CompletionStatus::Completed => "✓ Done",
            CompletionStatus::Skipped => "– Skipped",
        }
    }
}

/// Whether a product is in current use or resting on the shelf.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Referenced by at least one routine step
    Active,

    /// Not referenced by any step
    #[default]
    Shelf,
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ProductStatus::Active),
            "shelf" => Ok(ProductStatus::Shelf),
            _ => Err(format!("Invalid product status: {s}")),
        }
    }
}

impl ProductStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Shelf => "shelf",
        }
    }
}

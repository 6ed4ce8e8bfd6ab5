//! Markdown formatting for routine data and operation results.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]).
//! Collections and operation outcomes get small wrapper types so each output
//! context formats consistently.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Wrappers        │    │   Markdown      │
//! │  (RoutineStep,  │───▶│ (Steps, Today-  │───▶│   output        │
//! │   Product)      │    │  Steps, ...)    │    │  (terminal)     │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! - [`collections`]: [`Steps`], [`TodaySteps`], [`Upcoming`], [`Products`]
//! - [`results`]: create, update, delete, toggle and finish outcomes
//! - [`datetime`]: timestamp and day formatting
//!
//! ```rust
//! use glowlog_core::display::FinishResult;
//! use glowlog_core::models::TimeOfDay;
//! use jiff::civil::date;
//!
//! let result = FinishResult {
//!     date: date(2024, 1, 1),
//!     time_of_day: Some(TimeOfDay::Morning),
//!     skipped: 1,
//! };
//! assert!(result.to_string().contains("skipped 1 step"));
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;

pub use collections::{Products, Steps, TodaySteps, Upcoming};
pub use datetime::{DayHeading, LocalDateTime};
pub use results::{CreateResult, DeleteResult, FinishResult, ToggleResult, UpdateResult};

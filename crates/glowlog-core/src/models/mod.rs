//! Data models for routine steps, completion records and products.
//!
//! Display implementations for these models live in
//! [`crate::display::models`] so that data and presentation stay separate.
//!
//! # Examples
//!
//! ```rust
//! use glowlog_core::{
//!     models::{StepCategory, StepDraft, TimeOfDay},
//!     schedule::{DayOfWeek, Schedule},
//! };
//!
//! let draft = StepDraft::new(
//!     "Retinol",
//!     TimeOfDay::Evening,
//!     Schedule::weekly([DayOfWeek::Monday, DayOfWeek::Thursday]),
//! )
//! .with_category(StepCategory::Treatment)
//! .with_notes("Pea-sized amount");
//!
//! assert_eq!(draft.schedule.kind(), "weekly");
//! ```

pub mod completion;
pub mod product;
pub mod requests;
pub mod status;
pub mod step;


pub use completion::CompletionRecord;
pub use product::Product;
pub use requests::{NewCompletion, OrderUpdate, StepDraft, StepPatch};
pub use status::{CompletionStatus, ProductStatus, StepCategory, TimeOfDay};
pub use step::{DaySchedule, Progress, ProductId, RoutineStep, StepId, TodayStep, UserScope};

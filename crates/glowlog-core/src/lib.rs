//! Core library for the Glowlog skincare routine tracker.
//!
//! This crate decides which routine steps are due on a given day, tracks
//! per-day completion and skip records, keeps step order stable and keeps
//! linked products marked active while any step uses them.
//!
//! # Layers
//!
//! - [`schedule`]: pure weekly / cycle / interval predicate
//! - [`ledger`]: per-(step, date) records and toggle planning
//! - [`repository`]: ordered step list with debounced reorder writes
//! - [`reconcile`]: product activation bookkeeping
//! - [`routine`]: the [`Routine`] facade and its [`RoutineBuilder`]
//! - [`store`]: persistence traits with SQLite, JSON file and memory backends
//! - [`display`]: markdown formatting for terminal front ends
//!
//! # Quick Start
//!
//! ```rust
//! use glowlog_core::{
//!     models::{StepDraft, TimeOfDay},
//!     schedule::{DayOfWeek, Schedule},
//!     RoutineBuilder,
//! };
//! use jiff::civil::date;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut routine = RoutineBuilder::new()
//!     .with_database_path(Some("glowlog.db"))
//!     .build()
//!     .await?;
//!
//! routine
//!     .add_step(StepDraft::new(
//!         "Exfoliant",
//!         TimeOfDay::Evening,
//!         Schedule::weekly([DayOfWeek::Tuesday, DayOfWeek::Friday]),
//!     ))
//!     .await?;
//!
//! for step in routine.today_steps(Some(TimeOfDay::Evening), date(2024, 1, 2)) {
//!     println!("{step}");
//! }
//! routine.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod display;
pub mod error;
pub mod ledger;
pub mod models;
pub mod reconcile;
pub mod repository;
pub mod routine;
pub mod schedule;
pub mod store;

// Re-export commonly used types
pub use db::Database;
pub use error::{GlowError, Result};
pub use ledger::{CompletionLedger, LedgerChange};
pub use models::{
    CompletionRecord, CompletionStatus, DaySchedule, NewCompletion, OrderUpdate, Product,
    ProductId, ProductStatus, Progress, RoutineStep, StepCategory, StepDraft, StepId, StepPatch,
    TimeOfDay, TodayStep, UserScope,
};
pub use reconcile::ProductReconciler;
pub use repository::{StepRepository, DEFAULT_REORDER_DELAY};
pub use routine::{Routine, RoutineBuilder};
pub use schedule::{is_active_on_date, DayOfWeek, Schedule};
pub use store::{
    CompletionStore, JsonFileStore, MemoryStore, ProductService, ProductShelf, RoutineStore,
    SqliteStore, StepStore, StoreBackend,
};

//! The routine facade consumed by front ends.
//!
//! [`Routine`] owns one user scope's steps and completion records. It loads
//! both from the configured store when built and on [`Routine::reload`], and
//! keeps them current as the front end toggles, skips, edits and reorders.
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │     Routine     │    │  StepRepository  │    │  RoutineStore   │
//! │ (step_ops,      │───▶│  CompletionLedger│───▶│ (sqlite, json,  │
//! │  completion_ops)│    │  Reconciler      │    │  memory)        │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use glowlog_core::{
//!     models::{StepDraft, TimeOfDay},
//!     schedule::Schedule,
//!     RoutineBuilder, StoreBackend,
//! };
//! use jiff::civil::date;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut routine = RoutineBuilder::new()
//!     .with_backend(StoreBackend::Memory)
//!     .build()
//!     .await?;
//!
//! let step = routine
//!     .add_step(StepDraft::new("Cleanser", TimeOfDay::Morning, Schedule::daily()))
//!     .await?;
//!
//! let today = date(2024, 5, 6);
//! routine.toggle_step_completion(step.id, today, None).await?;
//! assert!(routine.today_progress(today).is_complete());
//!
//! routine.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use std::{sync::Arc, time::Duration};

use jiff::civil::Date;
use log::{debug, warn};

use crate::{
    error::Result,
    ledger::CompletionLedger,
    models::{CompletionRecord, DaySchedule, Product, RoutineStep, StepId, UserScope},
    reconcile::ProductReconciler,
    repository::StepRepository,
    store::{ProductService, RoutineStore, StoreBackend},
};

pub mod builder;
pub mod completion_ops;
pub mod step_ops;


pub use builder::RoutineBuilder;

/// How far ahead [`Routine::next_due`] looks.
pub const NEXT_DUE_HORIZON_DAYS: u32 = 366;

/// One user's routine: steps, their schedules and per-day records.
pub struct Routine {
    store: Arc<dyn RoutineStore>,
    backend: StoreBackend,
    scope: UserScope,
    repository: StepRepository,
    ledger: CompletionLedger,
}

impl Routine {
    pub(crate) fn new(
        store: Arc<dyn RoutineStore>,
        backend: StoreBackend,
        scope: UserScope,
        products: Arc<dyn ProductService>,
        reorder_delay: Duration,
    ) -> Self {
        let repository = StepRepository::new(
            store.clone(),
            scope.clone(),
            ProductReconciler::new(products),
            reorder_delay,
        );
        Self {
            store,
            backend,
            scope,
            repository,
            ledger: CompletionLedger::new(),
        }
    }

    pub fn scope(&self) -> &UserScope {
        &self.scope
    }

    pub fn backend(&self) -> &StoreBackend {
        &self.backend
    }

    /// Replaces in-memory steps and records with the store's contents.
    ///
    /// A pending reorder is written first so the reload sees it.
    pub async fn reload(&mut self) -> Result<()> {
        if let Err(e) = self.repository.flush().await {
            warn!("Failed to save pending step order before reload: {e}");
        }
        self.repository.load().await?;
        let records = self.store.list_completions(&self.scope).await?;
        debug!("Loaded {} completion records", records.len());
        self.ledger = CompletionLedger::from_records(records);
        Ok(())
    }

    /// All steps in routine order.
    pub fn steps(&self) -> &[RoutineStep] {
        self.repository.steps()
    }

    pub fn step(&self, id: StepId) -> Option<&RoutineStep> {
        self.repository.get(id)
    }

    /// The record for `step_id` on `date`, if any.
    pub fn completion(&self, step_id: StepId, date: Date) -> Option<&CompletionRecord> {
        self.ledger.lookup(step_id, date)
    }

    /// Steps due on each of `days` days starting at `from`.
    pub fn upcoming(&self, from: Date, days: u32) -> Vec<DaySchedule> {
        let mut schedule = Vec::new();
        let mut day = from;
        for _ in 0..days {
            schedule.push(DaySchedule {
                date: day,
                steps: self.repository.due_on(None, day).cloned().collect(),
            });
            match day.tomorrow() {
                Ok(next) => day = next,
                Err(_) => break,
            }
        }
        schedule
    }

    /// First day on or after `from`, within a year, on which the step is due.
    pub fn next_due(&self, id: StepId, from: Date) -> Option<Date> {
        self.step(id)?
            .schedule
            .next_on_or_after(from, NEXT_DUE_HORIZON_DAYS)
    }

    /// Products known to the store's shelf.
    pub async fn products(&self) -> Result<Vec<Product>> {
        self.store.list_products().await
    }

    /// Registers a product on the shelf.
    pub async fn add_product(&self, name: &str) -> Result<Product> {
        self.store.add_product(name).await
    }

    /// Writes any pending reorder and stops background work.
    pub async fn shutdown(self) -> Result<()> {
        self.repository.shutdown().await
    }
}

//! Persistence contracts and the bundled backends.
//!
//! The routine engine only talks to the traits in this module. Which concrete
//! backend sits behind them is chosen once per session (see
//! [`StoreBackend`]) and never inspected by the scheduling or ledger logic.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │     Routine     │    │  RoutineStore   │    │  SqliteStore    │
//! │ (repository,    │───▶│  (StepStore +   │───▶│  JsonFileStore  │
//! │  ledger)        │    │  CompletionStore│    │  MemoryStore    │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Every backend deletes a step's completion records together with the step
//! and keeps at most one record per (step, date) by deleting before insert.

use std::path::PathBuf;

use async_trait::async_trait;
use jiff::civil::Date;

use crate::{
    error::Result,
    models::{
        CompletionRecord, NewCompletion, OrderUpdate, Product, ProductId, RoutineStep, StepDraft,
        StepId, StepPatch, UserScope,
    },
};

pub mod json;
pub mod memory;
pub mod sqlite;
mod state;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// CRUD over routine steps for one user scope.
#[async_trait]
pub trait StepStore: Send + Sync {
    /// All steps of the scope, in stored order.
    async fn list_steps(&self, scope: &UserScope) -> Result<Vec<RoutineStep>>;

    /// Inserts a step at `order` and returns it with id and timestamps.
    async fn insert_step(
        &self,
        scope: &UserScope,
        draft: &StepDraft,
        order: u32,
    ) -> Result<RoutineStep>;

    /// Merges `patch` into the step and returns the stored result.
    ///
    /// Fails with [`GlowError::StepNotFound`](crate::GlowError::StepNotFound)
    /// for unknown ids.
    async fn update_step(
        &self,
        scope: &UserScope,
        id: StepId,
        patch: &StepPatch,
    ) -> Result<RoutineStep>;

    /// Deletes the step and all of its completion records.
    async fn delete_step(&self, scope: &UserScope, id: StepId) -> Result<()>;

    /// Rewrites the order of every listed step in one batch.
    async fn update_orders(&self, scope: &UserScope, orders: &[OrderUpdate]) -> Result<()>;
}

/// Per-day completion records for one user scope.
#[async_trait]
pub trait CompletionStore: Send + Sync {
    async fn list_completions(&self, scope: &UserScope) -> Result<Vec<CompletionRecord>>;

    async fn insert_completion(
        &self,
        scope: &UserScope,
        record: &NewCompletion,
    ) -> Result<CompletionRecord>;

    /// Deletes the record for (step, date); a missing record is not an error.
    async fn delete_completion(&self, scope: &UserScope, step_id: StepId, date: Date)
        -> Result<()>;

    /// Inserts several records in one write.
    async fn bulk_insert_completions(
        &self,
        scope: &UserScope,
        records: &[NewCompletion],
    ) -> Result<Vec<CompletionRecord>>;
}

/// The two product operations the routine depends on.
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Marks the product active. Activating an active product is a no-op.
    async fn activate(&self, product_id: &ProductId) -> Result<()>;

    /// Moves the product to the shelf unless some step still references it.
    async fn deactivate_if_unused(&self, product_id: &ProductId) -> Result<()>;
}

/// Minimal product registry used by front ends to pick products.
#[async_trait]
pub trait ProductShelf: ProductService {
    /// Registers a new product on the shelf.
    async fn add_product(&self, name: &str) -> Result<Product>;

    async fn list_products(&self) -> Result<Vec<Product>>;
}

/// Everything a routine session needs from its backend.
pub trait RoutineStore: StepStore + CompletionStore + ProductShelf {}

impl<T: StepStore + CompletionStore + ProductShelf> RoutineStore for T {}

/// Backend selected for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// SQLite database shared by any number of user scopes
    Sqlite { path: PathBuf },
    /// Single-file on-device key-value document, always in the local scope
    JsonFile { path: PathBuf },
    /// Process-local storage, nothing survives the session
    Memory,
}

impl StoreBackend {
    /// Whether the backend only ever serves the fixed local scope.
    pub fn is_local_only(&self) -> bool {
        matches!(self, StoreBackend::JsonFile { .. } | StoreBackend::Memory)
    }
}

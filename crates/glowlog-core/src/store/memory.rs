//! Process-local backend. Nothing is written anywhere.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use jiff::civil::Date;

use super::{
    state::StoreState, CompletionStore, ProductService, ProductShelf, StepStore,
};
use crate::{
    error::Result,
    models::{
        CompletionRecord, NewCompletion, OrderUpdate, Product, ProductId, RoutineStep, StepDraft,
        StepId, StepPatch, UserScope,
    },
};

/// In-memory store, handy for previews and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl StepStore for MemoryStore {
    async fn list_steps(&self, scope: &UserScope) -> Result<Vec<RoutineStep>> {
        Ok(self.state().list_steps(scope))
    }

    async fn insert_step(
        &self,
        scope: &UserScope,
        draft: &StepDraft,
        order: u32,
    ) -> Result<RoutineStep> {
        Ok(self.state().insert_step(scope, draft, order))
    }

    async fn update_step(
        &self,
        scope: &UserScope,
        id: StepId,
        patch: &StepPatch,
    ) -> Result<RoutineStep> {
        self.state().update_step(scope, id, patch)
    }

    async fn delete_step(&self, scope: &UserScope, id: StepId) -> Result<()> {
        self.state().delete_step(scope, id)
    }

    async fn update_orders(&self, scope: &UserScope, orders: &[OrderUpdate]) -> Result<()> {
        self.state().update_orders(scope, orders);
        Ok(())
    }
}

#[async_trait]
impl CompletionStore for MemoryStore {
    async fn list_completions(&self, scope: &UserScope) -> Result<Vec<CompletionRecord>> {
        Ok(self.state().list_completions(scope))
    }

    async fn insert_completion(
        &self,
        scope: &UserScope,
        record: &NewCompletion,
    ) -> Result<CompletionRecord> {
        self.state().insert_completion(scope, record)
    }

    async fn delete_completion(
        &self,
        scope: &UserScope,
        step_id: StepId,
        date: Date,
    ) -> Result<()> {
        self.state().delete_completion(scope, step_id, date);
        Ok(())
    }

    async fn bulk_insert_completions(
        &self,
        scope: &UserScope,
        records: &[NewCompletion],
    ) -> Result<Vec<CompletionRecord>> {
        // Validate on a copy so a failing record leaves nothing half-written.
        let mut state = self.state();
        let mut next = state.clone();
        let stored = next.bulk_insert_completions(scope, records)?;
        *state = next;
        Ok(stored)
    }
}

#[async_trait]
impl ProductService for MemoryStore {
    async fn activate(&self, product_id: &ProductId) -> Result<()> {
        self.state().activate(product_id).map(|_| ())
    }

    async fn deactivate_if_unused(&self, product_id: &ProductId) -> Result<()> {
        self.state().deactivate_if_unused(product_id);
        Ok(())
    }
}

#[async_trait]
impl ProductShelf for MemoryStore {
    async fn add_product(&self, name: &str) -> Result<Product> {
        Ok(self.state().add_product(name))
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.state().products.clone())
    }
}

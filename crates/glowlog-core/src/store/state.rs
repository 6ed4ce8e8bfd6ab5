//! Document-shaped store state shared by the memory and JSON file backends.

use jiff::{civil::Date, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{
    error::{GlowError, Result},
    models::{
        CompletionRecord, CompletionStatus, NewCompletion, OrderUpdate, Product, ProductId,
        ProductStatus, RoutineStep, StepDraft, StepId, StepPatch, UserScope,
    },
};

/// Whole contents of a document store: one key per collection plus id
/// counters so that ids are never reused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    #[serde(default)]
    pub steps: Vec<RoutineStep>,
    #[serde(default)]
    pub completions: Vec<CompletionRecord>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    last_step_id: StepId,
    #[serde(default)]
    last_completion_id: u64,
}

impl StoreState {
    fn next_step_id(&mut self) -> StepId {
        let highest = self.steps.iter().map(|s| s.id).max().unwrap_or(0);
        self.last_step_id = self.last_step_id.max(highest) + 1;
        self.last_step_id
    }

    fn next_completion_id(&mut self) -> u64 {
        let highest = self.completions.iter().map(|c| c.id).max().unwrap_or(0);
        self.last_completion_id = self.last_completion_id.max(highest) + 1;
        self.last_completion_id
    }

    fn step_mut(&mut self, scope: &UserScope, id: StepId) -> Result<&mut RoutineStep> {
        self.steps
            .iter_mut()
            .find(|s| s.id == id && &s.user_id == scope)
            .ok_or(GlowError::StepNotFound { id })
    }

    pub fn list_steps(&self, scope: &UserScope) -> Vec<RoutineStep> {
        let mut steps: Vec<RoutineStep> = self
            .steps
            .iter()
            .filter(|s| &s.user_id == scope)
            .cloned()
            .collect();
        steps.sort_by_key(RoutineStep::sort_key);
        steps
    }

    pub fn insert_step(&mut self, scope: &UserScope, draft: &StepDraft, order: u32) -> RoutineStep {
        let now = Timestamp::now();
        let step = RoutineStep {
            id: self.next_step_id(),
            user_id: scope.clone(),
            name: draft.name.clone(),
            product_name: draft.product_name.clone(),
            category: draft.category,
            notes: draft.notes.clone(),
            time_of_day: draft.time_of_day,
            order,
            product_id: draft.product_id.clone(),
            schedule: draft.schedule.clone(),
            created_at: now,
            updated_at: now,
        };
        self.steps.push(step.clone());
        step
    }

    pub fn update_step(
        &mut self,
        scope: &UserScope,
        id: StepId,
        patch: &StepPatch,
    ) -> Result<RoutineStep> {
        let step = self.step_mut(scope, id)?;
        patch.apply_to(step, Timestamp::now());
        Ok(step.clone())
    }

    pub fn delete_step(&mut self, scope: &UserScope, id: StepId) -> Result<()> {
        let before = self.steps.len();
        self.steps.retain(|s| !(s.id == id && &s.user_id == scope));
        if self.steps.len() == before {
            return Err(GlowError::StepNotFound { id });
        }
        self.completions.retain(|c| c.step_id != id);
        Ok(())
    }

    pub fn update_orders(&mut self, scope: &UserScope, orders: &[OrderUpdate]) {
        let now = Timestamp::now();
        for update in orders {
            if let Ok(step) = self.step_mut(scope, update.id) {
                step.order = update.order;
                step.updated_at = now;
            }
        }
    }

    pub fn list_completions(&self, scope: &UserScope) -> Vec<CompletionRecord> {
        self.completions
            .iter()
            .filter(|c| &c.user_id == scope)
            .cloned()
            .collect()
    }

    pub fn insert_completion(
        &mut self,
        scope: &UserScope,
        record: &NewCompletion,
    ) -> Result<CompletionRecord> {
        if !self
            .steps
            .iter()
            .any(|s| s.id == record.step_id && &s.user_id == scope)
        {
            return Err(GlowError::StepNotFound { id: record.step_id });
        }
        self.delete_completion(scope, record.step_id, record.date);
        let stored = CompletionRecord {
            id: self.next_completion_id(),
            step_id: record.step_id,
            user_id: scope.clone(),
            date: record.date,
            status: record.status,
            product_used: match record.status {
                CompletionStatus::Completed => record.product_used.clone(),
                CompletionStatus::Skipped => None,
            },
            completed_at: record.completed_at,
        };
        self.completions.push(stored.clone());
        Ok(stored)
    }

    pub fn delete_completion(&mut self, scope: &UserScope, step_id: StepId, date: Date) {
        self.completions
            .retain(|c| !(c.step_id == step_id && c.date == date && &c.user_id == scope));
    }

    pub fn bulk_insert_completions(
        &mut self,
        scope: &UserScope,
        records: &[NewCompletion],
    ) -> Result<Vec<CompletionRecord>> {
        records
            .iter()
            .map(|record| self.insert_completion(scope, record))
            .collect()
    }

    fn product_mut(&mut self, product_id: &ProductId) -> Result<&mut Product> {
        self.products
            .iter_mut()
            .find(|p| &p.id == product_id)
            .ok_or_else(|| GlowError::ProductNotFound {
                id: product_id.clone(),
            })
    }

    /// Returns whether anything changed.
    pub fn activate(&mut self, product_id: &ProductId) -> Result<bool> {
        let product = self.product_mut(product_id)?;
        if product.status == ProductStatus::Active {
            return Ok(false);
        }
        product.status = ProductStatus::Active;
        product.updated_at = Timestamp::now();
        Ok(true)
    }

    /// Returns whether anything changed. Unknown products are ignored.
    pub fn deactivate_if_unused(&mut self, product_id: &ProductId) -> bool {
        let referenced = self
            .steps
            .iter()
            .any(|s| s.product_id.as_ref() == Some(product_id));
        if referenced {
            return false;
        }
        match self.product_mut(product_id) {
            Ok(product) if product.status == ProductStatus::Active => {
                product.status = ProductStatus::Shelf;
                product.updated_at = Timestamp::now();
                true
            }
            _ => false,
        }
    }

    pub fn add_product(&mut self, name: &str) -> Product {
        let now = Timestamp::now();
        let product = Product {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            status: ProductStatus::Shelf,
            created_at: now,
            updated_at: now,
        };
        self.products.push(product.clone());
        product
    }
}

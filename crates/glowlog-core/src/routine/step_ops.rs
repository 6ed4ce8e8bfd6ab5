//! Step operations for the Routine.

use super::Routine;
use crate::{
    error::Result,
    models::{OrderUpdate, RoutineStep, StepDraft, StepId, StepPatch},
};

impl Routine {
    /// Adds a step at the end of its time-of-day bucket.
    pub async fn add_step(&mut self, draft: StepDraft) -> Result<RoutineStep> {
        self.repository.add(draft).await
    }

    /// Applies a partial update. Fields left `None` in `patch` are untouched.
    pub async fn update_step(&mut self, id: StepId, patch: StepPatch) -> Result<RoutineStep> {
        self.repository.update(id, patch).await
    }

    /// Deletes a step together with all of its completion records.
    pub async fn delete_step(&mut self, id: StepId) -> Result<RoutineStep> {
        let removed = self.repository.delete(id).await?;
        self.ledger.remove_step(id);
        Ok(removed)
    }

    /// Reorders steps so that each listed id takes its index as order.
    ///
    /// Takes effect in memory at once; the store is written once the reorder
    /// burst settles, or on [`Self::flush_pending_reorder`].
    pub fn reorder_steps(&mut self, ids: &[StepId]) -> Vec<OrderUpdate> {
        self.repository.reorder(ids)
    }

    /// Writes a pending reorder now.
    pub async fn flush_pending_reorder(&self) -> Result<()> {
        self.repository.flush().await
    }
}

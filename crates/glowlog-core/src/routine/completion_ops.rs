//! Completion and skip operations for the Routine.

use jiff::civil::Date;
use log::debug;

use super::Routine;
use crate::{
    error::{GlowError, Result},
    ledger::LedgerChange,
    models::{CompletionRecord, Progress, StepId, TimeOfDay, TodayStep},
};

impl Routine {
    /// Steps due on `date` for the given part of the day (`None` for all),
    /// annotated with that day's record.
    pub fn today_steps(&self, time_of_day: Option<TimeOfDay>, date: Date) -> Vec<TodayStep> {
        self.repository.today_steps(&self.ledger, time_of_day, date)
    }

    /// Completed versus due steps on `date`.
    pub fn today_progress(&self, date: Date) -> Progress {
        self.repository.today_progress(&self.ledger, date)
    }

    /// Marks a step done on `date`, or clears the mark if it is already done.
    /// A skip on that day is replaced.
    ///
    /// `product_used` defaults to the step's product name. Returns the new
    /// record, or `None` when the toggle cleared the day.
    pub async fn toggle_step_completion(
        &mut self,
        step_id: StepId,
        date: Date,
        product_used: Option<String>,
    ) -> Result<Option<CompletionRecord>> {
        let step = self
            .repository
            .get(step_id)
            .ok_or(GlowError::StepNotFound { id: step_id })?;
        let product_used = product_used.or_else(|| step.product_name.clone());

        let change = self
            .ledger
            .plan_toggle_completion(step_id, date, product_used);
        self.apply_change(change).await
    }

    /// Marks a step skipped on `date`, or clears the skip if already skipped.
    pub async fn toggle_step_skip(
        &mut self,
        step_id: StepId,
        date: Date,
    ) -> Result<Option<CompletionRecord>> {
        if self.repository.get(step_id).is_none() {
            return Err(GlowError::StepNotFound { id: step_id });
        }

        let change = self.ledger.plan_toggle_skip(step_id, date);
        self.apply_change(change).await
    }

    /// Skips every step due on `date` in the given part of the day that has
    /// no record yet. Returns how many skips were written.
    pub async fn finish_routine(
        &mut self,
        time_of_day: Option<TimeOfDay>,
        date: Date,
    ) -> Result<usize> {
        let due: Vec<StepId> = self
            .repository
            .due_on(time_of_day, date)
            .map(|step| step.id)
            .collect();
        let skips = self.ledger.plan_bulk_skip(due, date);
        if skips.is_empty() {
            return Ok(0);
        }

        let stored = self
            .store
            .bulk_insert_completions(&self.scope, &skips)
            .await?;
        let count = stored.len();
        for record in stored {
            self.ledger.insert(record);
        }
        debug!("Finished routine for {date}: {count} steps skipped");
        Ok(count)
    }

    /// Persists a planned change, mirroring each confirmed write into the
    /// ledger.
    async fn apply_change(&mut self, change: LedgerChange) -> Result<Option<CompletionRecord>> {
        if change.remove.is_some() {
            self.store
                .delete_completion(&self.scope, change.step_id, change.date)
                .await?;
            self.ledger.remove(change.step_id, change.date);
        }

        if change.clears() {
            debug!("Cleared record for step {} on {}", change.step_id, change.date);
        }
        let Some(new) = change.insert else {
            return Ok(None);
        };
        let stored = self.store.insert_completion(&self.scope, &new).await?;
        self.ledger.insert(stored.clone());
        Ok(Some(stored))
    }
}

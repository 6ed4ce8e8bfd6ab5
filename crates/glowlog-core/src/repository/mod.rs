//! Ordered in-memory list of routine steps over the abstract store.
//!
//! Every mutation except reorder is confirmed by the store before the list
//! changes, so a failed write leaves memory matching storage. Reorders update
//! the list at once and reach the store through [`ReorderDebouncer`].

use std::{sync::Arc, time::Duration};

use jiff::civil::Date;
use log::debug;

use crate::{
    error::{GlowError, Result},
    ledger::CompletionLedger,
    models::{
        CompletionStatus, OrderUpdate, Progress, RoutineStep, StepDraft, StepId, StepPatch,
        TimeOfDay, TodayStep, UserScope,
    },
    reconcile::ProductReconciler,
    schedule::is_active_on_date,
    store::RoutineStore,
};

pub mod debounce;

pub use debounce::{ReorderDebouncer, DEFAULT_REORDER_DELAY};

/// Steps of one user scope, kept sorted by (`order`, `id`).
pub struct StepRepository {
    store: Arc<dyn RoutineStore>,
    scope: UserScope,
    steps: Vec<RoutineStep>,
    reconciler: ProductReconciler,
    reorder: ReorderDebouncer,
}

impl StepRepository {
    /// Creates an empty repository. Must be called inside a Tokio runtime,
    /// since it starts the reorder worker.
    pub fn new(
        store: Arc<dyn RoutineStore>,
        scope: UserScope,
        reconciler: ProductReconciler,
        reorder_delay: Duration,
    ) -> Self {
        let reorder = ReorderDebouncer::spawn(store.clone(), scope.clone(), reorder_delay);
        Self {
            store,
            scope,
            steps: Vec::new(),
            reconciler,
            reorder,
        }
    }

    pub fn scope(&self) -> &UserScope {
        &self.scope
    }

    /// Replaces the in-memory list with the store's contents.
    pub async fn load(&mut self) -> Result<()> {
        let steps = self.store.list_steps(&self.scope).await?;
        debug!("Loaded {} steps for {}", steps.len(), self.scope);
        self.replace_all(steps);
        Ok(())
    }

    fn replace_all(&mut self, mut steps: Vec<RoutineStep>) {
        steps.sort_by_key(RoutineStep::sort_key);
        self.steps = steps;
    }

    /// All steps in routine order.
    pub fn steps(&self) -> &[RoutineStep] {
        &self.steps
    }

    pub fn get(&self, id: StepId) -> Option<&RoutineStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Order assigned to a new step: the size of its time-of-day bucket, or
    /// the whole list for steps done morning and evening.
    pub fn next_order(&self, time_of_day: TimeOfDay) -> u32 {
        let count = match time_of_day {
            TimeOfDay::Both => self.steps.len(),
            bucket => self
                .steps
                .iter()
                .filter(|s| s.time_of_day == bucket)
                .count(),
        };
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Stores a new step at the end of its bucket.
    pub async fn add(&mut self, draft: StepDraft) -> Result<RoutineStep> {
        validate_name(&draft.name)?;

        let order = self.next_order(draft.time_of_day);
        let step = self.store.insert_step(&self.scope, &draft, order).await?;
        debug!("Added step {} at order {order}", step.id);

        self.steps.push(step.clone());
        self.steps.sort_by_key(RoutineStep::sort_key);
        self.reconciler.step_created(&step).await;
        Ok(step)
    }

    /// Merges `patch` into a step. The list is untouched when the id is
    /// unknown or the store rejects the change.
    pub async fn update(&mut self, id: StepId, patch: StepPatch) -> Result<RoutineStep> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        let previous_product = self
            .get(id)
            .ok_or(GlowError::StepNotFound { id })?
            .product_id
            .clone();

        let updated = self.store.update_step(&self.scope, id, &patch).await?;

        if let Some(slot) = self.steps.iter_mut().find(|s| s.id == id) {
            *slot = updated.clone();
        }
        self.steps.sort_by_key(RoutineStep::sort_key);

        if patch.product_id.is_some() {
            self.reconciler
                .step_updated(previous_product.as_ref(), &updated, &self.steps)
                .await;
        }
        Ok(updated)
    }

    /// Deletes a step. The store removes its completion records with it.
    pub async fn delete(&mut self, id: StepId) -> Result<RoutineStep> {
        if self.get(id).is_none() {
            return Err(GlowError::StepNotFound { id });
        }

        self.store.delete_step(&self.scope, id).await?;

        let position = self
            .steps
            .iter()
            .position(|s| s.id == id)
            .ok_or(GlowError::StepNotFound { id })?;
        let removed = self.steps.remove(position);
        debug!("Deleted step {id}");

        self.reconciler.step_deleted(&removed, &self.steps).await;
        Ok(removed)
    }

    /// Gives every listed step its index as `order`. Unknown ids are skipped.
    /// Unlisted steps keep their relative order and move after the listed
    /// ones.
    ///
    /// The list changes immediately and the returned snapshot covers every
    /// step, so a later batch replacing this one still carries its effect.
    /// The store is written after the quiet period unless [`Self::flush`] is
    /// called first.
    pub fn reorder(&mut self, ids: &[StepId]) -> Vec<OrderUpdate> {
        let mut listed = 0;
        for (index, &id) in ids.iter().enumerate() {
            let order = u32::try_from(index).unwrap_or(u32::MAX);
            if let Some(step) = self.steps.iter_mut().find(|s| s.id == id) {
                step.order = order;
                listed += 1;
            }
        }
        if listed == 0 {
            return Vec::new();
        }

        let mut next = u32::try_from(ids.len()).unwrap_or(u32::MAX);
        for step in self.steps.iter_mut().filter(|s| !ids.contains(&s.id)) {
            step.order = next;
            next = next.saturating_add(1);
        }
        self.steps.sort_by_key(RoutineStep::sort_key);

        let snapshot: Vec<_> = self
            .steps
            .iter()
            .map(|s| OrderUpdate {
                id: s.id,
                order: s.order,
            })
            .collect();
        self.reorder.schedule(snapshot.clone());
        snapshot
    }

    /// Writes a pending reorder now.
    pub async fn flush(&self) -> Result<()> {
        self.reorder.flush().await
    }

    /// Steps due on `date`, optionally limited to one time of day, with the
    /// day's completion state.
    pub fn today_steps(
        &self,
        ledger: &CompletionLedger,
        time_of_day: Option<TimeOfDay>,
        date: Date,
    ) -> Vec<TodayStep> {
        self.due_on(time_of_day, date)
            .map(|step| {
                let record = ledger.lookup(step.id, date);
                TodayStep {
                    step: step.clone(),
                    is_completed: record.is_some_and(|r| r.status == CompletionStatus::Completed),
                    is_skipped: record.is_some_and(|r| r.status == CompletionStatus::Skipped),
                    product_used: record.and_then(|r| r.product_used.clone()),
                }
            })
            .collect()
    }

    /// Completed versus due steps on `date` across the whole day.
    pub fn today_progress(&self, ledger: &CompletionLedger, date: Date) -> Progress {
        let today = self.today_steps(ledger, None, date);
        Progress {
            completed: today.iter().filter(|s| s.is_completed).count(),
            total: today.len(),
        }
    }

    /// Steps active on `date` that match `time_of_day` (`None` matches all).
    pub fn due_on(
        &self,
        time_of_day: Option<TimeOfDay>,
        date: Date,
    ) -> impl Iterator<Item = &RoutineStep> {
        self.steps.iter().filter(move |step| {
            time_of_day.map_or(true, |query| step.time_of_day.matches(query))
                && is_active_on_date(step, date)
        })
    }

    /// Writes any pending reorder and stops the worker.
    pub async fn shutdown(self) -> Result<()> {
        self.reorder.shutdown().await
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(GlowError::invalid_input("name").with_reason("must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;
    use crate::{
        models::NewCompletion,
        schedule::{DayOfWeek, Schedule},
        store::{CompletionStore, MemoryStore, ProductShelf, StepStore},
    };

    fn repository(store: &Arc<MemoryStore>) -> StepRepository {
        StepRepository::new(
            store.clone(),
            UserScope::local(),
            ProductReconciler::new(store.clone()),
            DEFAULT_REORDER_DELAY,
        )
    }

    fn draft(name: &str, time_of_day: TimeOfDay) -> StepDraft {
        StepDraft::new(name, time_of_day, Schedule::daily())
    }

    #[tokio::test]
    async fn test_add_assigns_order_per_bucket() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store);

        let cleanser = repo.add(draft("Cleanser", TimeOfDay::Morning)).await.unwrap();
        let retinol = repo.add(draft("Retinol", TimeOfDay::Evening)).await.unwrap();
        let spf = repo.add(draft("SPF", TimeOfDay::Morning)).await.unwrap();
        let balm = repo.add(draft("Lip balm", TimeOfDay::Both)).await.unwrap();

        assert_eq!(cleanser.order, 0);
        assert_eq!(retinol.order, 0);
        assert_eq!(spf.order, 1);
        assert_eq!(balm.order, 3);

        // Ties on order fall back to insertion.
        let names: Vec<_> = repo.steps().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Cleanser", "Retinol", "SPF", "Lip balm"]);
    }

    #[tokio::test]
    async fn test_add_rejects_blank_name() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store);

        let result = repo.add(draft("   ", TimeOfDay::Morning)).await;
        assert!(matches!(result, Err(GlowError::InvalidInput { .. })));
        assert!(repo.steps().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_step_leaves_list_untouched() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store);
        repo.add(draft("Toner", TimeOfDay::Morning)).await.unwrap();
        let before = repo.steps().to_vec();

        let patch = StepPatch {
            name: Some("Essence".into()),
            ..Default::default()
        };
        let result = repo.update(42, patch).await;

        assert!(matches!(result, Err(GlowError::StepNotFound { id: 42 })));
        assert_eq!(repo.steps(), before.as_slice());
    }

    #[tokio::test]
    async fn test_update_replaces_schedule_variant() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store);
        let step = repo
            .add(StepDraft::new(
                "Exfoliant",
                TimeOfDay::Evening,
                Schedule::weekly([DayOfWeek::Monday]),
            ))
            .await
            .unwrap();

        let patch = StepPatch {
            schedule: Some(Schedule::interval(3, date(2024, 1, 1))),
            ..Default::default()
        };
        let updated = repo.update(step.id, patch).await.unwrap();

        assert_eq!(updated.schedule, Schedule::interval(3, date(2024, 1, 1)));
        assert_eq!(repo.get(step.id).unwrap().schedule, updated.schedule);
    }

    #[tokio::test]
    async fn test_delete_cascades_completions_and_releases_product() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store);
        let product = store.add_product("Niacinamide 10%").await.unwrap();

        let step = repo
            .add(draft("Serum", TimeOfDay::Morning).with_product(product.id.clone()))
            .await
            .unwrap();
        let products = store.list_products().await.unwrap();
        assert_eq!(products[0].status, crate::models::ProductStatus::Active);

        store
            .insert_completion(
                repo.scope(),
                &NewCompletion::completed(step.id, date(2024, 3, 1), None),
            )
            .await
            .unwrap();

        let removed = repo.delete(step.id).await.unwrap();
        assert_eq!(removed.id, step.id);
        assert!(repo.steps().is_empty());
        assert!(store.list_completions(repo.scope()).await.unwrap().is_empty());

        let products = store.list_products().await.unwrap();
        assert_eq!(products[0].status, crate::models::ProductStatus::Shelf);
    }

    #[tokio::test]
    async fn test_delete_unknown_step() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store);

        assert!(matches!(
            repo.delete(9).await,
            Err(GlowError::StepNotFound { id: 9 })
        ));
    }

    #[tokio::test]
    async fn test_reorder_updates_memory_then_flushes() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store);
        let a = repo.add(draft("A", TimeOfDay::Morning)).await.unwrap();
        let b = repo.add(draft("B", TimeOfDay::Morning)).await.unwrap();
        let c = repo.add(draft("C", TimeOfDay::Morning)).await.unwrap();

        let updates = repo.reorder(&[c.id, a.id, 999, b.id]);
        assert_eq!(updates.len(), 3);

        let ids: Vec<_> = repo.steps().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![c.id, a.id, b.id]);

        repo.flush().await.unwrap();
        let stored: Vec<_> = store
            .list_steps(repo.scope())
            .await
            .unwrap()
            .iter()
            .map(|s| (s.id, s.order))
            .collect();
        assert_eq!(stored, vec![(c.id, 0), (a.id, 1), (b.id, 3)]);
    }

    async fn stored_orders(store: &MemoryStore) -> Vec<(StepId, u32)> {
        let mut stored: Vec<_> = store
            .list_steps(&UserScope::local())
            .await
            .unwrap()
            .iter()
            .map(|s| (s.id, s.order))
            .collect();
        stored.sort_unstable();
        stored
    }

    fn memory_orders(repo: &StepRepository) -> Vec<(StepId, u32)> {
        let mut orders: Vec<_> = repo.steps().iter().map(|s| (s.id, s.order)).collect();
        orders.sort_unstable();
        orders
    }

    #[tokio::test]
    async fn test_reorder_of_separate_buckets_keeps_both() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store);
        let m1 = repo.add(draft("M1", TimeOfDay::Morning)).await.unwrap();
        let m2 = repo.add(draft("M2", TimeOfDay::Morning)).await.unwrap();
        let e1 = repo.add(draft("E1", TimeOfDay::Evening)).await.unwrap();
        let e2 = repo.add(draft("E2", TimeOfDay::Evening)).await.unwrap();

        repo.reorder(&[m2.id, m1.id]);
        repo.reorder(&[e2.id, e1.id]);

        let ids: Vec<_> = repo.steps().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![e2.id, e1.id, m2.id, m1.id]);

        repo.flush().await.unwrap();
        assert_eq!(stored_orders(&store).await, memory_orders(&repo));

        let morning: Vec<_> = repo
            .due_on(Some(TimeOfDay::Morning), date(2024, 1, 1))
            .map(|s| s.id)
            .collect();
        assert_eq!(morning, vec![m2.id, m1.id]);
    }

    #[tokio::test]
    async fn test_partial_reorder_leaves_no_ties() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store);
        let a = repo.add(draft("A", TimeOfDay::Morning)).await.unwrap();
        let b = repo.add(draft("B", TimeOfDay::Morning)).await.unwrap();
        let c = repo.add(draft("C", TimeOfDay::Morning)).await.unwrap();

        let updates = repo.reorder(&[c.id]);
        assert_eq!(updates.len(), 3);

        let orders: Vec<_> = repo.steps().iter().map(|s| (s.id, s.order)).collect();
        assert_eq!(orders, vec![(c.id, 0), (a.id, 1), (b.id, 2)]);

        let expected = memory_orders(&repo);
        repo.shutdown().await.unwrap();
        assert_eq!(stored_orders(&store).await, expected);
    }

    #[tokio::test]
    async fn test_reorder_of_unknown_ids_is_noop() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store);
        repo.add(draft("A", TimeOfDay::Morning)).await.unwrap();

        assert!(repo.reorder(&[41, 42]).is_empty());
        assert_eq!(repo.steps()[0].order, 0);
    }

    #[tokio::test]
    async fn test_today_steps_filters_by_time_and_schedule() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store);
        let monday = date(2024, 1, 1);

        repo.add(draft("Cleanser", TimeOfDay::Morning)).await.unwrap();
        repo.add(draft("Balm", TimeOfDay::Both)).await.unwrap();
        repo.add(StepDraft::new(
            "Mask",
            TimeOfDay::Evening,
            Schedule::weekly([DayOfWeek::Sunday]),
        ))
        .await
        .unwrap();

        let ledger = CompletionLedger::new();
        let morning: Vec<_> = repo
            .today_steps(&ledger, Some(TimeOfDay::Morning), monday)
            .into_iter()
            .map(|t| t.step.name)
            .collect();
        assert_eq!(morning, vec!["Cleanser", "Balm"]);

        let evening = repo.today_steps(&ledger, Some(TimeOfDay::Evening), monday);
        assert_eq!(evening.len(), 1);

        let progress = repo.today_progress(&ledger, monday);
        assert_eq!(progress, Progress { completed: 0, total: 2 });
    }

    #[tokio::test]
    async fn test_shutdown_persists_pending_reorder() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store);
        let a = repo.add(draft("A", TimeOfDay::Evening)).await.unwrap();
        let b = repo.add(draft("B", TimeOfDay::Evening)).await.unwrap();

        repo.reorder(&[b.id, a.id]);
        repo.shutdown().await.unwrap();

        let stored = store.list_steps(&UserScope::local()).await.unwrap();
        assert_eq!(stored[0].id, b.id);
    }
}

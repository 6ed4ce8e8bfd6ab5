//! In-memory completion ledger.
//!
//! The ledger holds at most one [`CompletionRecord`] per (step, date). Its
//! toggle operations do not write anything themselves: they return a
//! [`LedgerChange`] describing which record to delete and which to insert, so
//! the caller can persist the change and then mirror each confirmed write back
//! into the ledger with [`CompletionLedger::remove`] and
//! [`CompletionLedger::insert`].

use std::collections::BTreeMap;

use jiff::civil::Date;

use crate::models::{CompletionRecord, CompletionStatus, NewCompletion, StepId};

/// Writes needed to move one (step, date) key to its next state.
///
/// Deletion always happens before insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerChange {
    pub step_id: StepId,
    pub date: Date,
    /// Existing record to delete, if any
    pub remove: Option<CompletionRecord>,
    /// Replacement record to insert, if any
    pub insert: Option<NewCompletion>,
}

impl LedgerChange {
    /// Whether applying the change leaves the key without a record.
    pub fn clears(&self) -> bool {
        self.insert.is_none()
    }
}

/// Set of completion records keyed by (step, date).
#[derive(Debug, Clone, Default)]
pub struct CompletionLedger {
    records: BTreeMap<(StepId, Date), CompletionRecord>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from stored records. Later duplicates of a key win.
    pub fn from_records(records: impl IntoIterator<Item = CompletionRecord>) -> Self {
        let mut ledger = Self::new();
        for record in records {
            ledger.insert(record);
        }
        ledger
    }

    /// The record for `step_id` on `date`, if any.
    pub fn lookup(&self, step_id: StepId, date: Date) -> Option<&CompletionRecord> {
        self.records.get(&(step_id, date))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in (step, date) order.
    pub fn records(&self) -> impl Iterator<Item = &CompletionRecord> {
        self.records.values()
    }

    /// Plans a completion toggle.
    ///
    /// An existing completed record is removed. Anything else for the key
    /// (such as a skip) is replaced by a completed record carrying
    /// `product_used`. Applying the plan twice restores the original state.
    pub fn plan_toggle_completion(
        &self,
        step_id: StepId,
        date: Date,
        product_used: Option<String>,
    ) -> LedgerChange {
        self.plan_toggle(step_id, date, CompletionStatus::Completed, || {
            NewCompletion::completed(step_id, date, product_used)
        })
    }

    /// Plans a skip toggle, symmetric to [`Self::plan_toggle_completion`].
    pub fn plan_toggle_skip(&self, step_id: StepId, date: Date) -> LedgerChange {
        self.plan_toggle(step_id, date, CompletionStatus::Skipped, || {
            NewCompletion::skipped(step_id, date)
        })
    }

    fn plan_toggle(
        &self,
        step_id: StepId,
        date: Date,
        target: CompletionStatus,
        make: impl FnOnce() -> NewCompletion,
    ) -> LedgerChange {
        let existing = self.lookup(step_id, date).cloned();
        let insert = match &existing {
            Some(record) if record.status == target => None,
            _ => Some(make()),
        };
        LedgerChange {
            step_id,
            date,
            remove: existing,
            insert,
        }
    }

    /// Plans skip records for every candidate step that has no record on
    /// `date`. Existing decisions are never overwritten.
    pub fn plan_bulk_skip(
        &self,
        candidates: impl IntoIterator<Item = StepId>,
        date: Date,
    ) -> Vec<NewCompletion> {
        let mut seen = std::collections::BTreeSet::new();
        candidates
            .into_iter()
            .filter(|id| seen.insert(*id))
            .filter(|id| self.lookup(*id, date).is_none())
            .map(|id| NewCompletion::skipped(id, date))
            .collect()
    }

    /// Stores a confirmed record, replacing anything under the same key.
    pub fn insert(&mut self, record: CompletionRecord) -> Option<CompletionRecord> {
        self.records.insert(record.key(), record)
    }

    /// Drops the record for a key after its deletion was confirmed.
    pub fn remove(&mut self, step_id: StepId, date: Date) -> Option<CompletionRecord> {
        self.records.remove(&(step_id, date))
    }

    /// Drops every record of a deleted step. Returns how many were removed.
    pub fn remove_step(&mut self, step_id: StepId) -> usize {
        let before = self.records.len();
        self.records.retain(|(id, _), _| *id != step_id);
        before - self.records.len()
    }
}

//! Remote-style relational backend on SQLite.
//!
//! Each call opens its own connection on a blocking worker thread, so the
//! store itself is just a path and can be shared freely between tasks.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jiff::civil::Date;
use log::debug;
use tokio::task;

use super::{CompletionStore, ProductService, ProductShelf, StepStore};
use crate::{
    db::Database,
    error::{GlowError, Result},
    models::{
        CompletionRecord, NewCompletion, OrderUpdate, Product, ProductId, RoutineStep, StepDraft,
        StepId, StepPatch, UserScope,
    },
};

/// Multi-user SQLite store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Opens (and if needed creates) the database at `path`, creating parent
    /// directories and applying schema migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let parent = parent.to_path_buf();
            task::spawn_blocking(move || {
                std::fs::create_dir_all(&parent).map_err(|e| GlowError::file_system(&parent, e))
            })
            .await
            .map_err(GlowError::join)??;
        }

        let store = Self { db_path };
        // Opening a connection creates the file and runs migrations.
        store.with_db(|_| Ok(())).await?;

        debug!("Opened SQLite store at {}", store.db_path.display());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    async fn with_db<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            op(&mut db)
        })
        .await
        .map_err(GlowError::join)?
    }
}

#[async_trait]
impl StepStore for SqliteStore {
    async fn list_steps(&self, scope: &UserScope) -> Result<Vec<RoutineStep>> {
        let scope = scope.clone();
        self.with_db(move |db| db.list_steps(&scope)).await
    }

    async fn insert_step(
        &self,
        scope: &UserScope,
        draft: &StepDraft,
        order: u32,
    ) -> Result<RoutineStep> {
        let scope = scope.clone();
        let draft = draft.clone();
        self.with_db(move |db| db.insert_step(&scope, &draft, order))
            .await
    }

    async fn update_step(
        &self,
        scope: &UserScope,
        id: StepId,
        patch: &StepPatch,
    ) -> Result<RoutineStep> {
        let scope = scope.clone();
        let patch = patch.clone();
        self.with_db(move |db| db.update_step(&scope, id, &patch))
            .await
    }

    async fn delete_step(&self, scope: &UserScope, id: StepId) -> Result<()> {
        let scope = scope.clone();
        self.with_db(move |db| db.delete_step(&scope, id)).await
    }

    async fn update_orders(&self, scope: &UserScope, orders: &[OrderUpdate]) -> Result<()> {
        debug!("Writing {} step positions", orders.len());
        let scope = scope.clone();
        let orders = orders.to_vec();
        self.with_db(move |db| db.update_orders(&scope, &orders))
            .await
    }
}

#[async_trait]
impl CompletionStore for SqliteStore {
    async fn list_completions(&self, scope: &UserScope) -> Result<Vec<CompletionRecord>> {
        let scope = scope.clone();
        self.with_db(move |db| db.list_completions(&scope)).await
    }

    async fn insert_completion(
        &self,
        scope: &UserScope,
        record: &NewCompletion,
    ) -> Result<CompletionRecord> {
        let scope = scope.clone();
        let record = record.clone();
        self.with_db(move |db| db.insert_completion(&scope, &record))
            .await
    }

    async fn delete_completion(
        &self,
        scope: &UserScope,
        step_id: StepId,
        date: Date,
    ) -> Result<()> {
        let scope = scope.clone();
        self.with_db(move |db| db.delete_completion(&scope, step_id, date))
            .await
    }

    async fn bulk_insert_completions(
        &self,
        scope: &UserScope,
        records: &[NewCompletion],
    ) -> Result<Vec<CompletionRecord>> {
        let scope = scope.clone();
        let records = records.to_vec();
        self.with_db(move |db| db.bulk_insert_completions(&scope, &records))
            .await
    }
}

#[async_trait]
impl ProductService for SqliteStore {
    async fn activate(&self, product_id: &ProductId) -> Result<()> {
        let product_id = product_id.clone();
        self.with_db(move |db| db.activate_product(&product_id))
            .await
    }

    async fn deactivate_if_unused(&self, product_id: &ProductId) -> Result<()> {
        let product_id = product_id.clone();
        let changed = self
            .with_db(move |db| db.deactivate_product_if_unused(&product_id))
            .await?;
        if changed {
            debug!("Product moved back to the shelf");
        }
        Ok(())
    }
}

#[async_trait]
impl ProductShelf for SqliteStore {
    async fn add_product(&self, name: &str) -> Result<Product> {
        let name = name.to_string();
        self.with_db(move |db| db.add_product(&name)).await
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        self.with_db(|db| db.list_products()).await
    }
}

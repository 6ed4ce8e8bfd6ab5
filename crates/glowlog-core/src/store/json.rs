//! On-device key-value backend: a single JSON document on disk.
//!
//! The document has one key per collection (`steps`, `completions`,
//! `products`). Every mutation is applied to a copy of the document, written
//! to a temporary file and renamed over the original; only then does the
//! in-process copy change, so a failed write leaves both untouched.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jiff::civil::Date;
use log::debug;
use tokio::{sync::Mutex, task};

use super::{state::StoreState, CompletionStore, ProductService, ProductShelf, StepStore};
use crate::{
    error::{GlowError, Result},
    models::{
        CompletionRecord, NewCompletion, OrderUpdate, Product, ProductId, RoutineStep, StepDraft,
        StepId, StepPatch, UserScope,
    },
};

/// Single-file document store for the local user.
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileStore {
    /// Opens the document at `path`, creating parent directories. A missing
    /// file is treated as an empty document.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let load_path = path.clone();

        let state = task::spawn_blocking(move || -> Result<StoreState> {
            if let Some(parent) = load_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| GlowError::file_system(parent, e))?;
            }
            match std::fs::read(&load_path) {
                Ok(bytes) if bytes.is_empty() => Ok(StoreState::default()),
                Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreState::default()),
                Err(e) => Err(GlowError::file_system(&load_path, e)),
            }
        })
        .await
        .map_err(GlowError::join)??;

        debug!("Opened JSON store at {}", path.display());
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `op` against a copy of the document, persists the copy and only
    /// then makes it current.
    async fn mutate<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut StoreState) -> Result<T> + Send,
    {
        let mut current = self.state.lock().await;
        let mut next = current.clone();
        let out = op(&mut next)?;

        let bytes = serde_json::to_vec_pretty(&next)?;
        let path = self.path.clone();
        task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(GlowError::join)??;

        *current = next;
        Ok(out)
    }

    async fn read<T: Send>(&self, op: impl FnOnce(&StoreState) -> T + Send) -> T {
        let state = self.state.lock().await;
        op(&state)
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, bytes).map_err(|e| GlowError::file_system(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| GlowError::file_system(path, e))
}

#[async_trait]
impl StepStore for JsonFileStore {
    async fn list_steps(&self, scope: &UserScope) -> Result<Vec<RoutineStep>> {
        Ok(self.read(|s| s.list_steps(scope)).await)
    }

    async fn insert_step(
        &self,
        scope: &UserScope,
        draft: &StepDraft,
        order: u32,
    ) -> Result<RoutineStep> {
        self.mutate(|s| Ok(s.insert_step(scope, draft, order)))
            .await
    }

    async fn update_step(
        &self,
        scope: &UserScope,
        id: StepId,
        patch: &StepPatch,
    ) -> Result<RoutineStep> {
        self.mutate(|s| s.update_step(scope, id, patch)).await
    }

    async fn delete_step(&self, scope: &UserScope, id: StepId) -> Result<()> {
        self.mutate(|s| s.delete_step(scope, id)).await
    }

    async fn update_orders(&self, scope: &UserScope, orders: &[OrderUpdate]) -> Result<()> {
        debug!("Writing {} step positions", orders.len());
        self.mutate(|s| {
            s.update_orders(scope, orders);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl CompletionStore for JsonFileStore {
    async fn list_completions(&self, scope: &UserScope) -> Result<Vec<CompletionRecord>> {
        Ok(self.read(|s| s.list_completions(scope)).await)
    }

    async fn insert_completion(
        &self,
        scope: &UserScope,
        record: &NewCompletion,
    ) -> Result<CompletionRecord> {
        self.mutate(|s| s.insert_completion(scope, record)).await
    }

    async fn delete_completion(
        &self,
        scope: &UserScope,
        step_id: StepId,
        date: Date,
    ) -> Result<()> {
        self.mutate(|s| {
            s.delete_completion(scope, step_id, date);
            Ok(())
        })
        .await
    }

    async fn bulk_insert_completions(
        &self,
        scope: &UserScope,
        records: &[NewCompletion],
    ) -> Result<Vec<CompletionRecord>> {
        self.mutate(|s| s.bulk_insert_completions(scope, records))
            .await
    }
}

#[async_trait]
impl ProductService for JsonFileStore {
    async fn activate(&self, product_id: &ProductId) -> Result<()> {
        self.mutate(|s| s.activate(product_id).map(|_| ())).await
    }

    async fn deactivate_if_unused(&self, product_id: &ProductId) -> Result<()> {
        self.mutate(|s| {
            s.deactivate_if_unused(product_id);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ProductShelf for JsonFileStore {
    async fn add_product(&self, name: &str) -> Result<Product> {
        self.mutate(|s| Ok(s.add_product(name))).await
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.read(|s| s.products.clone()).await)
    }
}

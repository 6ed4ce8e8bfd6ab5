//! Builder for creating and configuring Routine instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use log::{debug, info};

use super::Routine;
use crate::{
    error::{GlowError, Result},
    models::UserScope,
    repository::DEFAULT_REORDER_DELAY,
    store::{
        JsonFileStore, MemoryStore, ProductService, RoutineStore, SqliteStore, StoreBackend,
    },
};

/// File name of the default SQLite database.
pub const DEFAULT_DATABASE_FILE: &str = "glowlog.db";

/// File name of the default on-device document.
pub const DEFAULT_DOCUMENT_FILE: &str = "glowlog.json";

/// Builder for creating and configuring Routine instances.
#[derive(Clone)]
pub struct RoutineBuilder {
    database_path: Option<PathBuf>,
    backend: Option<StoreBackend>,
    scope: Option<UserScope>,
    reorder_delay: Duration,
    product_service: Option<Arc<dyn ProductService>>,
}

impl RoutineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
            backend: None,
            scope: None,
            reorder_delay: DEFAULT_REORDER_DELAY,
            product_service: None,
        }
    }

    /// Sets a custom SQLite database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/glowlog/glowlog.db` or `~/.local/share/glowlog/glowlog.db`.
    /// Ignored when an explicit backend is set with [`Self::with_backend`].
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Selects the storage backend for the session.
    pub fn with_backend(mut self, backend: StoreBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the user scope. JSON file and memory backends always use the
    /// local scope.
    pub fn with_scope(mut self, scope: UserScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Sets the quiet period before a reorder is written.
    pub fn with_reorder_delay(mut self, delay: Duration) -> Self {
        self.reorder_delay = delay;
        self
    }

    /// Uses an external product catalog instead of the store's shelf for
    /// activation and deactivation.
    pub fn with_product_service(mut self, service: Arc<dyn ProductService>) -> Self {
        self.product_service = Some(service);
        self
    }

    /// Builds the routine and loads its steps and records.
    ///
    /// # Errors
    ///
    /// Returns `GlowError::XdgDirectory` if no default path can be resolved
    /// Returns `GlowError::FileSystem` if the storage location is unusable
    /// Returns `GlowError::Database` if database initialization fails
    pub async fn build(self) -> Result<Routine> {
        let backend = match self.backend {
            Some(backend) => backend,
            None => StoreBackend::Sqlite {
                path: match self.database_path {
                    Some(path) => path,
                    None => Self::default_data_path(DEFAULT_DATABASE_FILE)?,
                },
            },
        };

        let scope = if backend.is_local_only() {
            if self.scope.as_ref().is_some_and(|s| s.as_str() != UserScope::LOCAL) {
                debug!("Backend is local-only; using the local scope");
            }
            UserScope::local()
        } else {
            self.scope.unwrap_or_default()
        };

        let (store, shelf): (Arc<dyn RoutineStore>, Arc<dyn ProductService>) = match &backend {
            StoreBackend::Sqlite { path } => {
                let store = Arc::new(SqliteStore::open(path).await?);
                (store.clone(), store)
            }
            StoreBackend::JsonFile { path } => {
                let store = Arc::new(JsonFileStore::open(path).await?);
                (store.clone(), store)
            }
            StoreBackend::Memory => {
                let store = Arc::new(MemoryStore::new());
                (store.clone(), store)
            }
        };
        let products = self.product_service.unwrap_or(shelf);

        info!("Opening routine for {scope} with {backend:?}");
        let mut routine = Routine::new(store, backend, scope, products, self.reorder_delay);
        routine.reload().await?;
        Ok(routine)
    }

    /// Returns the default path of a data file following XDG Base Directory
    /// specification, creating the directory if needed.
    pub fn default_data_path(file_name: &str) -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("glowlog")
            .place_data_file(file_name)
            .map_err(|e| GlowError::XdgDirectory(e.to_string()))
    }
}

impl Default for RoutineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

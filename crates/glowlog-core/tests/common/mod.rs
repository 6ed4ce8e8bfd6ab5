use glowlog_core::{Routine, RoutineBuilder, StoreBackend};
use tempfile::TempDir;

/// Every backend a routine can run on, rooted in `temp_dir`.
pub fn backends(temp_dir: &TempDir) -> Vec<StoreBackend> {
    vec![
        StoreBackend::Sqlite {
            path: temp_dir.path().join("test.db"),
        },
        StoreBackend::JsonFile {
            path: temp_dir.path().join("test.json"),
        },
        StoreBackend::Memory,
    ]
}

/// Helper function to create a test routine on the given backend
pub async fn create_test_routine(backend: StoreBackend) -> Routine {
    RoutineBuilder::new()
        .with_backend(backend)
        .build()
        .await
        .expect("Failed to create routine")
}

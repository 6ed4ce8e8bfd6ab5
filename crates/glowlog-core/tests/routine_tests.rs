mod common;

use std::time::Duration;

use common::{backends, create_test_routine};
use glowlog_core::{
    CompletionStatus, DayOfWeek, GlowError, Product, ProductStatus, Routine, RoutineBuilder,
    Schedule, StepDraft, StepId, StepPatch, StoreBackend, TimeOfDay, UserScope,
};
use jiff::civil::date;
use tempfile::TempDir;

#[tokio::test]
async fn test_schedule_examples_on_every_backend() {
    let temp_dir = TempDir::new().unwrap();

    for backend in backends(&temp_dir) {
        let mut routine = create_test_routine(backend.clone()).await;
        let start = date(2024, 1, 1);
        let cycle = routine
            .add_step(StepDraft::new(
                "Retinoid",
                TimeOfDay::Evening,
                Schedule::cycle(4, [1, 2], start),
            ))
            .await
            .unwrap();
        let interval = routine
            .add_step(StepDraft::new(
                "Peel",
                TimeOfDay::Evening,
                Schedule::interval(3, start),
            ))
            .await
            .unwrap();

        let due_days = |id| {
            routine
                .upcoming(start, 10)
                .into_iter()
                .filter(|day| day.step_ids().contains(&id))
                .map(|day| day.date.day())
                .collect::<Vec<_>>()
        };
        assert_eq!(due_days(cycle.id), vec![1, 2, 5, 6, 9, 10], "{backend:?}");
        assert_eq!(due_days(interval.id), vec![1, 4, 7, 10], "{backend:?}");

        routine.shutdown().await.unwrap();
    }
}

#[tokio::test]
async fn test_completion_toggles_on_every_backend() {
    let temp_dir = TempDir::new().unwrap();
    let day = date(2024, 3, 15);

    for backend in backends(&temp_dir) {
        let mut routine = create_test_routine(backend.clone()).await;
        let step = routine
            .add_step(StepDraft::new("Cleanser", TimeOfDay::Morning, Schedule::daily()))
            .await
            .unwrap();

        routine.toggle_step_skip(step.id, day).await.unwrap();
        routine
            .toggle_step_completion(step.id, day, None)
            .await
            .unwrap();
        assert_eq!(
            routine.completion(step.id, day).map(|r| r.status),
            Some(CompletionStatus::Completed),
            "{backend:?}"
        );

        // Reload from the store: still exactly one record.
        routine.reload().await.unwrap();
        let today = routine.today_steps(Some(TimeOfDay::Morning), day);
        assert_eq!(today.len(), 1);
        assert!(today[0].is_completed && !today[0].is_skipped);

        routine
            .toggle_step_completion(step.id, day, None)
            .await
            .unwrap();
        routine.reload().await.unwrap();
        assert!(routine.completion(step.id, day).is_none(), "{backend:?}");

        routine.shutdown().await.unwrap();
    }
}

#[tokio::test]
async fn test_state_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let day = date(2024, 3, 15);

    for backend in backends(&temp_dir) {
        if backend == StoreBackend::Memory {
            continue;
        }

        let mut routine = create_test_routine(backend.clone()).await;
        let a = routine
            .add_step(StepDraft::new("A", TimeOfDay::Evening, Schedule::daily()))
            .await
            .unwrap();
        let b = routine
            .add_step(StepDraft::new("B", TimeOfDay::Evening, Schedule::daily()))
            .await
            .unwrap();
        routine.toggle_step_skip(a.id, day).await.unwrap();
        routine.reorder_steps(&[b.id, a.id]);
        routine.shutdown().await.unwrap();

        let routine = create_test_routine(backend.clone()).await;
        let ids: Vec<_> = routine.steps().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![b.id, a.id], "{backend:?}");
        assert!(routine.completion(a.id, day).unwrap().is_skipped());
        routine.shutdown().await.unwrap();
    }
}

#[tokio::test]
async fn test_rapid_reorders_persist_final_order() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("reorder.db");
    let mut routine = RoutineBuilder::new()
        .with_database_path(Some(&path))
        .with_reorder_delay(Duration::from_millis(50))
        .build()
        .await
        .unwrap();

    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let step = routine
            .add_step(StepDraft::new(name, TimeOfDay::Morning, Schedule::daily()))
            .await
            .unwrap();
        ids.push(step.id);
    }

    routine.reorder_steps(&[ids[1], ids[0], ids[2]]);
    routine.reorder_steps(&[ids[2], ids[1], ids[0]]);
    tokio::time::sleep(Duration::from_millis(300)).await;

    let reopened = RoutineBuilder::new()
        .with_database_path(Some(&path))
        .build()
        .await
        .unwrap();
    let stored: Vec<_> = reopened.steps().iter().map(|s| s.id).collect();
    assert_eq!(stored, vec![ids[2], ids[1], ids[0]]);

    reopened.shutdown().await.unwrap();
    routine.shutdown().await.unwrap();
}

fn orders(routine: &Routine) -> Vec<(StepId, u32)> {
    let mut orders: Vec<_> = routine.steps().iter().map(|s| (s.id, s.order)).collect();
    orders.sort_unstable();
    orders
}

#[tokio::test]
async fn test_bucket_reorders_in_one_window_all_persist() {
    let temp_dir = TempDir::new().unwrap();

    for backend in backends(&temp_dir) {
        if backend == StoreBackend::Memory {
            continue;
        }

        let mut routine = create_test_routine(backend.clone()).await;
        let mut ids = Vec::new();
        for (name, time_of_day) in [
            ("M1", TimeOfDay::Morning),
            ("M2", TimeOfDay::Morning),
            ("E1", TimeOfDay::Evening),
            ("E2", TimeOfDay::Evening),
        ] {
            let step = routine
                .add_step(StepDraft::new(name, time_of_day, Schedule::daily()))
                .await
                .unwrap();
            ids.push(step.id);
        }

        routine.reorder_steps(&[ids[1], ids[0]]);
        routine.reorder_steps(&[ids[3], ids[2]]);
        routine.flush_pending_reorder().await.unwrap();

        let reopened = create_test_routine(backend.clone()).await;
        assert_eq!(orders(&reopened), orders(&routine), "{backend:?}");
        reopened.shutdown().await.unwrap();

        routine.reorder_steps(&[ids[0], ids[1]]);
        routine.reorder_steps(&[ids[2]]);
        let expected = orders(&routine);
        routine.shutdown().await.unwrap();

        let reopened = create_test_routine(backend.clone()).await;
        assert_eq!(orders(&reopened), expected, "{backend:?}");
        let names: Vec<_> = reopened.steps().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["E1", "M1", "M2", "E2"], "{backend:?}");
        reopened.shutdown().await.unwrap();
    }
}

#[tokio::test]
async fn test_failed_write_leaves_memory_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("device");
    let mut routine = create_test_routine(StoreBackend::JsonFile {
        path: dir.join("glowlog.json"),
    })
    .await;
    let step = routine
        .add_step(StepDraft::new("Toner", TimeOfDay::Morning, Schedule::daily()))
        .await
        .unwrap();
    let day = date(2024, 8, 1);

    std::fs::remove_dir_all(&dir).unwrap();

    let result = routine.toggle_step_completion(step.id, day, None).await;
    assert!(matches!(result, Err(GlowError::FileSystem { .. })));
    assert!(routine.completion(step.id, day).is_none());

    let result = routine
        .update_step(
            step.id,
            StepPatch {
                name: Some("Essence".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(result.is_err());
    assert_eq!(routine.step(step.id).unwrap().name, "Toner");
}

fn status(products: &[Product], id: &str) -> ProductStatus {
    products
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.status)
        .expect("product should exist")
}

#[tokio::test]
async fn test_product_links_are_reconciled() {
    let temp_dir = TempDir::new().unwrap();

    for backend in backends(&temp_dir) {
        let mut routine = create_test_routine(backend.clone()).await;
        let serum = routine.add_product("Niacinamide").await.unwrap();
        let cream = routine.add_product("Ceramide cream").await.unwrap();

        let morning = routine
            .add_step(
                StepDraft::new("Serum", TimeOfDay::Morning, Schedule::daily())
                    .with_product(serum.id.clone()),
            )
            .await
            .unwrap();
        let evening = routine
            .add_step(
                StepDraft::new("Serum", TimeOfDay::Evening, Schedule::daily())
                    .with_product(serum.id.clone()),
            )
            .await
            .unwrap();
        let products = routine.products().await.unwrap();
        assert_eq!(status(&products, &serum.id), ProductStatus::Active);

        // Another step still uses the serum.
        routine.delete_step(morning.id).await.unwrap();
        let products = routine.products().await.unwrap();
        assert_eq!(status(&products, &serum.id), ProductStatus::Active, "{backend:?}");

        // Relinking moves the serum back to the shelf and activates the cream.
        routine
            .update_step(
                evening.id,
                StepPatch {
                    product_id: Some(Some(cream.id.clone())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let products = routine.products().await.unwrap();
        assert_eq!(status(&products, &serum.id), ProductStatus::Shelf, "{backend:?}");
        assert_eq!(status(&products, &cream.id), ProductStatus::Active, "{backend:?}");

        // Clearing the link releases the cream.
        routine
            .update_step(
                evening.id,
                StepPatch {
                    product_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let products = routine.products().await.unwrap();
        assert_eq!(status(&products, &cream.id), ProductStatus::Shelf, "{backend:?}");

        routine.shutdown().await.unwrap();
    }
}

#[tokio::test]
async fn test_unknown_product_does_not_block_step() {
    let mut routine = create_test_routine(StoreBackend::Memory).await;

    let step = routine
        .add_step(
            StepDraft::new("Mask", TimeOfDay::Evening, Schedule::weekly([DayOfWeek::Sunday]))
                .with_product("not-in-catalog"),
        )
        .await
        .expect("reconciliation failures are not fatal");

    assert_eq!(routine.step(step.id).unwrap().product_id.as_deref(), Some("not-in-catalog"));
}

#[tokio::test]
async fn test_sqlite_scopes_do_not_mix() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shared.db");
    let open = |user: &str| {
        RoutineBuilder::new()
            .with_database_path(Some(&path))
            .with_scope(UserScope::new(user))
            .build()
    };

    let mut alice = open("alice").await.unwrap();
    alice
        .add_step(StepDraft::new("Cleanser", TimeOfDay::Morning, Schedule::daily()))
        .await
        .unwrap();
    alice.shutdown().await.unwrap();

    let bob = open("bob").await.unwrap();
    assert!(bob.steps().is_empty());
    assert_eq!(bob.scope().as_str(), "bob");
    bob.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_finish_routine_then_progress() {
    let mut routine = create_test_routine(StoreBackend::Memory).await;
    let day = date(2024, 1, 5); // Friday
    let cleanser = routine
        .add_step(StepDraft::new("Cleanser", TimeOfDay::Morning, Schedule::daily()))
        .await
        .unwrap();
    routine
        .add_step(StepDraft::new("SPF", TimeOfDay::Morning, Schedule::daily()))
        .await
        .unwrap();
    routine
        .add_step(StepDraft::new(
            "Exfoliant",
            TimeOfDay::Evening,
            Schedule::weekly([DayOfWeek::Friday]),
        ))
        .await
        .unwrap();

    routine
        .toggle_step_completion(cleanser.id, day, None)
        .await
        .unwrap();
    let skipped = routine
        .finish_routine(Some(TimeOfDay::Morning), day)
        .await
        .unwrap();
    assert_eq!(skipped, 1);

    let progress = routine.today_progress(day);
    assert_eq!(progress.completed, 1);
    assert_eq!(progress.total, 3);
    assert!(!progress.is_complete());

    assert_eq!(routine.finish_routine(None, day).await.unwrap(), 1);
}

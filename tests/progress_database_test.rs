// ABOUTME: Integration tests for workout session logging and plan-linked queries
// ABOUTME: Covers session CRUD and the single-day vs multi-day progress splits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use common::{create_test_db, seed_client, seed_trainer};
use smartgains_server::database::plans::{PlanKind, PlansManager};
use smartgains_server::database::progress::{
    CreateSessionRequest, ProgressManager, UpdateSessionRequest,
};

fn session(client_id: i64) -> CreateSessionRequest {
    CreateSessionRequest {
        client_id,
        name: Some("Morning Session".to_owned()),
        date: "2025-06-01".to_owned(),
        workout_type: "Strength Training".to_owned(),
        duration_minutes: 60,
        exercises_log: "Squats 3x8\nBench 3x5".to_owned(),
        intensity_level: "moderate".to_owned(),
        location: "Local Gym".to_owned(),
        workout_rating: 8,
        trainer_notes: Some("Solid work".to_owned()),
        workout_source: "manual".to_owned(),
        generated_plan_id: None,
        demo_plan_id: None,
        day_index: None,
    }
}

#[tokio::test]
async fn test_create_get_update_delete_session() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let client_id = seed_client(&db, trainer_id, "Alex").await;
    let manager = ProgressManager::new(db.pool().clone());

    let created = manager.create(&session(client_id)).await.unwrap();
    assert_eq!(created.workout_source, "manual");

    let fetched = manager.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.client_first_name.as_deref(), Some("Alex"));
    assert_eq!(fetched.workout_rating, 8);

    let updated = manager
        .update(
            created.id,
            &UpdateSessionRequest {
                name: Some("Morning Session".to_owned()),
                date: "2025-06-02".to_owned(),
                workout_type: "Hypertrophy".to_owned(),
                duration_minutes: 75,
                exercises_log: "Squats 4x10".to_owned(),
                intensity_level: "high".to_owned(),
                location: "Home Gym".to_owned(),
                workout_rating: 9,
                trainer_notes: None,
            },
        )
        .await
        .unwrap();
    assert!(updated);

    let after = manager.get(created.id).await.unwrap().unwrap();
    assert_eq!(after.workout_type, "Hypertrophy");
    assert_eq!(after.duration_minutes, 75);

    assert!(manager.delete(created.id).await.unwrap());
    assert!(manager.get(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_missing_session_reports_false() {
    let db = create_test_db().await;
    let manager = ProgressManager::new(db.pool().clone());

    let updated = manager
        .update(
            999,
            &UpdateSessionRequest {
                name: None,
                date: "2025-06-02".to_owned(),
                workout_type: "Cardio".to_owned(),
                duration_minutes: 30,
                exercises_log: "Run 5k".to_owned(),
                intensity_level: "low".to_owned(),
                location: "Park".to_owned(),
                workout_rating: 6,
                trainer_notes: None,
            },
        )
        .await
        .unwrap();
    assert!(!updated);
}

#[tokio::test]
async fn test_plan_linked_progress_splits() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let client_id = seed_client(&db, trainer_id, "Alex").await;
    let plans = PlansManager::new(db.pool().clone());
    let progress = ProgressManager::new(db.pool().clone());

    let generated = plans
        .create(PlanKind::Generated, client_id, "Custom", "## Day 1\n## Day 2\n")
        .await
        .unwrap();
    let demo = plans
        .create(PlanKind::Demo, client_id, "Demo (Quick)", "## Day 1\n")
        .await
        .unwrap();

    // Single-day generated completion: plan link, no day index
    progress
        .create(&CreateSessionRequest {
            generated_plan_id: Some(generated.id),
            ..session(client_id)
        })
        .await
        .unwrap();

    // Multi-day completions: plan link plus day index
    progress
        .create(&CreateSessionRequest {
            generated_plan_id: Some(generated.id),
            day_index: Some(1),
            ..session(client_id)
        })
        .await
        .unwrap();
    progress
        .create(&CreateSessionRequest {
            demo_plan_id: Some(demo.id),
            day_index: Some(1),
            ..session(client_id)
        })
        .await
        .unwrap();

    let single = progress.single_day_generated_progress(client_id).await.unwrap();
    assert_eq!(single.len(), 1);
    assert!(single[0].day_index.is_none());

    let multi = progress.multi_day_plans_progress(client_id).await.unwrap();
    assert_eq!(multi.len(), 2);

    let by_generated = progress
        .list_by_plan(PlanKind::Generated, generated.id)
        .await
        .unwrap();
    assert_eq!(by_generated.len(), 2);

    let by_demo = progress.list_by_plan(PlanKind::Demo, demo.id).await.unwrap();
    assert_eq!(by_demo.len(), 1);
    assert_eq!(by_demo[0].client_first_name.as_deref(), Some("Alex"));
}

// ABOUTME: Integration tests for nutrition profiles and client assessments
// ABOUTME: Covers profile upserts, TDEE updates, and prompt-shaped assessment findings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use common::{create_test_db, seed_client, seed_trainer};
use smartgains_server::database::assessments::AssessmentsManager;
use smartgains_server::database::nutrition::{NutritionManager, UpsertNutritionProfileRequest};
use smartgains_server::plans::format_assessment_findings;

fn profile_request(weight: f64) -> UpsertNutritionProfileRequest {
    UpsertNutritionProfileRequest {
        height: Some(172.0),
        weight: Some(weight),
        dob: Some("1994-03-12".to_owned()),
        gender: Some("female".to_owned()),
        bodyfat_est: Some(24.0),
        health_conditions: Some("none".to_owned()),
        allergies: Some("peanuts".to_owned()),
        dietary_preferences: Some("vegetarian".to_owned()),
        activity_level_neat: Some("moderate".to_owned()),
        activity_level_eat: Some("light".to_owned()),
        exercise_days_per_week: Some(4),
        gym_duration: Some("60min".to_owned()),
    }
}

#[tokio::test]
async fn test_nutrition_profile_upsert_is_one_per_client() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let client_id = seed_client(&db, trainer_id, "Alex").await;
    let manager = NutritionManager::new(db.pool().clone());

    let first = manager.upsert(client_id, &profile_request(68.0)).await.unwrap();
    let second = manager.upsert(client_id, &profile_request(66.5)).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.weight, Some(66.5));

    let fetched = manager.get_by_client(client_id).await.unwrap().unwrap();
    assert_eq!(fetched.weight, Some(66.5));
    assert!(fetched.normal_tdee.is_none());
}

#[tokio::test]
async fn test_tdee_update_requires_profile() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let client_id = seed_client(&db, trainer_id, "Alex").await;
    let manager = NutritionManager::new(db.pool().clone());

    // No profile yet
    assert!(!manager.update_tdee(client_id, 2100.0, 2250.0).await.unwrap());

    manager.upsert(client_id, &profile_request(68.0)).await.unwrap();
    assert!(manager.update_tdee(client_id, 2100.0, 2250.0).await.unwrap());

    let profile = manager.get_by_client(client_id).await.unwrap().unwrap();
    assert_eq!(profile.normal_tdee, Some(2100.0));
    assert_eq!(profile.average_tdee, Some(2250.0));
}

#[tokio::test]
async fn test_assessment_findings_feed_prompt() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let client_id = seed_client(&db, trainer_id, "Alex").await;
    let manager = AssessmentsManager::new(db.pool().clone());

    let flexibility = manager
        .create_global("Flexibility", Some("mobility"))
        .await
        .unwrap();
    manager
        .save_client_assessment(
            client_id,
            flexibility.id,
            &serde_json::json!({ "sit_and_reach_cm": 12, "notes": "tight hamstrings" }),
        )
        .await
        .unwrap();

    let submissions = manager.list_by_client(client_id).await.unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].assessment_id, flexibility.id);

    let findings = manager.findings_for_client(client_id).await.unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].assessment_name, "Flexibility");

    let rendered = format_assessment_findings(&findings);
    assert!(rendered.contains("- Flexibility: "));
    assert!(rendered.contains("tight hamstrings"));
}

#[tokio::test]
async fn test_findings_empty_without_assessments() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let client_id = seed_client(&db, trainer_id, "Alex").await;
    let manager = AssessmentsManager::new(db.pool().clone());

    let findings = manager.findings_for_client(client_id).await.unwrap();
    assert!(findings.is_empty());
    assert_eq!(
        format_assessment_findings(&findings),
        "No assessment data available."
    );
}

// ABOUTME: Integration tests for the question catalog and trainer overlay upsert contract
// ABOUTME: Covers the single-opinion-per-question invariant and overlay validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use common::{create_test_db, seed_trainer};
use smartgains_server::database::questions::{
    CreateGlobalQuestionRequest, OverlayAction, QuestionType, QuestionsManager,
    UpsertOverlayRequest,
};
use smartgains_server::errors::ErrorCode;
use smartgains_server::intake::QuestionFilter;

fn global_question(text: &str, category: &str) -> CreateGlobalQuestionRequest {
    CreateGlobalQuestionRequest {
        question_text: text.to_owned(),
        question_type: QuestionType::Text,
        options: None,
        category: category.to_owned(),
        is_default: false,
        template: None,
    }
}

fn edit_overlay(global_id: i64, text: &str) -> UpsertOverlayRequest {
    UpsertOverlayRequest {
        global_question_id: Some(global_id),
        action: OverlayAction::Edit,
        question_text: text.to_owned(),
        question_type: QuestionType::Text,
        options: None,
        category: "health".to_owned(),
        template: None,
    }
}

fn delete_overlay(global_id: i64) -> UpsertOverlayRequest {
    UpsertOverlayRequest {
        global_question_id: Some(global_id),
        action: OverlayAction::Delete,
        question_text: String::new(),
        question_type: QuestionType::Text,
        options: None,
        category: "health".to_owned(),
        template: None,
    }
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_list_global_questions() {
    let db = create_test_db().await;
    let manager = QuestionsManager::new(db.pool().clone());

    manager
        .create_global(&global_question("Any injuries?", "health"))
        .await
        .unwrap();
    manager
        .create_global(&global_question("What are your goals?", "goals"))
        .await
        .unwrap();

    let all = manager.list_global(&QuestionFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let health_only = manager
        .list_global(&QuestionFilter {
            category: Some("health".to_owned()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(health_only.len(), 1);
    assert_eq!(health_only[0].question_text, "Any injuries?");
}

#[tokio::test]
async fn test_global_select_requires_options() {
    let db = create_test_db().await;
    let manager = QuestionsManager::new(db.pool().clone());

    let err = manager
        .create_global(&CreateGlobalQuestionRequest {
            question_text: "Preferred training days?".to_owned(),
            question_type: QuestionType::Checkbox,
            options: None,
            category: "schedule".to_owned(),
            is_default: false,
            template: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
}

#[tokio::test]
async fn test_defaults_only_filter() {
    let db = create_test_db().await;
    let manager = QuestionsManager::new(db.pool().clone());

    manager
        .create_global(&CreateGlobalQuestionRequest {
            is_default: true,
            ..global_question("Default question", "general")
        })
        .await
        .unwrap();
    manager
        .create_global(&global_question("Optional question", "general"))
        .await
        .unwrap();

    let defaults = manager
        .list_global(&QuestionFilter {
            defaults_only: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(defaults.len(), 1);
    assert!(defaults[0].is_default);
}

// ============================================================================
// Overlay Upsert Contract Tests
// ============================================================================

#[tokio::test]
async fn test_overlay_upsert_keeps_single_row() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let manager = QuestionsManager::new(db.pool().clone());

    let global = manager
        .create_global(&global_question("Any injuries?", "health"))
        .await
        .unwrap();

    let first = manager
        .upsert_overlay(trainer_id, &edit_overlay(global.id, "Injuries or surgeries?"))
        .await
        .unwrap();

    // A later delete for the same global question overwrites the edit row
    let second = manager
        .upsert_overlay(trainer_id, &delete_overlay(global.id))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.action, OverlayAction::Delete);

    let overlays = manager.list_overlays(trainer_id).await.unwrap();
    assert_eq!(overlays.len(), 1);
}

#[tokio::test]
async fn test_delete_then_add_overwrites_delete() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let manager = QuestionsManager::new(db.pool().clone());

    let global = manager
        .create_global(&global_question("Any injuries?", "health"))
        .await
        .unwrap();

    manager
        .upsert_overlay(trainer_id, &delete_overlay(global.id))
        .await
        .unwrap();

    let resolved = manager
        .resolve_for_trainer(trainer_id, &QuestionFilter::default())
        .await
        .unwrap();
    assert!(resolved.is_empty());

    // Re-adding the hidden catalog question lands as an edit on the same row
    let readded = manager
        .upsert_overlay(
            trainer_id,
            &UpsertOverlayRequest {
                action: OverlayAction::Add,
                ..edit_overlay(global.id, "Injury history, in detail?")
            },
        )
        .await
        .unwrap();
    assert_eq!(readded.action, OverlayAction::Edit);

    let overlays = manager.list_overlays(trainer_id).await.unwrap();
    assert_eq!(overlays.len(), 1);

    let resolved = manager
        .resolve_for_trainer(trainer_id, &QuestionFilter::default())
        .await
        .unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].question_text, "Injury history, in detail?");
}

#[tokio::test]
async fn test_overlay_unknown_global_question() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let manager = QuestionsManager::new(db.pool().clone());

    let err = manager
        .upsert_overlay(trainer_id, &edit_overlay(999, "Edited"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_overlay_edit_requires_global_id() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let manager = QuestionsManager::new(db.pool().clone());

    let err = manager
        .upsert_overlay(
            trainer_id,
            &UpsertOverlayRequest {
                global_question_id: None,
                ..edit_overlay(1, "Edited")
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
}

#[tokio::test]
async fn test_overlay_select_requires_options() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let manager = QuestionsManager::new(db.pool().clone());

    let err = manager
        .upsert_overlay(
            trainer_id,
            &UpsertOverlayRequest {
                global_question_id: None,
                action: OverlayAction::Add,
                question_text: "Preferred days?".to_owned(),
                question_type: QuestionType::Select,
                options: Some(vec![]),
                category: "schedule".to_owned(),
                template: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
}

// ============================================================================
// Trainer-Original Question Tests
// ============================================================================

#[tokio::test]
async fn test_delete_trainer_question_hard_deletes() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let manager = QuestionsManager::new(db.pool().clone());

    let added = manager
        .upsert_overlay(
            trainer_id,
            &UpsertOverlayRequest {
                global_question_id: None,
                action: OverlayAction::Add,
                question_text: "Injury history?".to_owned(),
                question_type: QuestionType::Textarea,
                options: None,
                category: "health".to_owned(),
                template: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(added.action, OverlayAction::Add);

    let deleted = manager
        .delete_trainer_question(trainer_id, added.id)
        .await
        .unwrap();
    assert!(deleted);
    assert!(manager.list_overlays(trainer_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_trainer_question_rejects_global_overlay() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let manager = QuestionsManager::new(db.pool().clone());

    let global = manager
        .create_global(&global_question("Any injuries?", "health"))
        .await
        .unwrap();
    let overlay = manager
        .upsert_overlay(trainer_id, &edit_overlay(global.id, "Edited"))
        .await
        .unwrap();

    let err = manager
        .delete_trainer_question(trainer_id, overlay.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_overlays_are_per_trainer() {
    let db = create_test_db().await;
    let trainer_a = seed_trainer(&db, "a@smartgains.app").await;
    let trainer_b = seed_trainer(&db, "b@smartgains.app").await;
    let manager = QuestionsManager::new(db.pool().clone());

    let global = manager
        .create_global(&global_question("Any injuries?", "health"))
        .await
        .unwrap();
    manager
        .upsert_overlay(trainer_a, &delete_overlay(global.id))
        .await
        .unwrap();

    // Trainer B still sees the untouched catalog
    let resolved_b = manager
        .resolve_for_trainer(trainer_b, &QuestionFilter::default())
        .await
        .unwrap();
    assert_eq!(resolved_b.len(), 1);

    let resolved_a = manager
        .resolve_for_trainer(trainer_a, &QuestionFilter::default())
        .await
        .unwrap();
    assert!(resolved_a.is_empty());
}

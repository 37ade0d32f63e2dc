// ABOUTME: Integration tests for the effective-question resolution over stored rows
// ABOUTME: Exercises merge semantics, source tagging, and context filters end to end
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
use smartgains_server::intake::{QuestionFilter, QuestionSource};

async fn seed_catalog(manager: &QuestionsManager) -> (i64, i64) {
    let g1 = manager
        .create_global(&CreateGlobalQuestionRequest {
            question_text: "Any injuries?".to_owned(),
            question_type: QuestionType::Text,
            options: None,
            category: "health".to_owned(),
            is_default: true,
            template: Some("intake_v2".to_owned()),
        })
        .await
        .unwrap();
    let g2 = manager
        .create_global(&CreateGlobalQuestionRequest {
            question_text: "What are your goals?".to_owned(),
            question_type: QuestionType::Textarea,
            options: None,
            category: "goals".to_owned(),
            is_default: false,
            template: None,
        })
        .await
        .unwrap();
    (g1.id, g2.id)
}

#[tokio::test]
async fn test_resolve_without_overlays() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let manager = QuestionsManager::new(db.pool().clone());
    let (g1, g2) = seed_catalog(&manager).await;

    let resolved = manager
        .resolve_for_trainer(trainer_id, &QuestionFilter::default())
        .await
        .unwrap();

    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].key.to_string(), format!("global_{g1}"));
    assert_eq!(resolved[1].key.to_string(), format!("global_{g2}"));
    assert!(resolved
        .iter()
        .all(|q| q.question_source == QuestionSource::Global));
}

#[tokio::test]
async fn test_resolve_category_filter() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let manager = QuestionsManager::new(db.pool().clone());
    seed_catalog(&manager).await;

    let resolved = manager
        .resolve_for_trainer(
            trainer_id,
            &QuestionFilter {
                category: Some("health".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].question_text, "Any injuries?");
}

#[tokio::test]
async fn test_edit_overrides_global_verbatim() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let manager = QuestionsManager::new(db.pool().clone());
    let (g1, _) = seed_catalog(&manager).await;

    manager
        .upsert_overlay(
            trainer_id,
            &UpsertOverlayRequest {
                global_question_id: Some(g1),
                action: OverlayAction::Edit,
                question_text: "Injuries or recent surgeries?".to_owned(),
                question_type: QuestionType::Textarea,
                options: None,
                category: "health".to_owned(),
                template: None,
            },
        )
        .await
        .unwrap();

    let resolved = manager
        .resolve_for_trainer(trainer_id, &QuestionFilter::default())
        .await
        .unwrap();

    let edited = resolved
        .iter()
        .find(|q| q.key.to_string() == format!("global_{g1}"))
        .unwrap();
    assert_eq!(edited.question_text, "Injuries or recent surgeries?");
    assert_eq!(edited.question_type, QuestionType::Textarea);
    assert_eq!(edited.question_source, QuestionSource::Trainer);
}

#[tokio::test]
async fn test_trainer_addition_with_template_filter() {
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
                template: Some("intake_v2".to_owned()),
            },
        )
        .await
        .unwrap();

    let matching = manager
        .resolve_for_trainer(
            trainer_id,
            &QuestionFilter {
                template: Some("intake_v2".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let added_question = matching
        .iter()
        .find(|q| q.key.to_string() == format!("trainer_{}", added.id))
        .unwrap();
    assert_eq!(added_question.question_source, QuestionSource::Trainer);

    let other = manager
        .resolve_for_trainer(
            trainer_id,
            &QuestionFilter {
                template: Some("other".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(other
        .iter()
        .all(|q| q.key.to_string() != format!("trainer_{}", added.id)));
}

#[tokio::test]
async fn test_resolution_idempotent_without_writes() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let manager = QuestionsManager::new(db.pool().clone());
    let (g1, _) = seed_catalog(&manager).await;

    manager
        .upsert_overlay(
            trainer_id,
            &UpsertOverlayRequest {
                global_question_id: Some(g1),
                action: OverlayAction::Delete,
                question_text: String::new(),
                question_type: QuestionType::Text,
                options: None,
                category: "health".to_owned(),
                template: None,
            },
        )
        .await
        .unwrap();

    let first = manager
        .resolve_for_trainer(trainer_id, &QuestionFilter::default())
        .await
        .unwrap();
    let second = manager
        .resolve_for_trainer(trainer_id, &QuestionFilter::default())
        .await
        .unwrap();

    let render = |qs: &[smartgains_server::intake::EffectiveQuestion]| {
        qs.iter()
            .map(|q| (q.key.to_string(), q.question_text.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(render(&first), render(&second));
}

#[tokio::test]
async fn test_ordering_globals_then_additions() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let manager = QuestionsManager::new(db.pool().clone());
    let (g1, g2) = seed_catalog(&manager).await;

    let added = manager
        .upsert_overlay(
            trainer_id,
            &UpsertOverlayRequest {
                global_question_id: None,
                action: OverlayAction::Add,
                question_text: "Anything else?".to_owned(),
                question_type: QuestionType::Text,
                options: None,
                category: "general".to_owned(),
                template: None,
            },
        )
        .await
        .unwrap();

    let resolved = manager
        .resolve_for_trainer(trainer_id, &QuestionFilter::default())
        .await
        .unwrap();

    let keys: Vec<String> = resolved.iter().map(|q| q.key.to_string()).collect();
    assert_eq!(
        keys,
        vec![
            format!("global_{g1}"),
            format!("global_{g2}"),
            format!("trainer_{}", added.id),
        ]
    );
}

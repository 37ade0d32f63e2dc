// ABOUTME: Integration tests for intake form instances and answer upserts
// ABOUTME: Covers the (form, question key) overwrite contract and answer listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use common::{create_test_db, seed_client, seed_trainer};
use smartgains_server::database::intake::{AnswerInput, IntakeManager};
use smartgains_server::errors::ErrorCode;

fn answer(key: &str, text: &str) -> AnswerInput {
    AnswerInput {
        question_key: key.to_owned(),
        question_source: "global".to_owned(),
        question_text: "Any injuries?".to_owned(),
        answer: text.to_owned(),
    }
}

#[tokio::test]
async fn test_create_form_and_save_answers() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let client_id = seed_client(&db, trainer_id, "Alex").await;
    let manager = IntakeManager::new(db.pool().clone());

    let form = manager
        .create_form("consultation", client_id, trainer_id)
        .await
        .unwrap();
    assert_eq!(form.form_type, "consultation");

    let saved = manager
        .save_answers(
            form.id,
            &[answer("global_1", "None"), answer("trainer_4", "Knee pain")],
        )
        .await
        .unwrap();
    assert_eq!(saved, 2);

    let answers = manager.list_answers(form.id).await.unwrap();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].question_key, "global_1");
    assert_eq!(answers[1].question_key, "trainer_4");
}

#[tokio::test]
async fn test_resubmitting_answer_overwrites() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let client_id = seed_client(&db, trainer_id, "Alex").await;
    let manager = IntakeManager::new(db.pool().clone());

    let form = manager
        .create_form("medical_history", client_id, trainer_id)
        .await
        .unwrap();

    manager
        .save_answers(form.id, &[answer("global_1", "None")])
        .await
        .unwrap();
    manager
        .save_answers(form.id, &[answer("global_1", "Sprained ankle, 2023")])
        .await
        .unwrap();

    let answers = manager.list_answers(form.id).await.unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].answer, "Sprained ankle, 2023");
}

#[tokio::test]
async fn test_save_answers_unknown_form() {
    let db = create_test_db().await;
    let manager = IntakeManager::new(db.pool().clone());

    let err = manager
        .save_answers(404, &[answer("global_1", "None")])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_list_forms_by_client() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let client_id = seed_client(&db, trainer_id, "Alex").await;
    let manager = IntakeManager::new(db.pool().clone());

    manager
        .create_form("consultation", client_id, trainer_id)
        .await
        .unwrap();
    manager
        .create_form("medical_history", client_id, trainer_id)
        .await
        .unwrap();

    let forms = manager.list_forms_by_client(client_id).await.unwrap();
    assert_eq!(forms.len(), 2);
}

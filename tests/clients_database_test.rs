// ABOUTME: Integration tests for client management and trainer scoping
// ABOUTME: Covers CRUD, duplicate checks, counts, and cross-trainer isolation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use common::{create_test_db, seed_client, seed_trainer};
use smartgains_server::database::clients::{ClientsManager, UpsertClientRequest};

fn update_request(first_name: &str) -> UpsertClientRequest {
    UpsertClientRequest {
        first_name: first_name.to_owned(),
        last_name: "Doe".to_owned(),
        age: Some(31),
        gender: Some("female".to_owned()),
        occupation: Some("architect".to_owned()),
        email: Some("alex@example.com".to_owned()),
        phone_number: Some("555-987-6543".to_owned()),
        address: Some("12 Main St".to_owned()),
        location_gym: Some("Uptown Gym".to_owned()),
    }
}

#[tokio::test]
async fn test_create_and_get_client_with_trainer_names() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    let client_id = seed_client(&db, trainer_id, "Alex").await;

    let manager = ClientsManager::new(db.pool().clone());
    let client = manager.get(client_id).await.unwrap().unwrap();

    assert_eq!(client.first_name, "Alex");
    assert_eq!(client.trainer_id, trainer_id);
    assert_eq!(client.trainer_first_name.as_deref(), Some("Jordan"));
    assert_eq!(client.trainer_last_name.as_deref(), Some("Smith"));
}

#[tokio::test]
async fn test_list_and_count_by_trainer() {
    let db = create_test_db().await;
    let trainer_a = seed_trainer(&db, "a@smartgains.app").await;
    let trainer_b = seed_trainer(&db, "b@smartgains.app").await;
    seed_client(&db, trainer_a, "Alex").await;
    seed_client(&db, trainer_a, "Blake").await;
    seed_client(&db, trainer_b, "Casey").await;

    let manager = ClientsManager::new(db.pool().clone());

    let for_a = manager.list_by_trainer(trainer_a).await.unwrap();
    assert_eq!(for_a.len(), 2);
    assert_eq!(manager.count_by_trainer(trainer_a).await.unwrap(), 2);
    assert_eq!(manager.count_by_trainer(trainer_b).await.unwrap(), 1);
}

#[tokio::test]
async fn test_exists_check() {
    let db = create_test_db().await;
    let trainer_id = seed_trainer(&db, "coach@smartgains.app").await;
    seed_client(&db, trainer_id, "Alex").await;

    let manager = ClientsManager::new(db.pool().clone());
    assert!(manager
        .exists(trainer_id, "Alex", "Doe", Some("alex@example.com"))
        .await
        .unwrap());
    assert!(manager
        .exists(trainer_id, "Alex", "Doe", None)
        .await
        .unwrap());
    assert!(!manager
        .exists(trainer_id, "Blake", "Doe", None)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_update_scoped_to_owning_trainer() {
    let db = create_test_db().await;
    let owner = seed_trainer(&db, "owner@smartgains.app").await;
    let other = seed_trainer(&db, "other@smartgains.app").await;
    let client_id = seed_client(&db, owner, "Alex").await;

    let manager = ClientsManager::new(db.pool().clone());

    // Another trainer cannot touch the row
    let denied = manager
        .update(client_id, other, &update_request("Hacked"))
        .await
        .unwrap();
    assert!(denied.is_none());

    let updated = manager
        .update(client_id, owner, &update_request("Alexandra"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.first_name, "Alexandra");
    assert_eq!(updated.age, Some(31));
}

#[tokio::test]
async fn test_delete_scoped_to_owning_trainer() {
    let db = create_test_db().await;
    let owner = seed_trainer(&db, "owner@smartgains.app").await;
    let other = seed_trainer(&db, "other@smartgains.app").await;
    let client_id = seed_client(&db, owner, "Alex").await;

    let manager = ClientsManager::new(db.pool().clone());

    assert!(!manager.delete(client_id, other).await.unwrap());
    assert!(manager.delete(client_id, owner).await.unwrap());
    assert!(manager.get(client_id).await.unwrap().is_none());
}

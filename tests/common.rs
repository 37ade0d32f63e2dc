// ABOUTME: Shared test helpers: in-memory database and seed data
// ABOUTME: Used by the per-area integration test files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

#![allow(dead_code)]

use smartgains_server::database::clients::{ClientsManager, UpsertClientRequest};
use smartgains_server::database::trainers::{CreateTrainerRequest, TrainersManager};
use smartgains_server::database::Database;

/// Create a migrated in-memory database
pub async fn create_test_db() -> Database {
    Database::new("sqlite::memory:")
        .await
        .expect("in-memory database")
}

/// Seed a trainer and return its id
pub async fn seed_trainer(db: &Database, email: &str) -> i64 {
    let manager = TrainersManager::new(db.pool().clone());
    let trainer = manager
        .create(&CreateTrainerRequest {
            first_name: "Jordan".to_owned(),
            last_name: "Smith".to_owned(),
            email: email.to_owned(),
            password_hash: "hash".to_owned(),
        })
        .await
        .expect("seed trainer");
    trainer.id
}

/// Seed a client for a trainer and return its id
pub async fn seed_client(db: &Database, trainer_id: i64, first_name: &str) -> i64 {
    let manager = ClientsManager::new(db.pool().clone());
    let client = manager
        .create(
            trainer_id,
            &UpsertClientRequest {
                first_name: first_name.to_owned(),
                last_name: "Doe".to_owned(),
                age: Some(30),
                gender: Some("female".to_owned()),
                occupation: Some("engineer".to_owned()),
                email: Some(format!("{}@example.com", first_name.to_lowercase())),
                phone_number: Some("555-123-4567".to_owned()),
                address: None,
                location_gym: Some("Downtown Gym".to_owned()),
            },
        )
        .await
        .expect("seed client");
    client.id
}

// ABOUTME: Main library entry point for the SmartGains trainer platform
// ABOUTME: Provides the REST API for client intake, AI workout plans, and progress tracking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

#![deny(unsafe_code)]

//! # SmartGains Server
//!
//! Backend for a fitness-trainer SaaS: trainers register, onboard clients
//! through multi-step intake forms, generate AI-assisted workout plans via an
//! external chat-completion API, track workout-session progress, and email
//! plans and session recaps to clients.
//!
//! ## Architecture
//!
//! - **Routes**: thin axum handlers validating payloads and shaping JSON
//! - **Database**: per-entity manager modules over a shared `SQLite` pool
//! - **Intake**: the question-overlay resolver merging the global catalog
//!   with trainer customizations
//! - **Plans**: day-completion and pinning rules for demo/generated plans
//! - **LLM**: `OpenAI`-compatible chat-completion client for plan generation
//! - **Email**: SMTP delivery of plans and session recaps

/// Authentication and session management
pub mod auth;

/// Configuration management
pub mod config;

/// Database managers for trainers, clients, questions, plans, and progress
pub mod database;

/// SMTP email delivery for plans and session recaps
pub mod email;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Question-overlay resolution for trainer intake forms
pub mod intake;

/// Chat-completion client for AI plan generation
pub mod llm;

/// Logging configuration and structured logging setup
pub mod logging;

/// Plan day-completion parsing, classification, and prompt building
pub mod plans;

/// HTTP route handlers
pub mod routes;

// ABOUTME: Configuration management for the SmartGains server
// ABOUTME: Environment-driven ServerConfig covering HTTP, database, auth, SMTP, and LLM settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

//! Configuration management
//!
//! All configuration comes from environment variables; `ServerConfig::from_env`
//! is the single entry point used by the server binary and tests.

mod environment;

pub use environment::{
    DatabaseConfig, EmailConfig, Environment, LlmConfig, LogLevel, SecurityConfig, ServerConfig,
};

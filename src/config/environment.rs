// ABOUTME: Environment-based server configuration with typed sub-configs
// ABOUTME: Parses HTTP, database, security, SMTP, and LLM settings from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use anyhow::{Context, Result};
use std::env;
use std::fmt;

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to a tracing level
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }

    /// Parse from a string, defaulting to `Info` on unknown values
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "warn" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from a string, defaulting to `Development` on unknown values
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database connection URL (e.g. `sqlite:./data/smartgains.db`)
    pub url: String,
    /// Run migrations on startup
    pub auto_migrate: bool,
}

/// Security configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Secret used to sign session JWTs
    pub jwt_secret: String,
    /// Session token lifetime in hours
    pub token_expiry_hours: i64,
}

/// SMTP configuration for outbound plan and recap emails
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Disable to log emails instead of sending them
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// From address, e.g. `SmartGains <no-reply@smartgains.app>`
    pub from_address: String,
}

/// LLM configuration for AI plan generation
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of an `OpenAI`-compatible chat-completions endpoint
    pub base_url: String,
    /// API key (may be empty for local servers)
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Hard cap on completion tokens for plan generation
    pub max_tokens: u32,
}

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub email: EmailConfig,
    pub llm: LlmConfig,
    /// Allowed CORS origins, `*` for any
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `SMARTGAINS_JWT_SECRET` is missing outside of
    /// development, or if a numeric variable fails to parse.
    pub fn from_env() -> Result<Self> {
        let environment =
            Environment::from_str_or_default(&env_var_or("SMARTGAINS_ENV", "development"));

        let jwt_secret = match env::var("SMARTGAINS_JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment.is_production() => {
                anyhow::bail!("SMARTGAINS_JWT_SECRET must be set in production")
            }
            Err(_) => "development-only-jwt-secret".to_owned(),
        };

        Ok(Self {
            http_port: env_var_or("HTTP_PORT", "8081")
                .parse()
                .context("Invalid HTTP_PORT")?,
            environment,
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
            database: DatabaseConfig {
                url: env_var_or("DATABASE_URL", "sqlite:./data/smartgains.db"),
                auto_migrate: env_var_or("AUTO_MIGRATE", "true")
                    .parse()
                    .context("Invalid AUTO_MIGRATE")?,
            },
            security: SecurityConfig {
                jwt_secret,
                token_expiry_hours: env_var_or("TOKEN_EXPIRY_HOURS", "24")
                    .parse()
                    .context("Invalid TOKEN_EXPIRY_HOURS")?,
            },
            email: EmailConfig {
                enabled: env_var_or("SMTP_ENABLED", "false")
                    .parse()
                    .context("Invalid SMTP_ENABLED")?,
                smtp_host: env_var_or("SMTP_HOST", "localhost"),
                smtp_port: env_var_or("SMTP_PORT", "587")
                    .parse()
                    .context("Invalid SMTP_PORT")?,
                smtp_username: env_var_or("SMTP_USERNAME", ""),
                smtp_password: env_var_or("SMTP_PASSWORD", ""),
                from_address: env_var_or("SMTP_FROM", "SmartGains <no-reply@smartgains.app>"),
            },
            llm: LlmConfig {
                base_url: env_var_or("SMARTGAINS_LLM_BASE_URL", "https://api.openai.com/v1"),
                api_key: env_var_or("SMARTGAINS_LLM_API_KEY", ""),
                model: env_var_or("SMARTGAINS_LLM_MODEL", "gpt-4o-2024-08-06"),
                max_tokens: env_var_or("SMARTGAINS_LLM_MAX_TOKENS", "3000")
                    .parse()
                    .context("Invalid SMARTGAINS_LLM_MAX_TOKENS")?,
            },
            cors_origins: parse_origins(&env_var_or("CORS_ORIGINS", "*")),
        })
    }
}

/// Read an environment variable with a fallback default
fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// Split a comma-separated origin list
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_or_default("bogus"), LogLevel::Info);
    }

    #[test]
    fn test_environment_parsing() {
        assert!(Environment::from_str_or_default("prod").is_production());
        assert!(!Environment::from_str_or_default("dev").is_production());
    }

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins("https://app.smartgains.app, http://localhost:5173");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://app.smartgains.app");
    }
}

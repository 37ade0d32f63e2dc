// ABOUTME: Trainer authentication: JWT session tokens and bcrypt password hashing
// ABOUTME: AuthManager issues and validates tokens; every route threads the resulting trainer identity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

//! Authentication and session management
//!
//! Trainers authenticate with email + password; a successful login issues an
//! HS256 JWT carrying the trainer id. Routes call
//! [`AuthManager::authenticate_request`] with the raw `Authorization` header
//! value and receive an [`AuthResult`] or an `Unauthorized` error — no ambient
//! session state exists anywhere in the core.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Minimum accepted password length for registration
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// JWT claims for a trainer session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Trainer id (subject)
    pub sub: i64,
    /// Trainer email, for display and audit logs
    pub email: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Authenticated trainer identity extracted from a valid token
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub trainer_id: i64,
    pub email: String,
}

/// Issues and validates trainer session tokens
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new auth manager from the configured JWT secret
    #[must_use]
    pub fn new(jwt_secret: &str, token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_expiry_hours,
        }
    }

    /// Generate a session token for a trainer
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token(&self, trainer_id: i64, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + chrono::Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: trainer_id,
            email: email.to_owned(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))
    }

    /// Validate a bare token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` for expired tokens and `AuthInvalid` for
    /// anything else that fails to verify.
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::auth_expired(),
                _ => AppError::auth_invalid(format!("Invalid token: {e}")),
            })
    }

    /// Authenticate a request from its `Authorization` header value
    ///
    /// Accepts `Bearer <token>`; a missing header fails closed.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when no header is present, `AuthInvalid` or
    /// `AuthExpired` when the token does not verify.
    pub fn authenticate_request(&self, auth_header: Option<&str>) -> AppResult<AuthResult> {
        let header = auth_header.ok_or_else(AppError::auth_required)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("Authorization header must be a bearer token"))?;

        let claims = self.validate_token(token)?;
        Ok(AuthResult {
            trainer_id: claims.sub,
            email: claims.email,
        })
    }
}

/// Hash a password for storage
///
/// # Errors
///
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against its stored hash
///
/// # Errors
///
/// Returns an error if the hash is malformed
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| AppError::internal(format!("Failed to verify password: {e}")))
}

/// Basic email shape check used at registration
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Password policy check used at registration
#[must_use]
pub fn is_valid_password(password: &str) -> bool {
    password.len() >= MIN_PASSWORD_LENGTH
}

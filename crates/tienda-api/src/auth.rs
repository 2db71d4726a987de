//! # Credential Hashing and Login
//!
//! Salted SHA-256 password storage: a random 32-byte salt and the digest
//! of `password || salt`, both hex-encoded. Token issuance and session
//! management are out of scope; login verifies a credential and returns
//! the account key.

use axum::extract::State;
use axum::Json;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use tienda_domain::PasswordHash;

use crate::error::AppError;
use crate::state::AppState;

/// Hash a new password with a fresh random salt.
pub fn hash_new_password(password: &str) -> PasswordHash {
    let mut salt_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = hex::encode(salt_bytes);
    let hash = digest(password, &salt);
    PasswordHash { hash, salt }
}

/// Verify a password against a stored credential.
pub fn verify_password(password: &str, stored: &PasswordHash) -> bool {
    digest(password, &stored.salt) == stored.hash
}

fn digest(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Login response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Always true on a 200.
    pub success: bool,
    /// The authenticated account.
    pub client_id: i64,
}

/// Verify credentials for a client account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Unknown account, inactive account, or wrong password"),
    ),
    tag = "auth",
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let rejected = || AppError::Unauthorized {
        message: "invalid credentials".to_string(),
    };

    let credentials = state
        .clients
        .credentials_by_email(&request.email)
        .await?
        .ok_or_else(rejected)?;
    if !credentials.active {
        return Err(rejected());
    }
    let stored = credentials.password.ok_or_else(rejected)?;
    if !verify_password(&request.password, &stored) {
        return Err(rejected());
    }

    Ok(Json(LoginResponse {
        success: true,
        client_id: credentials.client_id.as_i64(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let stored = hash_new_password("hunter2");
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn test_salts_are_unique_per_hash() {
        let a = hash_new_password("same");
        let b = hash_new_password("same");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_encoding_fits_the_column_width() {
        let stored = hash_new_password("x");
        assert_eq!(stored.hash.len(), 64);
        assert_eq!(stored.salt.len(), 64);
    }
}

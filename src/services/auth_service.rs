use crate::models::session::{ApiSession, AuthenticatedProfile};
use crate::repositories::{CompanyRepository, RepositoryError};
use chrono::{Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid session token")]
    InvalidToken,
    #[error("Session expired")]
    Expired,
    #[error("Profile not found")]
    ProfileNotFound,
    #[error("Session lifetime must be positive")]
    InvalidTtl,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Returned once at issue time; only the hash of `token` is stored.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedSession {
    pub token: String,
    pub profile_id: i64,
    pub expires_at: i64,
}

/// Opaque bearer sessions for API callers.
pub struct AuthService {
    pool: SqlitePool,
    profiles: Arc<dyn CompanyRepository>,
}

impl AuthService {
    pub fn new(pool: SqlitePool, profiles: Arc<dyn CompanyRepository>) -> Self {
        Self { pool, profiles }
    }

    /// SHA-256 hex of a raw token.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    pub async fn issue_session(
        &self,
        profile_id: i64,
        ttl: Duration,
    ) -> Result<IssuedSession, AuthError> {
        if ttl <= Duration::zero() {
            return Err(AuthError::InvalidTtl);
        }
        self.profiles
            .find_profile_by_id(profile_id)
            .await?
            .ok_or(AuthError::ProfileNotFound)?;

        let token = Self::generate_token();
        let expires_at = (Utc::now() + ttl).timestamp();

        sqlx::query("INSERT INTO api_sessions (token_hash, profile_id, expires_at) VALUES (?, ?, ?)")
            .bind(Self::hash_token(&token))
            .bind(profile_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        tracing::info!(profile_id, expires_at, "session issued");
        Ok(IssuedSession {
            token,
            profile_id,
            expires_at,
        })
    }

    /// Resolve a bearer token to its profile. The profile is re-read on
    /// every call so role and membership changes apply immediately.
    pub async fn validate_session(&self, token: &str) -> Result<AuthenticatedProfile, AuthError> {
        let token_hash = Self::hash_token(token);

        let session = sqlx::query_as::<_, ApiSession>(
            r#"
            SELECT id, token_hash, profile_id, expires_at, last_used_at, created_at
            FROM api_sessions
            WHERE token_hash = ?
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::InvalidToken)?;

        let now = Utc::now().timestamp();
        if session.expires_at < now {
            return Err(AuthError::Expired);
        }

        let pool = self.pool.clone();
        tokio::spawn(async move {
            let _ = sqlx::query("UPDATE api_sessions SET last_used_at = ? WHERE id = ?")
                .bind(now)
                .bind(session.id)
                .execute(&pool)
                .await;
        });

        let profile = self
            .profiles
            .find_profile_by_id(session.profile_id)
            .await?
            .ok_or(AuthError::ProfileNotFound)?;

        Ok(AuthenticatedProfile::from_profile(&profile))
    }

    /// Returns whether a session was removed.
    pub async fn revoke_session(&self, token: &str) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM api_sessions WHERE token_hash = ?")
            .bind(Self::hash_token(token))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM api_sessions WHERE expires_at < ?")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

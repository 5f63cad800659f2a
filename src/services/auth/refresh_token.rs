use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::refresh_token_repo::{RefreshTokenRepo, RefreshTokenRow};

/// Opaque refresh tokens: issue, validate, rotate, revoke.
#[derive(Clone)]
pub struct RefreshTokenService {
    repo: RefreshTokenRepo,
    ttl_seconds: u64,
}

impl std::fmt::Debug for RefreshTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenService")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

/// A freshly issued token and its row id.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenService {
    pub fn new(repo: RefreshTokenRepo, ttl_seconds: u64) -> Self {
        Self { repo, ttl_seconds }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a new refresh token for the session and store its hash.
    pub async fn issue(&self, session_id: Uuid) -> Result<IssuedRefreshToken, AppError> {
        let token = generate_refresh_token()?;
        let expires_at = Utc::now() + ChronoDuration::seconds(self.ttl_seconds as i64);

        debug!(
            session_id = %session_id,
            ttl_seconds = self.ttl_seconds,
            expires_at = %expires_at,
            "Issuing refresh token"
        );

        let id = self
            .repo
            .insert(session_id, hash_refresh_token(&token), expires_at)
            .await
            .map_err(|e| {
                error!(session_id = %session_id, error = ?e, "Failed to insert refresh token");
                AppError::Internal
            })?;

        Ok(IssuedRefreshToken {
            id,
            token,
            expires_at,
        })
    }

    /// Look up an active refresh token by the raw token.
    pub async fn find_active(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<RefreshTokenRow>, AppError> {
        self.repo
            .find_active_by_hash(hash_refresh_token(refresh_token), now)
            .await
            .map_err(|e| {
                error!(error = ?e, now = %now, "Failed to find refresh token");
                AppError::Internal
            })
    }

    /// Replace `current` with a new token in the same session.
    ///
    /// The successor is inserted first so `replaced_by` can point at it. If
    /// `current` turns out to be revoked already (a concurrent rotation won),
    /// the successor is revoked too and the caller gets `RefreshTokenExpired`.
    pub async fn rotate(
        &self,
        current: &RefreshTokenRow,
        now: DateTime<Utc>,
    ) -> Result<IssuedRefreshToken, AppError> {
        let next = self.issue(current.session_id).await?;

        let revoked = self
            .repo
            .revoke(current.id, Some(next.id), now)
            .await
            .map_err(|e| {
                error!(id = %current.id, error = %e, "Failed to revoke rotated refresh token");
                AppError::Internal
            })?;

        if revoked == 0 {
            warn!(id = %current.id, session_id = %current.session_id, "refresh token rotated concurrently");
            self.repo.revoke(next.id, None, now).await.map_err(|e| {
                error!(id = %next.id, error = %e, "Failed to revoke orphaned refresh token");
                AppError::Internal
            })?;
            return Err(AppError::RefreshTokenExpired);
        }

        Ok(next)
    }

    /// Revoke every token of a session (logout).
    pub async fn revoke_session(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        self.repo.revoke_session(session_id, now).await.map_err(|e| {
            error!(session_id = %session_id, error = %e, "Failed to revoke refresh tokens");
            AppError::Internal
        })
    }
}

fn generate_refresh_token() -> Result<String, AppError> {
    // 32 bytes of entropy -> URL-safe base64 without padding.
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes).map_err(|e| {
        error!(error = %e, "getrandom failed");
        AppError::Internal
    })?;

    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn hash_refresh_token(token: &str) -> Vec<u8> {
    // sha256(token) -> raw 32 bytes (stored as BYTEA)
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

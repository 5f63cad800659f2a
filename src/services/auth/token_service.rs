use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::SessionUser;
use crate::repos::auth_session_repo::AuthSessionRepo;
use crate::repos::user_repo;
use crate::services::auth::access_jwt::AccessTokenService;
use crate::services::auth::password;
use crate::services::auth::refresh_token::RefreshTokenService;

/// Orchestrates login, refresh (with rotation) and logout.
///
/// - AccessTokenService signs the JWT access token.
/// - RefreshTokenService owns opaque refresh tokens and their persistence.
#[derive(Clone, Debug)]
pub struct TokenService {
    db: PgPool,
    access: AccessTokenService,
    refresh: RefreshTokenService,
    sessions: AuthSessionRepo,
}

/// What login and refresh hand back to the handler, which turns it into cookies.
#[derive(Clone, Debug)]
pub struct IssuedTokenPair {
    pub user: SessionUser,
    pub access_token: String,
    pub refresh_token: String,
    pub session_id: Uuid,
}

impl TokenService {
    pub fn new(
        db: PgPool,
        access: AccessTokenService,
        refresh: RefreshTokenService,
        sessions: AuthSessionRepo,
    ) -> Self {
        Self {
            db,
            access,
            refresh,
            sessions,
        }
    }

    pub fn access(&self) -> &AccessTokenService {
        &self.access
    }

    pub fn refresh_ttl_seconds(&self) -> u64 {
        self.refresh.ttl_seconds()
    }

    /// Check credentials and open a new session.
    ///
    /// Unknown email, wrong password and inactive account all answer
    /// `InvalidCredentials` so the response does not reveal which one.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedTokenPair, AppError> {
        let row = user_repo::find_by_email(&self.db, email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !password::verify_password(&row.password_hash, password)? || !row.activo {
            debug!(user_id = %row.id, "login rejected");
            return Err(AppError::InvalidCredentials);
        }

        let user = row.into_session_user();
        let session = self.sessions.create(user.id).await.map_err(|e| {
            error!(user_id = %user.id, error = %e, "Failed to create auth session");
            AppError::Internal
        })?;

        let access_token = self.access.issue(user.id, &user.email, user.rol)?;
        let refresh_token = self.refresh.issue(session.id).await?;

        info!(user_id = %user.id, session_id = %session.id, "user logged in");

        Ok(IssuedTokenPair {
            user,
            access_token,
            refresh_token: refresh_token.token,
            session_id: session.id,
        })
    }

    /// Exchange a refresh token for a new pair. The presented token is
    /// revoked and replaced.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedTokenPair, AppError> {
        let now = Utc::now();

        let row = self
            .refresh
            .find_active(refresh_token, now)
            .await?
            .ok_or_else(|| {
                debug!("Refresh token not found or inactive");
                AppError::RefreshTokenExpired
            })?;

        let user_id = self
            .sessions
            .lookup_user(row.session_id)
            .await?
            .ok_or_else(|| {
                debug!(session_id = %row.session_id, "Session not found for refresh token");
                AppError::RefreshTokenExpired
            })?;

        let user = user_repo::get_active(&self.db, user_id)
            .await?
            .ok_or_else(|| {
                debug!(user_id = %user_id, "Refresh for missing or inactive user");
                AppError::RefreshTokenExpired
            })?;

        let next = self.refresh.rotate(&row, now).await?;
        self.sessions.touch_refreshed(row.session_id, now).await?;

        let access_token = self.access.issue(user.id, &user.email, user.rol)?;

        debug!(user_id = %user.id, session_id = %row.session_id, "tokens refreshed");

        Ok(IssuedTokenPair {
            user,
            access_token,
            refresh_token: next.token,
            session_id: row.session_id,
        })
    }

    /// End the session the refresh token belongs to. Unknown or already
    /// revoked tokens are not an error; logout always succeeds.
    pub async fn logout(&self, refresh_token: &str) -> Result<Option<Uuid>, AppError> {
        let now = Utc::now();

        let Some(row) = self.refresh.find_active(refresh_token, now).await? else {
            debug!("Refresh token not found or already inactive");
            return Ok(None);
        };

        self.refresh.revoke_session(row.session_id, now).await?;
        self.sessions.revoke(row.session_id, now).await?;

        info!(session_id = %row.session_id, "session closed");
        Ok(Some(row.session_id))
    }
}

/// Factory: build the auth services from application `Config`.
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::repos::{auth_session_repo::AuthSessionRepo, refresh_token_repo::RefreshTokenRepo};
use crate::services::auth::{AccessTokenService, RefreshTokenService, TokenService};

pub fn build_token_service(config: &Config, db: PgPool) -> Arc<TokenService> {
    let access = AccessTokenService::new(
        config.jwt_secret.as_bytes(),
        config.access_token_ttl_seconds,
        config.access_token_leeway_seconds,
    );
    let refresh = RefreshTokenService::new(
        RefreshTokenRepo::new(db.clone()),
        config.refresh_token_ttl_seconds,
    );

    Arc::new(TokenService::new(
        db.clone(),
        access,
        refresh,
        AuthSessionRepo::new(db),
    ))
}

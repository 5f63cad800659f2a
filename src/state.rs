/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - db: PgPool, tokens: TokenService, cookie settings
 * - Cheap to Clone (Arc / pool handles inside)
 */
use std::sync::Arc;

use sqlx::PgPool;

use crate::api::v1::cookies::CookieSettings;
use crate::config::Config;
use crate::services::auth::{TokenService, build_token_service};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: Arc<TokenService>,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(config: &Config, db: PgPool) -> Self {
        let tokens = build_token_service(config, db.clone());
        let cookies = CookieSettings {
            secure: config.app_env.is_production(),
            max_age_seconds: config.refresh_token_ttl_seconds,
        };

        Self {
            db,
            tokens,
            cookies,
        }
    }
}

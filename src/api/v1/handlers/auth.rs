/*
 * Responsibility
 * - POST /auth/login    credentials → session cookies + user
 * - POST /auth/refresh  refresh cookie → rotated session cookies
 * - POST /auth/logout   revoke session, clear cookies (always succeeds)
 * - GET  /auth/user     current user (behind access middleware)
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    response::IntoResponse,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    api::v1::{
        cookies::{REFRESH_TOKEN_COOKIE, read_cookie},
        extractors::AuthCtxExtractor,
        handlers::audit,
    },
    envelope::ApiResponse,
    error::AppError,
    middleware::auth::access::extract_token,
    models::{AccionAuditoria, Credentials, SessionUser},
    repos::{auditoria_repo::NewAuditoria, user_repo},
    state::AppState,
};

const TABLE: &str = "usuarios";

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(credentials) = body?;
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(AppError::bad_request("email and password are required"));
    }

    let issued = state
        .tokens
        .login(credentials.email.trim(), &credentials.password)
        .await?;

    audit_session(&state, issued.user.id, AccionAuditoria::Login).await;

    let cookies = state
        .cookies
        .session(&issued.access_token, &issued.refresh_token)?;
    Ok((
        cookies,
        Json(ApiResponse::ok_with_message(issued.user, "Login successful")),
    ))
}

pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = read_cookie(&headers, REFRESH_TOKEN_COOKIE).ok_or(AppError::RefreshTokenMissing)?;

    let issued = state.tokens.refresh(&token).await?;

    let cookies = state
        .cookies
        .session(&issued.access_token, &issued.refresh_token)?;
    Ok((cookies, Json(ApiResponse::done("Token refreshed"))))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = read_cookie(&headers, REFRESH_TOKEN_COOKIE) {
        state.tokens.logout(&token).await?;
    }

    // The access token may already be expired; the audit entry is skipped then.
    match extract_token(&headers).map(|t| state.tokens.access().verify(&t)) {
        Some(Ok(verified)) => audit_session(&state, verified.user_id, AccionAuditoria::Logout).await,
        _ => debug!("logout without a valid access token, not audited"),
    }

    Ok((state.cookies.cleared()?, Json(ApiResponse::done("Logged out"))))
}

pub async fn current_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<ApiResponse<SessionUser>>, AppError> {
    let user = user_repo::get_active(&state.db, ctx.user_id)
        .await?
        .ok_or(AppError::not_found("usuario"))?;
    Ok(Json(ApiResponse::ok(user)))
}

async fn audit_session(state: &AppState, user_id: Uuid, accion: AccionAuditoria) {
    audit(
        state,
        NewAuditoria {
            user_id,
            tabla: TABLE,
            registro_id: None,
            accion,
            datos_anteriores: None,
            datos_nuevos: None,
            descripcion: None,
        },
    )
    .await;
}

//! Access token verification → AuthCtx in request extensions.
//!
//! The token comes from the `access_token` cookie, falling back to
//! `Authorization: Bearer <jwt>` for non-browser callers.
//!
//! Outcomes map onto the codes the request client reacts to:
//! - no token                 → 401 `TOKEN_MISSING`
//! - signature ok, past `exp` → 401 `TOKEN_EXPIRED`
//! - anything else            → 401 `TOKEN_INVALID`

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::{debug, warn};

use crate::api::v1::cookies::{ACCESS_TOKEN_COOKIE, read_cookie};
use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::AccessJwtError;
use crate::state::AppState;

/// Put the routes of `router` behind access-token authentication.
///
/// ```ignore
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 from_fn cannot take a State extractor, so the state is passed explicitly.
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers()).ok_or_else(|| {
        debug!(path = %req.uri().path(), "no access token presented");
        AppError::TokenMissing
    })?;

    let verified = match state.tokens.access().verify(&token) {
        Ok(verified) => verified,
        Err(AccessJwtError::Expired) => {
            debug!(path = %req.uri().path(), "access token expired");
            return Err(AppError::TokenExpired);
        }
        Err(err) => {
            warn!(error = %err, "access token verification failed");
            return Err(err.into());
        }
    };

    let auth_ctx = AuthCtx::new(verified.user_id, verified.email, verified.rol);

    // middleware → extractor
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}

/// Cookie first, then bearer header.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    read_cookie(headers, ACCESS_TOKEN_COOKIE).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("access_token=from-cookie"));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_token(&headers), None);
    }
}

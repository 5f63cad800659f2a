/*
 * Responsibility
 * - GET /auditoria (read-only audit trail)
 */
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use crate::{
    api::v1::extractors::AuthCtxExtractor,
    envelope::ApiResponse,
    error::AppError,
    models::{Auditoria, ListQuery, Permission},
    repos::auditoria_repo,
    state::AppState,
};

pub async fn list_auditoria(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Auditoria>>>, AppError> {
    ctx.require(Permission::ReadAudit)?;
    let Query(query) = query?;

    let rows = auditoria_repo::list(&state.db, &query).await?;
    Ok(Json(ApiResponse::ok(rows)))
}

/*
 * Responsibility
 * - /inventario CRUD handlers (stock levels)
 * - Permission check per operation, audit entry per mutation
 */
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};

use crate::{
    api::v1::{
        extractors::AuthCtxExtractor,
        handlers::{audit, snapshot},
    },
    envelope::ApiResponse,
    error::AppError,
    models::{AccionAuditoria, Inventario, InventarioPatch, ListQuery, NewInventario, Permission},
    repos::{auditoria_repo::NewAuditoria, inventario_repo},
    state::AppState,
};

const TABLE: &str = "inventario";
const RESOURCE: &str = "inventario";

pub async fn list_inventario(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Inventario>>>, AppError> {
    ctx.require(Permission::ReadInventory)?;
    let Query(query) = query?;

    let rows = inventario_repo::list(&state.db, &query).await?;
    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn get_inventario(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<Inventario>>, AppError> {
    ctx.require(Permission::ReadInventory)?;
    let Path(id) = id?;

    let row = inventario_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    Ok(Json(ApiResponse::ok(row)))
}

pub async fn create_inventario(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    body: Result<Json<NewInventario>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Inventario>>), AppError> {
    ctx.require(Permission::CreateInventory)?;
    let Json(new) = body?;
    new.validate().map_err(AppError::bad_request)?;

    let row = inventario_repo::create(&state.db, &new).await?;

    audit(
        &state,
        NewAuditoria {
            user_id: ctx.user_id,
            tabla: TABLE,
            registro_id: Some(row.id),
            accion: AccionAuditoria::Crear,
            datos_anteriores: None,
            datos_nuevos: snapshot(&row),
            descripcion: Some(format!("Stock inicial: {}", row.stock_actual)),
        },
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(row, "Inventory created")),
    ))
}

pub async fn update_inventario(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<InventarioPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<Inventario>>, AppError> {
    ctx.require(Permission::UpdateInventory)?;
    let Path(id) = id?;
    let Json(patch) = body?;
    patch.validate().map_err(AppError::bad_request)?;

    let before = inventario_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    let row = inventario_repo::update(&state.db, id, &patch)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;

    audit(
        &state,
        NewAuditoria {
            user_id: ctx.user_id,
            tabla: TABLE,
            registro_id: Some(row.id),
            accion: AccionAuditoria::Inventario,
            datos_anteriores: snapshot(&before),
            datos_nuevos: snapshot(&row),
            descripcion: Some(format!(
                "Stock {} -> {}",
                before.stock_actual, row.stock_actual
            )),
        },
    )
    .await;

    Ok(Json(ApiResponse::ok_with_message(row, "Inventory updated")))
}

pub async fn delete_inventario(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    ctx.require(Permission::DeleteInventory)?;
    let Path(id) = id?;

    let before = inventario_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    if !inventario_repo::delete(&state.db, id).await? {
        return Err(AppError::not_found(RESOURCE));
    }

    audit(
        &state,
        NewAuditoria {
            user_id: ctx.user_id,
            tabla: TABLE,
            registro_id: Some(id),
            accion: AccionAuditoria::Eliminar,
            datos_anteriores: snapshot(&before),
            datos_nuevos: None,
            descripcion: None,
        },
    )
    .await;

    Ok(Json(ApiResponse::done("Inventory deleted")))
}

/*
 * Responsibility
 * - /ventas CRUD handlers
 * - The seller is always the authenticated user
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
    models::{AccionAuditoria, ListQuery, NewVenta, Permission, Venta, VentaPatch},
    repos::{auditoria_repo::NewAuditoria, venta_repo},
    state::AppState,
};

const TABLE: &str = "ventas";
const RESOURCE: &str = "venta";

pub async fn list_ventas(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Venta>>>, AppError> {
    ctx.require(Permission::ReadSale)?;
    let Query(query) = query?;

    let rows = venta_repo::list(&state.db, &query).await?;
    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn get_venta(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<Venta>>, AppError> {
    ctx.require(Permission::ReadSale)?;
    let Path(id) = id?;

    let row = venta_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    Ok(Json(ApiResponse::ok(row)))
}

pub async fn create_venta(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    body: Result<Json<NewVenta>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Venta>>), AppError> {
    ctx.require(Permission::CreateSale)?;
    let Json(new) = body?;
    new.validate().map_err(AppError::bad_request)?;

    let row = venta_repo::create(&state.db, ctx.user_id, &new).await?;

    audit(
        &state,
        NewAuditoria {
            user_id: ctx.user_id,
            tabla: TABLE,
            registro_id: Some(row.id),
            accion: AccionAuditoria::Venta,
            datos_anteriores: None,
            datos_nuevos: snapshot(&row),
            descripcion: Some(format!("Venta {} por {:.2}", row.numero_venta, row.total)),
        },
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(row, "Sale created")),
    ))
}

pub async fn update_venta(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<VentaPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<Venta>>, AppError> {
    ctx.require(Permission::UpdateSale)?;
    let Path(id) = id?;
    let Json(patch) = body?;

    let before = venta_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    let row = venta_repo::update(&state.db, id, &patch)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;

    let descripcion = (before.estado != row.estado)
        .then(|| format!("Estado {} -> {}", before.estado, row.estado));

    audit(
        &state,
        NewAuditoria {
            user_id: ctx.user_id,
            tabla: TABLE,
            registro_id: Some(row.id),
            accion: AccionAuditoria::Actualizar,
            datos_anteriores: snapshot(&before),
            datos_nuevos: snapshot(&row),
            descripcion,
        },
    )
    .await;

    Ok(Json(ApiResponse::ok_with_message(row, "Sale updated")))
}

pub async fn delete_venta(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    ctx.require(Permission::DeleteSale)?;
    let Path(id) = id?;

    let before = venta_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    if !venta_repo::delete(&state.db, id).await? {
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
            descripcion: Some(format!("Venta {} eliminada", before.numero_venta)),
        },
    )
    .await;

    Ok(Json(ApiResponse::done("Sale deleted")))
}

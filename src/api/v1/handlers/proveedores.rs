/*
 * Responsibility
 * - /proveedores CRUD handlers
 * - Catalog data: gated by the product permissions
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
    models::{AccionAuditoria, ListQuery, NewProveedor, Permission, Proveedor, ProveedorPatch},
    repos::{auditoria_repo::NewAuditoria, proveedor_repo},
    state::AppState,
};

const TABLE: &str = "proveedores";
const RESOURCE: &str = "proveedor";

pub async fn list_proveedores(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Proveedor>>>, AppError> {
    ctx.require(Permission::ReadProduct)?;
    let Query(query) = query?;

    let rows = proveedor_repo::list(&state.db, &query).await?;
    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn get_proveedor(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<Proveedor>>, AppError> {
    ctx.require(Permission::ReadProduct)?;
    let Path(id) = id?;

    let row = proveedor_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    Ok(Json(ApiResponse::ok(row)))
}

pub async fn create_proveedor(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    body: Result<Json<NewProveedor>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Proveedor>>), AppError> {
    ctx.require(Permission::CreateProduct)?;
    let Json(new) = body?;
    new.validate().map_err(AppError::bad_request)?;

    let row = proveedor_repo::create(&state.db, &new).await?;

    audit(
        &state,
        NewAuditoria {
            user_id: ctx.user_id,
            tabla: TABLE,
            registro_id: Some(row.id),
            accion: AccionAuditoria::Crear,
            datos_anteriores: None,
            datos_nuevos: snapshot(&row),
            descripcion: Some(format!("Proveedor creado: {}", row.nombre)),
        },
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(row, "Supplier created")),
    ))
}

pub async fn update_proveedor(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ProveedorPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<Proveedor>>, AppError> {
    ctx.require(Permission::UpdateProduct)?;
    let Path(id) = id?;
    let Json(patch) = body?;
    patch.validate().map_err(AppError::bad_request)?;

    let before = proveedor_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    let row = proveedor_repo::update(&state.db, id, &patch)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;

    audit(
        &state,
        NewAuditoria {
            user_id: ctx.user_id,
            tabla: TABLE,
            registro_id: Some(row.id),
            accion: AccionAuditoria::Actualizar,
            datos_anteriores: snapshot(&before),
            datos_nuevos: snapshot(&row),
            descripcion: None,
        },
    )
    .await;

    Ok(Json(ApiResponse::ok_with_message(row, "Supplier updated")))
}

pub async fn delete_proveedor(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    ctx.require(Permission::DeleteProduct)?;
    let Path(id) = id?;

    let before = proveedor_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    if !proveedor_repo::delete(&state.db, id).await? {
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
            descripcion: Some(format!("Proveedor eliminado: {}", before.nombre)),
        },
    )
    .await;

    Ok(Json(ApiResponse::done("Supplier deleted")))
}

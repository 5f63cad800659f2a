/*
 * Responsibility
 * - /productos CRUD handlers
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
    models::{AccionAuditoria, ListQuery, NewProducto, Permission, Producto, ProductoPatch},
    repos::{auditoria_repo::NewAuditoria, producto_repo},
    state::AppState,
};

const TABLE: &str = "productos";
const RESOURCE: &str = "producto";

pub async fn list_productos(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Producto>>>, AppError> {
    ctx.require(Permission::ReadProduct)?;
    let Query(query) = query?;

    let rows = producto_repo::list(&state.db, &query).await?;
    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn get_producto(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<Producto>>, AppError> {
    ctx.require(Permission::ReadProduct)?;
    let Path(id) = id?;

    let row = producto_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    Ok(Json(ApiResponse::ok(row)))
}

pub async fn create_producto(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    body: Result<Json<NewProducto>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Producto>>), AppError> {
    ctx.require(Permission::CreateProduct)?;
    let Json(new) = body?;
    new.validate().map_err(AppError::bad_request)?;

    let row = producto_repo::create(&state.db, &new).await?;

    audit(
        &state,
        NewAuditoria {
            user_id: ctx.user_id,
            tabla: TABLE,
            registro_id: Some(row.id),
            accion: AccionAuditoria::Crear,
            datos_anteriores: None,
            datos_nuevos: snapshot(&row),
            descripcion: Some(format!("Producto creado: {}", row.nombre)),
        },
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(row, "Product created")),
    ))
}

pub async fn update_producto(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ProductoPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<Producto>>, AppError> {
    ctx.require(Permission::UpdateProduct)?;
    let Path(id) = id?;
    let Json(patch) = body?;
    patch.validate().map_err(AppError::bad_request)?;

    let before = producto_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    let row = producto_repo::update(&state.db, id, &patch)
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

    Ok(Json(ApiResponse::ok_with_message(row, "Product updated")))
}

pub async fn delete_producto(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    ctx.require(Permission::DeleteProduct)?;
    let Path(id) = id?;

    let before = producto_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    if !producto_repo::delete(&state.db, id).await? {
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
            descripcion: Some(format!("Producto eliminado: {}", before.nombre)),
        },
    )
    .await;

    Ok(Json(ApiResponse::done("Product deleted")))
}

/*
 * Responsibility
 * - /categorias CRUD handlers
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
    models::{AccionAuditoria, Categoria, CategoriaPatch, ListQuery, NewCategoria, Permission},
    repos::{auditoria_repo::NewAuditoria, categoria_repo},
    state::AppState,
};

const TABLE: &str = "categorias";
const RESOURCE: &str = "categoria";

pub async fn list_categorias(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Categoria>>>, AppError> {
    ctx.require(Permission::ReadProduct)?;
    let Query(query) = query?;

    let rows = categoria_repo::list(&state.db, &query).await?;
    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn get_categoria(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<Categoria>>, AppError> {
    ctx.require(Permission::ReadProduct)?;
    let Path(id) = id?;

    let row = categoria_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    Ok(Json(ApiResponse::ok(row)))
}

pub async fn create_categoria(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    body: Result<Json<NewCategoria>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Categoria>>), AppError> {
    ctx.require(Permission::CreateProduct)?;
    let Json(new) = body?;
    new.validate().map_err(AppError::bad_request)?;

    let row = categoria_repo::create(&state.db, &new).await?;

    audit(
        &state,
        NewAuditoria {
            user_id: ctx.user_id,
            tabla: TABLE,
            registro_id: Some(row.id),
            accion: AccionAuditoria::Crear,
            datos_anteriores: None,
            datos_nuevos: snapshot(&row),
            descripcion: Some(format!("Categoria creada: {}", row.nombre)),
        },
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(row, "Category created")),
    ))
}

pub async fn update_categoria(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<CategoriaPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<Categoria>>, AppError> {
    ctx.require(Permission::UpdateProduct)?;
    let Path(id) = id?;
    let Json(patch) = body?;
    patch.validate().map_err(AppError::bad_request)?;

    let before = categoria_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    let row = categoria_repo::update(&state.db, id, &patch)
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

    Ok(Json(ApiResponse::ok_with_message(row, "Category updated")))
}

pub async fn delete_categoria(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    ctx.require(Permission::DeleteProduct)?;
    let Path(id) = id?;

    let before = categoria_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    if !categoria_repo::delete(&state.db, id).await? {
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
            descripcion: Some(format!("Categoria eliminada: {}", before.nombre)),
        },
    )
    .await;

    Ok(Json(ApiResponse::done("Category deleted")))
}

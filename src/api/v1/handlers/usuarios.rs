/*
 * Responsibility
 * - /usuarios administration (list, create, update, deactivate)
 * - Passwords are hashed here; responses never carry the hash
 */
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        extractors::AuthCtxExtractor,
        handlers::{audit, snapshot},
    },
    envelope::ApiResponse,
    error::AppError,
    models::{AccionAuditoria, ListQuery, NewUsuario, Permission, Usuario, UsuarioPatch},
    repos::{auditoria_repo::NewAuditoria, user_repo},
    services::auth::password::hash_password,
    state::AppState,
};

const TABLE: &str = "usuarios";
const RESOURCE: &str = "usuario";

pub async fn list_usuarios(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Usuario>>>, AppError> {
    ctx.require(Permission::ReadUser)?;
    let Query(query) = query?;

    let rows = user_repo::list(&state.db, &query).await?;
    Ok(Json(ApiResponse::ok(rows)))
}

pub async fn get_usuario(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<Usuario>>, AppError> {
    ctx.require(Permission::ReadUser)?;
    let Path(id) = id?;

    let row = user_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    Ok(Json(ApiResponse::ok(row)))
}

pub async fn create_usuario(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    body: Result<Json<NewUsuario>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Usuario>>), AppError> {
    ctx.require(Permission::CreateUser)?;
    let Json(new) = body?;
    new.validate().map_err(AppError::bad_request)?;

    let hash = hash_password(&new.password)?;
    let row = user_repo::create(
        &state.db,
        &new.email,
        &hash,
        new.rol,
        new.nombre_completo.as_deref(),
    )
    .await?;

    audit(
        &state,
        NewAuditoria {
            user_id: ctx.user_id,
            tabla: TABLE,
            registro_id: None,
            accion: AccionAuditoria::Crear,
            datos_anteriores: None,
            datos_nuevos: snapshot(&row),
            descripcion: Some(format!("Usuario creado: {} ({})", row.email, row.rol)),
        },
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(row, "User created")),
    ))
}

pub async fn update_usuario(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UsuarioPatch>, JsonRejection>,
) -> Result<Json<ApiResponse<Usuario>>, AppError> {
    ctx.require(Permission::UpdateUser)?;
    let Path(id) = id?;
    let Json(patch) = body?;
    patch.validate().map_err(AppError::bad_request)?;

    let before = user_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    let hash = patch.password.as_deref().map(hash_password).transpose()?;
    let row = user_repo::update(&state.db, id, &patch, hash.as_deref())
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;

    audit(
        &state,
        NewAuditoria {
            user_id: ctx.user_id,
            tabla: TABLE,
            registro_id: None,
            accion: AccionAuditoria::Actualizar,
            datos_anteriores: snapshot(&before),
            datos_nuevos: snapshot(&row),
            descripcion: hash
                .is_some()
                .then(|| format!("Contraseña cambiada: {}", row.email)),
        },
    )
    .await;

    Ok(Json(ApiResponse::ok_with_message(row, "User updated")))
}

/// Deactivates the account. Its refresh tokens stop working on the next
/// refresh because only active users can refresh.
pub async fn delete_usuario(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    ctx.require(Permission::DeleteUser)?;
    let Path(id) = id?;
    if id == ctx.user_id {
        return Err(AppError::bad_request("You cannot deactivate your own account"));
    }

    let before = user_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found(RESOURCE))?;
    if !user_repo::deactivate(&state.db, id).await? {
        return Err(AppError::not_found(RESOURCE));
    }

    audit(
        &state,
        NewAuditoria {
            user_id: ctx.user_id,
            tabla: TABLE,
            registro_id: None,
            accion: AccionAuditoria::Eliminar,
            datos_anteriores: snapshot(&before),
            datos_nuevos: None,
            descripcion: Some(format!("Usuario desactivado: {}", before.email)),
        },
    )
    .await;

    Ok(Json(ApiResponse::done("User deactivated")))
}

/*
 * Responsibility
 * - SQLx access to the usuarios table (login lookup, session user resolution, administration)
 * - DB errors are returned as RepoError so handlers can map them
 */
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::{ListQuery, Rol, SessionUser, Usuario, UsuarioPatch};
use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub rol: Rol,
    pub nombre_completo: Option<String>,
    pub activo: bool,
}

impl UserRow {
    pub fn into_session_user(self) -> SessionUser {
        SessionUser {
            id: self.id,
            email: self.email,
            rol: self.rol,
            nombre_completo: self.nombre_completo,
        }
    }
}

pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, email, password_hash, rol, nombre_completo, activo
        FROM usuarios
        WHERE lower(email) = lower($1)
        "#,
    )
    .bind(email.trim())
    .fetch_optional(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

/// Active user by id, as exposed to clients.
pub async fn get_active(db: &PgPool, user_id: Uuid) -> Result<Option<SessionUser>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, email, password_hash, rol, nombre_completo, activo
        FROM usuarios
        WHERE id = $1 AND activo
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row.map(UserRow::into_session_user))
}

const USUARIO_COLUMNS: &str = "id, email, rol, nombre_completo, activo, created_at, updated_at";

/// Accounts for administration; `search` matches email or full name.
pub async fn list(db: &PgPool, query: &ListQuery) -> Result<Vec<Usuario>, RepoError> {
    let sql = format!(
        r#"
        SELECT {USUARIO_COLUMNS}
        FROM usuarios
        WHERE ($3::text IS NULL OR email ILIKE $3 OR nombre_completo ILIKE $3)
        ORDER BY created_at DESC, email
        LIMIT $1 OFFSET $2
        "#
    );
    let rows = sqlx::query_as::<_, Usuario>(&sql)
        .bind(query.limit())
        .bind(query.offset())
        .bind(query.search_pattern())
        .fetch_all(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(rows)
}

pub async fn get(db: &PgPool, user_id: Uuid) -> Result<Option<Usuario>, RepoError> {
    let sql = format!("SELECT {USUARIO_COLUMNS} FROM usuarios WHERE id = $1");
    let row = sqlx::query_as::<_, Usuario>(&sql)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

/// Duplicate emails (case-insensitive) fail with `Conflict`.
pub async fn create(
    db: &PgPool,
    email: &str,
    password_hash: &str,
    rol: Rol,
    nombre_completo: Option<&str>,
) -> Result<Usuario, RepoError> {
    let sql = format!(
        r#"
        INSERT INTO usuarios (email, password_hash, rol, nombre_completo)
        VALUES ($1, $2, $3, $4)
        RETURNING {USUARIO_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Usuario>(&sql)
        .bind(email.trim())
        .bind(password_hash)
        .bind(rol.as_str())
        .bind(nombre_completo)
        .fetch_one(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

/// Absent fields keep their stored value. `password_hash` is already hashed.
pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    patch: &UsuarioPatch,
    password_hash: Option<&str>,
) -> Result<Option<Usuario>, RepoError> {
    let sql = format!(
        r#"
        UPDATE usuarios
        SET
            rol = COALESCE($2, rol),
            nombre_completo = COALESCE($3, nombre_completo),
            activo = COALESCE($4, activo),
            password_hash = COALESCE($5, password_hash),
            updated_at = now()
        WHERE id = $1
        RETURNING {USUARIO_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Usuario>(&sql)
        .bind(user_id)
        .bind(patch.rol.map(|r| r.as_str()))
        .bind(patch.nombre_completo.as_deref())
        .bind(patch.activo)
        .bind(password_hash)
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

/// Soft delete: the row stays for the audit trail and sales history.
pub async fn deactivate(db: &PgPool, user_id: Uuid) -> Result<bool, RepoError> {
    let result = sqlx::query(
        "UPDATE usuarios SET activo = FALSE, updated_at = now() WHERE id = $1 AND activo",
    )
    .bind(user_id)
    .execute(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(result.rows_affected() > 0)
}

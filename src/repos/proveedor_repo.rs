/*
 * Responsibility
 * - SQLx CRUD for the proveedores table
 */
use sqlx::PgPool;

use crate::models::{ListQuery, NewProveedor, Proveedor, ProveedorPatch};
use crate::repos::error::RepoError;

const COLUMNS: &str = r#"
    id, nombre, ruc, telefono, email, direccion, activo, created_at, updated_at
"#;

/// Active suppliers; `search` matches the name or the RUC.
pub async fn list(db: &PgPool, query: &ListQuery) -> Result<Vec<Proveedor>, RepoError> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM proveedores
        WHERE activo AND ($3::text IS NULL OR nombre ILIKE $3 OR ruc ILIKE $3)
        ORDER BY nombre, id
        LIMIT $1 OFFSET $2
        "#
    );
    let rows = sqlx::query_as::<_, Proveedor>(&sql)
        .bind(query.limit())
        .bind(query.offset())
        .bind(query.search_pattern())
        .fetch_all(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(rows)
}

pub async fn get(db: &PgPool, id: i64) -> Result<Option<Proveedor>, RepoError> {
    let sql = format!("SELECT {COLUMNS} FROM proveedores WHERE id = $1");
    let row = sqlx::query_as::<_, Proveedor>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn create(db: &PgPool, new: &NewProveedor) -> Result<Proveedor, RepoError> {
    let sql = format!(
        r#"
        INSERT INTO proveedores (nombre, ruc, telefono, email, direccion, activo)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Proveedor>(&sql)
        .bind(new.nombre.trim())
        .bind(new.ruc.as_deref())
        .bind(new.telefono.as_deref())
        .bind(new.email.as_deref())
        .bind(new.direccion.as_deref())
        .bind(new.activo)
        .fetch_one(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: i64,
    patch: &ProveedorPatch,
) -> Result<Option<Proveedor>, RepoError> {
    let sql = format!(
        r#"
        UPDATE proveedores
        SET
            nombre = COALESCE($2, nombre),
            ruc = COALESCE($3, ruc),
            telefono = COALESCE($4, telefono),
            email = COALESCE($5, email),
            direccion = COALESCE($6, direccion),
            activo = COALESCE($7, activo),
            updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Proveedor>(&sql)
        .bind(id)
        .bind(patch.nombre.as_deref().map(str::trim))
        .bind(patch.ruc.as_deref())
        .bind(patch.telefono.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.direccion.as_deref())
        .bind(patch.activo)
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn delete(db: &PgPool, id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM proveedores WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(result.rows_affected() > 0)
}

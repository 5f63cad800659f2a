/*
 * Responsibility
 * - SQLx CRUD for the categorias table
 * - Listing shows active categories only; get/update/delete address any row
 */
use sqlx::PgPool;

use crate::models::{Categoria, CategoriaPatch, ListQuery, NewCategoria};
use crate::repos::error::RepoError;

const COLUMNS: &str = "id, nombre, descripcion, activo, created_at, updated_at";

pub async fn list(db: &PgPool, query: &ListQuery) -> Result<Vec<Categoria>, RepoError> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM categorias
        WHERE activo AND ($3::text IS NULL OR nombre ILIKE $3)
        ORDER BY nombre, id
        LIMIT $1 OFFSET $2
        "#
    );
    let rows = sqlx::query_as::<_, Categoria>(&sql)
        .bind(query.limit())
        .bind(query.offset())
        .bind(query.search_pattern())
        .fetch_all(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(rows)
}

pub async fn get(db: &PgPool, id: i64) -> Result<Option<Categoria>, RepoError> {
    let sql = format!("SELECT {COLUMNS} FROM categorias WHERE id = $1");
    let row = sqlx::query_as::<_, Categoria>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn create(db: &PgPool, new: &NewCategoria) -> Result<Categoria, RepoError> {
    let sql = format!(
        r#"
        INSERT INTO categorias (nombre, descripcion, activo)
        VALUES ($1, $2, $3)
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Categoria>(&sql)
        .bind(new.nombre.trim())
        .bind(new.descripcion.as_deref())
        .bind(new.activo)
        .fetch_one(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: i64,
    patch: &CategoriaPatch,
) -> Result<Option<Categoria>, RepoError> {
    let sql = format!(
        r#"
        UPDATE categorias
        SET
            nombre = COALESCE($2, nombre),
            descripcion = COALESCE($3, descripcion),
            activo = COALESCE($4, activo),
            updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Categoria>(&sql)
        .bind(id)
        .bind(patch.nombre.as_deref().map(str::trim))
        .bind(patch.descripcion.as_deref())
        .bind(patch.activo)
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

/// Fails with `ForeignKey` while products still reference the category.
pub async fn delete(db: &PgPool, id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM categorias WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(result.rows_affected() > 0)
}

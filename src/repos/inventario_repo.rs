/*
 * Responsibility
 * - SQLx CRUD for the inventario table (stock per producto / variante)
 */
use sqlx::PgPool;

use crate::models::{Inventario, InventarioPatch, ListQuery, NewInventario};
use crate::repos::error::RepoError;

const COLUMNS: &str = r#"
    i.id, i.producto_id, i.variante_id, i.stock_actual, i.stock_reservado,
    i.ultima_actualizacion, i.created_at, i.updated_at
"#;

/// `search` matches the product name.
pub async fn list(db: &PgPool, query: &ListQuery) -> Result<Vec<Inventario>, RepoError> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM inventario i
        JOIN productos p ON p.id = i.producto_id
        WHERE ($3::text IS NULL OR p.nombre ILIKE $3)
        ORDER BY i.ultima_actualizacion DESC, i.id DESC
        LIMIT $1 OFFSET $2
        "#
    );
    let rows = sqlx::query_as::<_, Inventario>(&sql)
        .bind(query.limit())
        .bind(query.offset())
        .bind(query.search_pattern())
        .fetch_all(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(rows)
}

pub async fn get(db: &PgPool, id: i64) -> Result<Option<Inventario>, RepoError> {
    let sql = format!("SELECT {COLUMNS} FROM inventario i WHERE i.id = $1");
    let row = sqlx::query_as::<_, Inventario>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn create(db: &PgPool, new: &NewInventario) -> Result<Inventario, RepoError> {
    let sql = format!(
        r#"
        INSERT INTO inventario AS i (producto_id, variante_id, stock_actual, stock_reservado)
        VALUES ($1, $2, $3, $4)
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Inventario>(&sql)
        .bind(new.producto_id)
        .bind(new.variante_id)
        .bind(new.stock_actual)
        .bind(new.stock_reservado)
        .fetch_one(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: i64,
    patch: &InventarioPatch,
) -> Result<Option<Inventario>, RepoError> {
    let sql = format!(
        r#"
        UPDATE inventario AS i
        SET
            stock_actual = COALESCE($2, i.stock_actual),
            stock_reservado = COALESCE($3, i.stock_reservado),
            ultima_actualizacion = now(),
            updated_at = now()
        WHERE i.id = $1
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Inventario>(&sql)
        .bind(id)
        .bind(patch.stock_actual)
        .bind(patch.stock_reservado)
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn delete(db: &PgPool, id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM inventario WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(result.rows_affected() > 0)
}

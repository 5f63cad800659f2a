/*
 * Responsibility
 * - SQLx CRUD for the productos table
 * - Rows decode straight into the shared Producto model
 */
use sqlx::PgPool;

use crate::models::{ListQuery, NewProducto, Producto, ProductoPatch};
use crate::repos::error::RepoError;

const COLUMNS: &str = r#"
    id, categoria_id, proveedor_id, nombre, descripcion, codigo_barras,
    precio_costo, precio_venta, stock_minimo, imagen_url, activo,
    created_at, updated_at
"#;

pub async fn list(db: &PgPool, query: &ListQuery) -> Result<Vec<Producto>, RepoError> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM productos
        WHERE ($3::text IS NULL OR nombre ILIKE $3 OR codigo_barras ILIKE $3)
        ORDER BY created_at DESC, id DESC
        LIMIT $1 OFFSET $2
        "#
    );
    let rows = sqlx::query_as::<_, Producto>(&sql)
        .bind(query.limit())
        .bind(query.offset())
        .bind(query.search_pattern())
        .fetch_all(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(rows)
}

pub async fn get(db: &PgPool, id: i64) -> Result<Option<Producto>, RepoError> {
    let sql = format!("SELECT {COLUMNS} FROM productos WHERE id = $1");
    let row = sqlx::query_as::<_, Producto>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn create(db: &PgPool, new: &NewProducto) -> Result<Producto, RepoError> {
    let sql = format!(
        r#"
        INSERT INTO productos (
            categoria_id, proveedor_id, nombre, descripcion, codigo_barras,
            precio_costo, precio_venta, stock_minimo, imagen_url, activo
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Producto>(&sql)
        .bind(new.categoria_id)
        .bind(new.proveedor_id)
        .bind(new.nombre.trim())
        .bind(new.descripcion.as_deref())
        .bind(new.codigo_barras.as_deref())
        .bind(new.precio_costo)
        .bind(new.precio_venta)
        .bind(new.stock_minimo)
        .bind(new.imagen_url.as_deref())
        .bind(new.activo)
        .fetch_one(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

/// Absent patch fields keep their stored value.
pub async fn update(
    db: &PgPool,
    id: i64,
    patch: &ProductoPatch,
) -> Result<Option<Producto>, RepoError> {
    let sql = format!(
        r#"
        UPDATE productos
        SET
            categoria_id = COALESCE($2, categoria_id),
            nombre = COALESCE($3, nombre),
            descripcion = COALESCE($4, descripcion),
            codigo_barras = COALESCE($5, codigo_barras),
            precio_costo = COALESCE($6, precio_costo),
            precio_venta = COALESCE($7, precio_venta),
            stock_minimo = COALESCE($8, stock_minimo),
            activo = COALESCE($9, activo),
            proveedor_id = COALESCE($10, proveedor_id),
            updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Producto>(&sql)
        .bind(id)
        .bind(patch.categoria_id)
        .bind(patch.nombre.as_deref().map(str::trim))
        .bind(patch.descripcion.as_deref())
        .bind(patch.codigo_barras.as_deref())
        .bind(patch.precio_costo)
        .bind(patch.precio_venta)
        .bind(patch.stock_minimo)
        .bind(patch.activo)
        .bind(patch.proveedor_id)
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn delete(db: &PgPool, id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM productos WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(result.rows_affected() > 0)
}

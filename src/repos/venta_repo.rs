/*
 * Responsibility
 * - SQLx CRUD for the ventas table
 * - user_id is always the seller from the session
 */
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ListQuery, NewVenta, Venta, VentaPatch};
use crate::repos::error::RepoError;

const COLUMNS: &str = r#"
    id, user_id, numero_venta, tipo_comprobante, cliente_nombre, cliente_documento,
    subtotal, descuento, impuesto, total, estado, observaciones,
    created_at, updated_at
"#;

/// `search` matches the sale number or the customer's name/document.
pub async fn list(db: &PgPool, query: &ListQuery) -> Result<Vec<Venta>, RepoError> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM ventas
        WHERE ($3::text IS NULL
            OR numero_venta ILIKE $3
            OR cliente_nombre ILIKE $3
            OR cliente_documento ILIKE $3)
        ORDER BY created_at DESC, id DESC
        LIMIT $1 OFFSET $2
        "#
    );
    let rows = sqlx::query_as::<_, Venta>(&sql)
        .bind(query.limit())
        .bind(query.offset())
        .bind(query.search_pattern())
        .fetch_all(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(rows)
}

pub async fn get(db: &PgPool, id: i64) -> Result<Option<Venta>, RepoError> {
    let sql = format!("SELECT {COLUMNS} FROM ventas WHERE id = $1");
    let row = sqlx::query_as::<_, Venta>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn create(db: &PgPool, user_id: Uuid, new: &NewVenta) -> Result<Venta, RepoError> {
    let sql = format!(
        r#"
        INSERT INTO ventas (
            user_id, numero_venta, tipo_comprobante, cliente_nombre, cliente_documento,
            subtotal, descuento, impuesto, total, estado, observaciones
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Venta>(&sql)
        .bind(user_id)
        .bind(new.numero_venta.trim())
        .bind(new.tipo_comprobante.as_str())
        .bind(new.cliente_nombre.as_deref())
        .bind(new.cliente_documento.as_deref())
        .bind(new.subtotal)
        .bind(new.descuento)
        .bind(new.impuesto)
        .bind(new.total)
        .bind(new.estado.as_str())
        .bind(new.observaciones.as_deref())
        .fetch_one(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn update(db: &PgPool, id: i64, patch: &VentaPatch) -> Result<Option<Venta>, RepoError> {
    let sql = format!(
        r#"
        UPDATE ventas
        SET
            estado = COALESCE($2, estado),
            cliente_nombre = COALESCE($3, cliente_nombre),
            cliente_documento = COALESCE($4, cliente_documento),
            observaciones = COALESCE($5, observaciones),
            updated_at = now()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Venta>(&sql)
        .bind(id)
        .bind(patch.estado.map(|e| e.as_str()))
        .bind(patch.cliente_nombre.as_deref())
        .bind(patch.cliente_documento.as_deref())
        .bind(patch.observaciones.as_deref())
        .fetch_optional(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn delete(db: &PgPool, id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM ventas WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(result.rows_affected() > 0)
}

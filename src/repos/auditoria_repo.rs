/*
 * Responsibility
 * - Append-only audit trail (auditoria table)
 */
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AccionAuditoria, Auditoria, ListQuery};
use crate::repos::error::RepoError;

/// One audit entry about to be written.
#[derive(Debug, Clone)]
pub struct NewAuditoria<'a> {
    pub user_id: Uuid,
    pub tabla: &'a str,
    pub registro_id: Option<i64>,
    pub accion: AccionAuditoria,
    pub datos_anteriores: Option<Value>,
    pub datos_nuevos: Option<Value>,
    pub descripcion: Option<String>,
}

const COLUMNS: &str = r#"
    id, user_id, tabla, registro_id, accion, datos_anteriores, datos_nuevos,
    descripcion, created_at
"#;

pub async fn record(db: &PgPool, entry: NewAuditoria<'_>) -> Result<i64, RepoError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO auditoria (
            user_id, tabla, registro_id, accion, datos_anteriores, datos_nuevos, descripcion
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(entry.user_id)
    .bind(entry.tabla)
    .bind(entry.registro_id)
    .bind(entry.accion.as_str())
    .bind(entry.datos_anteriores)
    .bind(entry.datos_nuevos)
    .bind(entry.descripcion)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(id)
}

/// Newest first. `search` matches the table name or the description.
pub async fn list(db: &PgPool, query: &ListQuery) -> Result<Vec<Auditoria>, RepoError> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM auditoria
        WHERE ($3::text IS NULL OR tabla ILIKE $3 OR descripcion ILIKE $3)
        ORDER BY created_at DESC, id DESC
        LIMIT $1 OFFSET $2
        "#
    );
    let rows = sqlx::query_as::<_, Auditoria>(&sql)
        .bind(query.limit())
        .bind(query.offset())
        .bind(query.search_pattern())
        .fetch_all(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(rows)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    pub enum AccionAuditoria {
        Crear => "crear",
        Actualizar => "actualizar",
        Eliminar => "eliminar",
        Venta => "venta",
        Pago => "pago",
        Inventario => "inventario",
        Login => "login",
        Logout => "logout",
    }
}

/// One row of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Auditoria {
    pub id: i64,
    pub user_id: Uuid,
    pub tabla: String,
    pub registro_id: Option<i64>,
    #[sqlx(try_from = "String")]
    pub accion: AccionAuditoria,
    pub datos_anteriores: Option<serde_json::Value>,
    pub datos_nuevos: Option<serde_json::Value>,
    pub descripcion: Option<String>,
    pub created_at: DateTime<Utc>,
}

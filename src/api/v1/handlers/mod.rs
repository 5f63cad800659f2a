/*
 * Responsibility
 * - One module per resource; handlers stay thin (permission check → repo → audit → envelope)
 */
pub mod auditoria;
pub mod auth;
pub mod categorias;
pub mod health;
pub mod inventario;
pub mod productos;
pub mod proveedores;
pub mod usuarios;
pub mod ventas;

use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::repos::auditoria_repo::{self, NewAuditoria};
use crate::state::AppState;

/// Append to the audit trail. The mutation it describes has already been
/// committed, so a failure here is logged and does not fail the request.
pub(crate) async fn audit(state: &AppState, entry: NewAuditoria<'_>) {
    let (tabla, registro_id) = (entry.tabla, entry.registro_id);
    if let Err(e) = auditoria_repo::record(&state.db, entry).await {
        error!(tabla, ?registro_id, error = %e, "failed to write audit entry");
    }
}

pub(crate) fn snapshot<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

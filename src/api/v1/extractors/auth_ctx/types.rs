/*
 * Responsibility
 * - The "authenticated context" type handlers see
 * - The access middleware verifies the token and stores this in request extensions
 */

use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Permission, Rol};

/// Context attached to every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub email: String,
    pub rol: Rol,
}

impl AuthCtx {
    pub fn new(user_id: Uuid, email: impl Into<String>, rol: Rol) -> Self {
        Self {
            user_id,
            email: email.into(),
            rol,
        }
    }

    /// `Forbidden` unless the caller's role grants `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.rol.can(permission) {
            Ok(())
        } else {
            warn!(user_id = %self.user_id, rol = %self.rol, %permission, "permission denied");
            Err(AppError::Forbidden)
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Rol;

/// The authenticated user as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub rol: Rol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre_completo: Option<String>,
}

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A user account as administrators see it. The password hash never leaves
/// the repository layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Usuario {
    pub id: Uuid,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub rol: Rol,
    pub nombre_completo: Option<String>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const MIN_PASSWORD_LEN: usize = 8;

/// Body of `POST /usuarios`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUsuario {
    pub email: String,
    pub password: String,
    pub rol: Rol,
    #[serde(default)]
    pub nombre_completo: Option<String>,
}

impl NewUsuario {
    pub fn validate(&self) -> Result<(), &'static str> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err("email is not valid");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("password must have at least 8 characters");
        }
        Ok(())
    }
}

impl std::fmt::Debug for NewUsuario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUsuario")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("rol", &self.rol)
            .field("nombre_completo", &self.nombre_completo)
            .finish()
    }
}

/// Partial update of an account. `password` replaces the stored hash.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsuarioPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rol: Option<Rol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre_completo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UsuarioPatch {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self
            .password
            .as_deref()
            .is_some_and(|p| p.chars().count() < MIN_PASSWORD_LEN)
        {
            return Err("password must have at least 8 characters");
        }
        Ok(())
    }
}

impl std::fmt::Debug for UsuarioPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsuarioPatch")
            .field("rol", &self.rol)
            .field("nombre_completo", &self.nombre_completo)
            .field("activo", &self.activo)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

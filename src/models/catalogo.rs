use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product category. Every product belongs to exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Categoria {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategoria {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default = "active")]
    pub activo: bool,
}

impl NewCategoria {
    pub fn new(nombre: impl Into<String>) -> Self {
        Self {
            nombre: nombre.into(),
            descripcion: None,
            activo: true,
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.nombre.trim().is_empty() {
            return Err("nombre is required");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoriaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

impl CategoriaPatch {
    pub fn validate(&self) -> Result<(), &'static str> {
        blank_name(self.nombre.as_deref())
    }
}

/// Supplier a product may be bought from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Proveedor {
    pub id: i64,
    pub nombre: String,
    pub ruc: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProveedor {
    pub nombre: String,
    #[serde(default)]
    pub ruc: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default = "active")]
    pub activo: bool,
}

impl NewProveedor {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.nombre.trim().is_empty() {
            return Err("nombre is required");
        }
        if self.email.as_deref().is_some_and(|e| !e.contains('@')) {
            return Err("email is not valid");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProveedorPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

impl ProveedorPatch {
    pub fn validate(&self) -> Result<(), &'static str> {
        blank_name(self.nombre.as_deref())?;
        if self.email.as_deref().is_some_and(|e| !e.contains('@')) {
            return Err("email is not valid");
        }
        Ok(())
    }
}

fn active() -> bool {
    true
}

fn blank_name(nombre: Option<&str>) -> Result<(), &'static str> {
    match nombre {
        Some(n) if n.trim().is_empty() => Err("nombre cannot be empty"),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_categoria_needs_a_name() {
        let c: NewCategoria = serde_json::from_value(json!({ "nombre": "Abarrotes" })).unwrap();
        assert!(c.activo);
        assert!(c.validate().is_ok());
        assert!(NewCategoria::new("  ").validate().is_err());
    }

    #[test]
    fn proveedor_email_is_checked_when_present() {
        let mut p: NewProveedor = serde_json::from_value(json!({ "nombre": "Alicorp" })).unwrap();
        assert!(p.validate().is_ok());
        p.email = Some("ventas.alicorp.pe".into());
        assert_eq!(p.validate(), Err("email is not valid"));
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(CategoriaPatch::default().validate().is_ok());
        let patch = ProveedorPatch {
            nombre: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}

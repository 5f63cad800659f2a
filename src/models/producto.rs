use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Producto {
    pub id: i64,
    pub categoria_id: i64,
    pub proveedor_id: Option<i64>,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub codigo_barras: Option<String>,
    pub precio_costo: f64,
    pub precio_venta: f64,
    pub stock_minimo: i32,
    pub imagen_url: Option<String>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProducto {
    pub categoria_id: i64,
    #[serde(default)]
    pub proveedor_id: Option<i64>,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub codigo_barras: Option<String>,
    pub precio_costo: f64,
    pub precio_venta: f64,
    #[serde(default)]
    pub stock_minimo: i32,
    #[serde(default)]
    pub imagen_url: Option<String>,
    #[serde(default = "active")]
    pub activo: bool,
}

fn active() -> bool {
    true
}

impl NewProducto {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.nombre.trim().is_empty() {
            return Err("nombre is required");
        }
        if self.precio_costo < 0.0 || self.precio_venta < 0.0 {
            return Err("prices must be >= 0");
        }
        if self.stock_minimo < 0 {
            return Err("stock_minimo must be >= 0");
        }
        Ok(())
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proveedor_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codigo_barras: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precio_costo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precio_venta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_minimo: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activo: Option<bool>,
}

impl ProductoPatch {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(nombre) = &self.nombre
            && nombre.trim().is_empty()
        {
            return Err("nombre cannot be empty");
        }
        if self.precio_costo.is_some_and(|p| p < 0.0) || self.precio_venta.is_some_and(|p| p < 0.0) {
            return Err("prices must be >= 0");
        }
        if self.stock_minimo.is_some_and(|s| s < 0) {
            return Err("stock_minimo must be >= 0");
        }
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stock position of one product (or one of its variants).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Inventario {
    pub id: i64,
    pub producto_id: i64,
    pub variante_id: Option<i64>,
    pub stock_actual: i32,
    pub stock_reservado: i32,
    pub ultima_actualizacion: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Inventario {
    pub fn disponible(&self) -> i32 {
        self.stock_actual - self.stock_reservado
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInventario {
    pub producto_id: i64,
    #[serde(default)]
    pub variante_id: Option<i64>,
    pub stock_actual: i32,
    #[serde(default)]
    pub stock_reservado: i32,
}

impl NewInventario {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.stock_actual < 0 || self.stock_reservado < 0 {
            return Err("stock must be >= 0");
        }
        if self.stock_reservado > self.stock_actual {
            return Err("stock_reservado cannot exceed stock_actual");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventarioPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_actual: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_reservado: Option<i32>,
}

impl InventarioPatch {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.stock_actual.is_some_and(|s| s < 0) || self.stock_reservado.is_some_and(|s| s < 0) {
            return Err("stock must be >= 0");
        }
        if let (Some(actual), Some(reservado)) = (self.stock_actual, self.stock_reservado)
            && reservado > actual
        {
            return Err("stock_reservado cannot exceed stock_actual");
        }
        Ok(())
    }
}

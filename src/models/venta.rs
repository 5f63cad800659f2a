use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    pub enum EstadoVenta {
        Pendiente => "pendiente",
        Completada => "completada",
        Anulada => "anulada",
    }
}

text_enum! {
    pub enum TipoComprobante {
        Boleta => "boleta",
        Factura => "factura",
        Ticket => "ticket",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Venta {
    pub id: i64,
    pub user_id: Uuid,
    pub numero_venta: String,
    #[sqlx(try_from = "String")]
    pub tipo_comprobante: TipoComprobante,
    pub cliente_nombre: Option<String>,
    pub cliente_documento: Option<String>,
    pub subtotal: f64,
    pub descuento: f64,
    pub impuesto: f64,
    pub total: f64,
    #[sqlx(try_from = "String")]
    pub estado: EstadoVenta,
    pub observaciones: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sale as submitted by a seller. `user_id` comes from the session, never
/// from the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVenta {
    pub numero_venta: String,
    pub tipo_comprobante: TipoComprobante,
    #[serde(default)]
    pub cliente_nombre: Option<String>,
    #[serde(default)]
    pub cliente_documento: Option<String>,
    pub subtotal: f64,
    #[serde(default)]
    pub descuento: f64,
    #[serde(default)]
    pub impuesto: f64,
    pub total: f64,
    #[serde(default = "pendiente")]
    pub estado: EstadoVenta,
    #[serde(default)]
    pub observaciones: Option<String>,
}

fn pendiente() -> EstadoVenta {
    EstadoVenta::Pendiente
}

/// Tolerance for float rounding when checking `total`.
const CENT: f64 = 0.005;

impl NewVenta {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.numero_venta.trim().is_empty() {
            return Err("numero_venta is required");
        }
        if self.subtotal < 0.0 || self.descuento < 0.0 || self.impuesto < 0.0 {
            return Err("amounts must be >= 0");
        }
        let expected = self.subtotal - self.descuento + self.impuesto;
        if (expected - self.total).abs() > CENT {
            return Err("total must equal subtotal - descuento + impuesto");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VentaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<EstadoVenta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliente_nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliente_documento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn venta() -> NewVenta {
        serde_json::from_value(json!({
            "numero_venta": "V-0001",
            "tipo_comprobante": "boleta",
            "subtotal": 100.0,
            "descuento": 10.0,
            "impuesto": 16.2,
            "total": 106.2
        }))
        .unwrap()
    }

    #[test]
    fn new_sale_starts_pending() {
        let v = venta();
        assert_eq!(v.estado, EstadoVenta::Pendiente);
        assert!(v.validate().is_ok());
    }

    #[test]
    fn total_must_add_up() {
        let mut v = venta();
        v.total = 120.0;
        assert_eq!(
            v.validate(),
            Err("total must equal subtotal - descuento + impuesto")
        );
    }

    #[test]
    fn rejects_unknown_receipt_type() {
        let err = serde_json::from_value::<TipoComprobante>(json!("recibo"));
        assert!(err.is_err());
        assert_eq!("factura".parse::<TipoComprobante>(), Ok(TipoComprobante::Factura));
    }
}

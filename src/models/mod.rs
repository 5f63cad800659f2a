//! Domain types shared by the HTTP API and the request client.
//!
//! Field names follow the database columns, which is also what travels on
//! the wire.

/// Closed set of lowercase string values stored as TEXT and sent as JSON
/// strings. Generates `as_str`, `FromStr`, `TryFrom<String>` (row decoding)
/// and `Display`.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::models::UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::models::UnknownVariant;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

mod auditoria;
mod catalogo;
mod inventario;
mod producto;
mod query;
mod rol;
mod usuario;
mod venta;

pub use auditoria::{AccionAuditoria, Auditoria};
pub use catalogo::{
    Categoria, CategoriaPatch, NewCategoria, NewProveedor, Proveedor, ProveedorPatch,
};
pub use inventario::{Inventario, InventarioPatch, NewInventario};
pub use producto::{NewProducto, Producto, ProductoPatch};
pub use query::ListQuery;
pub use rol::{Permission, Rol};
pub use usuario::{Credentials, NewUsuario, SessionUser, Usuario, UsuarioPatch};
pub use venta::{EstadoVenta, NewVenta, TipoComprobante, Venta, VentaPatch};

/// A stored or submitted string that is not one of the enum's values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

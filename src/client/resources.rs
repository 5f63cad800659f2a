//! Typed helpers for the backend's resource endpoints.

use uuid::Uuid;

use super::{ApiClient, ApiError};
use crate::models::{
    Auditoria, Categoria, CategoriaPatch, Credentials, Inventario, InventarioPatch, ListQuery,
    NewCategoria, NewInventario, NewProducto, NewProveedor, NewUsuario, NewVenta, Producto,
    ProductoPatch, Proveedor, ProveedorPatch, SessionUser, Usuario, UsuarioPatch, Venta,
    VentaPatch,
};

impl ApiClient {
    /// Log in and store the session cookies in the client's jar.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionUser, ApiError> {
        self.post("/auth/login", credentials).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.post("/auth/logout", &()).await
    }

    pub async fn current_user(&self) -> Result<SessionUser, ApiError> {
        self.get("/auth/user").await
    }

    // categorias

    pub async fn list_categorias(&self, query: &ListQuery) -> Result<Vec<Categoria>, ApiError> {
        self.get_with_query("/categorias", query.to_pairs()).await
    }

    pub async fn get_categoria(&self, id: i64) -> Result<Categoria, ApiError> {
        self.get(&format!("/categorias/{id}")).await
    }

    pub async fn create_categoria(&self, categoria: &NewCategoria) -> Result<Categoria, ApiError> {
        self.post("/categorias", categoria).await
    }

    pub async fn update_categoria(
        &self,
        id: i64,
        patch: &CategoriaPatch,
    ) -> Result<Categoria, ApiError> {
        self.put(&format!("/categorias/{id}"), patch).await
    }

    pub async fn delete_categoria(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/categorias/{id}")).await
    }

    // proveedores

    pub async fn list_proveedores(&self, query: &ListQuery) -> Result<Vec<Proveedor>, ApiError> {
        self.get_with_query("/proveedores", query.to_pairs()).await
    }

    pub async fn get_proveedor(&self, id: i64) -> Result<Proveedor, ApiError> {
        self.get(&format!("/proveedores/{id}")).await
    }

    pub async fn create_proveedor(&self, proveedor: &NewProveedor) -> Result<Proveedor, ApiError> {
        self.post("/proveedores", proveedor).await
    }

    pub async fn update_proveedor(
        &self,
        id: i64,
        patch: &ProveedorPatch,
    ) -> Result<Proveedor, ApiError> {
        self.put(&format!("/proveedores/{id}"), patch).await
    }

    pub async fn delete_proveedor(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/proveedores/{id}")).await
    }

    // productos

    pub async fn list_productos(&self, query: &ListQuery) -> Result<Vec<Producto>, ApiError> {
        self.get_with_query("/productos", query.to_pairs()).await
    }

    pub async fn get_producto(&self, id: i64) -> Result<Producto, ApiError> {
        self.get(&format!("/productos/{id}")).await
    }

    pub async fn create_producto(&self, producto: &NewProducto) -> Result<Producto, ApiError> {
        self.post("/productos", producto).await
    }

    pub async fn update_producto(
        &self,
        id: i64,
        patch: &ProductoPatch,
    ) -> Result<Producto, ApiError> {
        self.put(&format!("/productos/{id}"), patch).await
    }

    pub async fn delete_producto(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/productos/{id}")).await
    }

    // inventario

    pub async fn list_inventario(&self, query: &ListQuery) -> Result<Vec<Inventario>, ApiError> {
        self.get_with_query("/inventario", query.to_pairs()).await
    }

    pub async fn get_inventario(&self, id: i64) -> Result<Inventario, ApiError> {
        self.get(&format!("/inventario/{id}")).await
    }

    pub async fn create_inventario(
        &self,
        inventario: &NewInventario,
    ) -> Result<Inventario, ApiError> {
        self.post("/inventario", inventario).await
    }

    pub async fn update_inventario(
        &self,
        id: i64,
        patch: &InventarioPatch,
    ) -> Result<Inventario, ApiError> {
        self.put(&format!("/inventario/{id}"), patch).await
    }

    pub async fn delete_inventario(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/inventario/{id}")).await
    }

    // ventas

    pub async fn list_ventas(&self, query: &ListQuery) -> Result<Vec<Venta>, ApiError> {
        self.get_with_query("/ventas", query.to_pairs()).await
    }

    pub async fn get_venta(&self, id: i64) -> Result<Venta, ApiError> {
        self.get(&format!("/ventas/{id}")).await
    }

    pub async fn create_venta(&self, venta: &NewVenta) -> Result<Venta, ApiError> {
        self.post("/ventas", venta).await
    }

    pub async fn update_venta(&self, id: i64, patch: &VentaPatch) -> Result<Venta, ApiError> {
        self.put(&format!("/ventas/{id}"), patch).await
    }

    pub async fn delete_venta(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/ventas/{id}")).await
    }

    // usuarios

    pub async fn list_usuarios(&self, query: &ListQuery) -> Result<Vec<Usuario>, ApiError> {
        self.get_with_query("/usuarios", query.to_pairs()).await
    }

    pub async fn get_usuario(&self, id: Uuid) -> Result<Usuario, ApiError> {
        self.get(&format!("/usuarios/{id}")).await
    }

    pub async fn create_usuario(&self, usuario: &NewUsuario) -> Result<Usuario, ApiError> {
        self.post("/usuarios", usuario).await
    }

    pub async fn update_usuario(
        &self,
        id: Uuid,
        patch: &UsuarioPatch,
    ) -> Result<Usuario, ApiError> {
        self.put(&format!("/usuarios/{id}"), patch).await
    }

    /// Deactivates the account; the row is kept for the audit trail.
    pub async fn deactivate_usuario(&self, id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/usuarios/{id}")).await
    }

    pub async fn list_auditoria(&self, query: &ListQuery) -> Result<Vec<Auditoria>, ApiError> {
        self.get_with_query("/auditoria", query.to_pairs()).await
    }
}

/*
 * Responsibility
 * - v1 URL layout
 * - Public: /health and the /auth session endpoints that work from cookies alone
 * - Everything else sits behind the access-token middleware (route_layer)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware;
use crate::state::AppState;

use crate::api::v1::handlers::{
    auditoria::list_auditoria,
    auth::{current_user, login, logout, refresh},
    categorias::{
        create_categoria, delete_categoria, get_categoria, list_categorias, update_categoria,
    },
    health::health,
    inventario::{create_inventario, delete_inventario, get_inventario, list_inventario, update_inventario},
    productos::{create_producto, delete_producto, get_producto, list_productos, update_producto},
    proveedores::{
        create_proveedor, delete_proveedor, get_proveedor, list_proveedores, update_proveedor,
    },
    usuarios::{create_usuario, delete_usuario, get_usuario, list_usuarios, update_usuario},
    ventas::{create_venta, delete_venta, get_venta, list_ventas, update_venta},
};

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout));

    let protected = Router::new()
        .route("/auth/user", get(current_user))
        .route("/categorias", get(list_categorias).post(create_categoria))
        .route(
            "/categorias/{id}",
            get(get_categoria)
                .put(update_categoria)
                .delete(delete_categoria),
        )
        .route("/proveedores", get(list_proveedores).post(create_proveedor))
        .route(
            "/proveedores/{id}",
            get(get_proveedor)
                .put(update_proveedor)
                .delete(delete_proveedor),
        )
        .route("/productos", get(list_productos).post(create_producto))
        .route(
            "/productos/{id}",
            get(get_producto).put(update_producto).delete(delete_producto),
        )
        .route("/inventario", get(list_inventario).post(create_inventario))
        .route(
            "/inventario/{id}",
            get(get_inventario)
                .put(update_inventario)
                .delete(delete_inventario),
        )
        .route("/ventas", get(list_ventas).post(create_venta))
        .route(
            "/ventas/{id}",
            get(get_venta).put(update_venta).delete(delete_venta),
        )
        .route("/usuarios", get(list_usuarios).post(create_usuario))
        .route(
            "/usuarios/{id}",
            get(get_usuario).put(update_usuario).delete(delete_usuario),
        )
        .route("/auditoria", get(list_auditoria));
    let protected = middleware::auth::access::apply(protected, state);

    public.merge(protected)
}

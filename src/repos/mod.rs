/*
 * Responsibility
 * - SQLx data access, one module per table
 * - Runtime-checked queries (query_as::<_, Row>) so the crate builds without a database
 */
pub mod auditoria_repo;
pub mod auth_session_repo;
pub mod categoria_repo;
pub mod error;
pub mod inventario_repo;
pub mod producto_repo;
pub mod proveedor_repo;
pub mod refresh_token_repo;
pub mod user_repo;
pub mod venta_repo;

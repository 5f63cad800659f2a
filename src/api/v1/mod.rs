/*
 * Responsibility
 * - v1 surface: routes() plus the pieces handlers and middleware share
 */
pub mod cookies;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;

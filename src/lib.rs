//! Minimarket backend and its authenticated request client.
//!
//! - Server: axum API under `/api/v1` (see [`app::build_router`]) backed by
//!   Postgres, with cookie sessions and refresh-token rotation.
//! - Client: [`client::ApiClient`], which retries a request once after a
//!   single-flight token refresh and navigates to login when that fails.

pub mod api;
pub mod app;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repos;
pub mod services;
pub mod state;

/*
 * Responsibility
 * - Config → pool → AppState → Router
 * - Middleware order (outermost last): security headers, CORS, http layers
 * - axum::serve() with graceful shutdown
 * - create-user: seed an account from the command line
 */
use std::{panic, process};

use anyhow::{Context, Result, bail};
use axum::Router;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::models::Rol;
use crate::repos::user_repo;
use crate::services::auth::password::hash_password;
use crate::state::AppState;

const MAX_DB_CONNECTIONS: u32 = 10;

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,minimarket=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development fails fast; production keeps serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

async fn connect(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let db = connect(&config).await?;
    let state = AppState::new(&config, db);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Full application router: `/api/v1` plus every global layer.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

/// `minimarket create-user <email> <password> <rol> [nombre completo]`
pub async fn create_user(args: &[String]) -> Result<()> {
    init_tracing();

    let [email, password, rol, rest @ ..] = args else {
        bail!("usage: create-user <email> <password> <rol> [nombre completo]");
    };
    let rol: Rol = rol.parse()?;
    let nombre = (!rest.is_empty()).then(|| rest.join(" "));

    let config = Config::from_env()?;
    let db = connect(&config).await?;

    let hash = hash_password(password)?;
    let user = user_repo::create(&db, email, &hash, rol, nombre.as_deref())
        .await
        .context("failed to create user")?;

    tracing::info!(user_id = %user.id, email = %user.email, rol = %user.rol, "user created");
    Ok(())
}

//! Tests against a real Postgres. Skipped unless `TEST_DATABASE_URL` is set.

mod common;

use std::sync::Arc;

use chrono::Utc;
use reqwest::cookie::Jar;
use sqlx::PgPool;

use common::{TestDb, with_db};
use minimarket::app::build_router;
use minimarket::client::{ApiClient, HeadlessNavigator};
use minimarket::config::Config;
use minimarket::error::AppError;
use minimarket::models::{
    Credentials, EstadoVenta, ListQuery, NewCategoria, NewInventario, NewProducto, NewProveedor,
    NewUsuario, NewVenta, Rol, TipoComprobante, Usuario, UsuarioPatch,
};
use minimarket::repos::error::RepoError;
use minimarket::repos::{categoria_repo, inventario_repo, producto_repo, user_repo, venta_repo};
use minimarket::services::auth::password::hash_password;
use minimarket::state::AppState;

const PASSWORD: &str = "caja-segura-1";
const SECRET: &str = "db-tests-secret-with-at-least-32-bytes!!";

fn state_for(db: &TestDb) -> AppState {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some(db.url.clone()),
        "JWT_SECRET" => Some(SECRET.to_string()),
        _ => None,
    })
    .unwrap();
    AppState::new(&config, db.pool.clone())
}

async fn seed_user(pool: &PgPool, email: &str, rol: Rol) -> Usuario {
    let hash = hash_password(PASSWORD).unwrap();
    user_repo::create(pool, email, &hash, rol, Some("Usuario de prueba"))
        .await
        .unwrap()
}

async fn seed_producto(pool: &PgPool, nombre: &str) -> i64 {
    let categoria = categoria_repo::create(pool, &NewCategoria::new(format!("Cat {nombre}")))
        .await
        .unwrap();
    let producto = producto_repo::create(pool, &producto(categoria.id, nombre))
        .await
        .unwrap();
    producto.id
}

fn producto(categoria_id: i64, nombre: &str) -> NewProducto {
    NewProducto {
        categoria_id,
        proveedor_id: None,
        nombre: nombre.to_string(),
        descripcion: None,
        codigo_barras: None,
        precio_costo: 2.5,
        precio_venta: 3.2,
        stock_minimo: 5,
        imagen_url: None,
        activo: true,
    }
}

fn venta(numero: &str) -> NewVenta {
    NewVenta {
        numero_venta: numero.to_string(),
        tipo_comprobante: TipoComprobante::Boleta,
        cliente_nombre: None,
        cliente_documento: None,
        subtotal: 10.0,
        descuento: 0.0,
        impuesto: 1.8,
        total: 11.8,
        estado: EstadoVenta::Pendiente,
        observaciones: None,
    }
}

async fn serve(state: AppState) -> String {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://unused".to_string()),
        "JWT_SECRET" => Some(SECRET.to_string()),
        _ => None,
    })
    .unwrap();
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn session_lifecycle_through_the_client() {
    with_db(|db| async move {
        let state = state_for(&db);
        seed_user(&db.pool, "admin@minimarket.test", Rol::Administrador).await;
        let origin = serve(state.clone()).await;

        let jar = Arc::new(Jar::default());
        let navigator = Arc::new(HeadlessNavigator::at("/inventario"));
        let client = ApiClient::builder()
            .base_url(&origin)
            .navigator(navigator.clone())
            .cookie_jar(jar.clone())
            .build()
            .unwrap();

        let user = client
            .login(&Credentials::new("ADMIN@minimarket.test", PASSWORD))
            .await
            .unwrap();
        assert_eq!(user.rol, Rol::Administrador);

        let categoria = client
            .create_categoria(&NewCategoria::new("Abarrotes"))
            .await
            .unwrap();
        let proveedor = client
            .create_proveedor(&NewProveedor {
                nombre: "Alicorp".into(),
                ruc: Some("20100055237".into()),
                telefono: None,
                email: Some("ventas@alicorp.test".into()),
                direccion: None,
                activo: true,
            })
            .await
            .unwrap();
        let mut nuevo = producto(categoria.id, "Arroz extra");
        nuevo.proveedor_id = Some(proveedor.id);
        let arroz = client.create_producto(&nuevo).await.unwrap();

        let stock = NewInventario {
            producto_id: arroz.id,
            variante_id: None,
            stock_actual: 40,
            stock_reservado: 0,
        };
        client.create_inventario(&stock).await.unwrap();
        let err = client.create_inventario(&stock).await.unwrap_err();
        assert_eq!(err.status, 400);
        assert!(err.has_code("BAD_REQUEST"));

        // Category still referenced by a product.
        let err = client.delete_categoria(categoria.id).await.unwrap_err();
        assert_eq!(err.status, 400);

        let trail = client.list_auditoria(&ListQuery::default()).await.unwrap();
        let tablas: Vec<_> = trail.iter().map(|a| a.tabla.as_str()).collect();
        for tabla in ["usuarios", "categorias", "proveedores", "productos", "inventario"] {
            assert!(tablas.contains(&tabla), "no audit row for {tabla}");
        }

        // Swap in an expired access token; the next call must refresh.
        let now = Utc::now().timestamp();
        let expired = state
            .tokens
            .access()
            .issue_at(user.id, &user.email, user.rol, now - 120, now - 60)
            .unwrap();
        jar.add_cookie_str(
            &format!("access_token={expired}; Path=/"),
            &origin.parse().unwrap(),
        );
        let rows = client.list_inventario(&ListQuery::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(navigator.visits().is_empty());

        let rotated: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM refresh_tokens WHERE revoked_at IS NOT NULL AND replaced_by IS NOT NULL",
        )
        .fetch_one(&db.pool)
        .await
        .unwrap();
        assert_eq!(rotated, 1);

        client.logout().await.unwrap();
        let live: i64 =
            sqlx::query_scalar("SELECT count(*) FROM refresh_tokens WHERE revoked_at IS NULL")
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert_eq!(live, 0);

        let err = client.current_user().await.unwrap_err();
        assert!(err.has_code("TOKEN_MISSING"));
        assert_eq!(navigator.visits(), vec!["/login?redirect=%2Finventario"]);

        db
    })
    .await;
}

#[tokio::test]
async fn concurrent_refresh_of_one_token_has_a_single_winner() {
    with_db(|db| async move {
        let state = state_for(&db);
        seed_user(&db.pool, "caja@minimarket.test", Rol::Vendedor).await;
        let pair = state
            .tokens
            .login("caja@minimarket.test", PASSWORD)
            .await
            .unwrap();

        let (a, b) = tokio::join!(
            state.tokens.refresh(&pair.refresh_token),
            state.tokens.refresh(&pair.refresh_token),
        );

        let winners = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(winners, 1);
        for result in [&a, &b] {
            if let Err(e) = result {
                assert!(matches!(e, AppError::RefreshTokenExpired), "{e:?}");
            }
        }

        // Replaying the rotated token never works again.
        let replay = state.tokens.refresh(&pair.refresh_token).await;
        assert!(matches!(replay, Err(AppError::RefreshTokenExpired)));

        let live: i64 =
            sqlx::query_scalar("SELECT count(*) FROM refresh_tokens WHERE revoked_at IS NULL")
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert_eq!(live, 1);

        db
    })
    .await;
}

#[tokio::test]
async fn constraint_violations_map_to_repo_errors() {
    with_db(|db| async move {
        let producto_id = seed_producto(&db.pool, "Leche").await;
        let vendedor = seed_user(&db.pool, "v@minimarket.test", Rol::Vendedor).await;

        let sin_variante = NewInventario {
            producto_id,
            variante_id: None,
            stock_actual: 10,
            stock_reservado: 0,
        };
        inventario_repo::create(&db.pool, &sin_variante).await.unwrap();
        let dup = inventario_repo::create(&db.pool, &sin_variante).await;
        assert!(matches!(dup, Err(RepoError::Conflict)), "{dup:?}");

        let huerfano = NewInventario {
            producto_id: producto_id + 1000,
            ..sin_variante.clone()
        };
        let fk = inventario_repo::create(&db.pool, &huerfano).await;
        assert!(matches!(fk, Err(RepoError::ForeignKey)), "{fk:?}");

        let otro = seed_producto(&db.pool, "Pan").await;
        let sobre_reservado = NewInventario {
            producto_id: otro,
            variante_id: None,
            stock_actual: 1,
            stock_reservado: 5,
        };
        let check = inventario_repo::create(&db.pool, &sobre_reservado).await;
        assert!(matches!(check, Err(RepoError::Check)), "{check:?}");

        venta_repo::create(&db.pool, vendedor.id, &venta("B001-1"))
            .await
            .unwrap();
        let dup = venta_repo::create(&db.pool, vendedor.id, &venta("B001-1")).await;
        assert!(matches!(dup, Err(RepoError::Conflict)), "{dup:?}");

        let dup = user_repo::create(&db.pool, "V@MINIMARKET.TEST", "hash", Rol::Auditor, None).await;
        assert!(matches!(dup, Err(RepoError::Conflict)), "{dup:?}");

        db
    })
    .await;
}

#[tokio::test]
async fn list_queries_search_and_paginate() {
    with_db(|db| async move {
        let categoria = categoria_repo::create(&db.pool, &NewCategoria::new("Bebidas"))
            .await
            .unwrap();
        for nombre in ["Agua 1L", "Agua 2L", "Gaseosa", "Jugo 100%", "Jugo_natural"] {
            producto_repo::create(&db.pool, &producto(categoria.id, nombre))
                .await
                .unwrap();
        }

        let names = |rows: Vec<minimarket::models::Producto>| {
            rows.into_iter().map(|p| p.nombre).collect::<Vec<_>>()
        };

        let all = producto_repo::list(&db.pool, &ListQuery::default()).await.unwrap();
        assert_eq!(all.len(), 5);

        let agua = producto_repo::list(&db.pool, &ListQuery::default().with_search("agua"))
            .await
            .unwrap();
        assert_eq!(agua.len(), 2);

        // Wildcards in the term are literal.
        let pct = producto_repo::list(&db.pool, &ListQuery::default().with_search("100%"))
            .await
            .unwrap();
        assert_eq!(names(pct), vec!["Jugo 100%"]);
        let underscore = producto_repo::list(&db.pool, &ListQuery::default().with_search("o_n"))
            .await
            .unwrap();
        assert_eq!(names(underscore), vec!["Jugo_natural"]);

        let first = producto_repo::list(&db.pool, &ListQuery::page(2, 0)).await.unwrap();
        let second = producto_repo::list(&db.pool, &ListQuery::page(2, 2)).await.unwrap();
        let tail = producto_repo::list(&db.pool, &ListQuery::page(2, 4)).await.unwrap();
        assert_eq!((first.len(), second.len(), tail.len()), (2, 2, 1));
        let mut seen: Vec<_> = [first, second, tail]
            .into_iter()
            .flat_map(names)
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 5);

        let beyond = producto_repo::list(&db.pool, &ListQuery::page(10, 50)).await.unwrap();
        assert!(beyond.is_empty());

        db
    })
    .await;
}

#[tokio::test]
async fn deactivated_user_can_no_longer_log_in_or_refresh() {
    with_db(|db| async move {
        let state = state_for(&db);
        let admin = seed_user(&db.pool, "admin@minimarket.test", Rol::Administrador).await;
        let nuevo = NewUsuario {
            email: "almacen@minimarket.test".into(),
            password: PASSWORD.into(),
            rol: Rol::Almacenero,
            nombre_completo: None,
        };
        let hash = hash_password(&nuevo.password).unwrap();
        let almacen = user_repo::create(&db.pool, &nuevo.email, &hash, nuevo.rol, None)
            .await
            .unwrap();
        let pair = state.tokens.login(&nuevo.email, PASSWORD).await.unwrap();

        let patch = UsuarioPatch {
            rol: Some(Rol::Vendedor),
            ..Default::default()
        };
        let updated = user_repo::update(&db.pool, almacen.id, &patch, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.rol, Rol::Vendedor);
        assert!(serde_json::to_value(&updated).unwrap().get("password_hash").is_none());

        assert!(user_repo::deactivate(&db.pool, almacen.id).await.unwrap());
        assert!(!user_repo::deactivate(&db.pool, almacen.id).await.unwrap());

        let login = state.tokens.login(&nuevo.email, PASSWORD).await;
        assert!(matches!(login, Err(AppError::InvalidCredentials)));
        let refresh = state.tokens.refresh(&pair.refresh_token).await;
        assert!(matches!(refresh, Err(AppError::RefreshTokenExpired)));

        let activos = user_repo::list(&db.pool, &ListQuery::default()).await.unwrap();
        assert!(activos.iter().any(|u| u.id == admin.id));

        db
    })
    .await;
}

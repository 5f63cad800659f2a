//! Disposable Postgres databases for the integration tests.
//!
//! `TEST_DATABASE_URL` points at a server the tests may create databases on.
//! Each test gets its own freshly migrated database, dropped afterwards.

use std::future::Future;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use url::Url;
use uuid::Uuid;

pub const ENV_URL: &str = "TEST_DATABASE_URL";

pub struct TestDb {
    pub pool: PgPool,
    pub url: String,
    admin: PgPool,
    name: String,
}

impl TestDb {
    async fn create(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).context("invalid postgres connection url")?;
        let name = format!("minimarket_test_{}", Uuid::new_v4().simple());

        let mut admin_url = parsed.clone();
        admin_url.set_path("/postgres");
        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(admin_url.as_str())
            .await
            .context("failed to connect to the admin database")?;
        admin
            .execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
            .await
            .context("failed to issue CREATE DATABASE")?;

        let mut url = parsed;
        url.set_path(&format!("/{name}"));
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url.as_str())
            .await
            .context("failed to connect to the test database")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;

        Ok(Self {
            pool,
            url: url.to_string(),
            admin,
            name,
        })
    }

    async fn drop_database(self) -> Result<()> {
        self.pool.close().await;
        self.admin
            .execute(format!(r#"DROP DATABASE IF EXISTS "{}" WITH (FORCE)"#, self.name).as_str())
            .await
            .context("failed to drop test database")?;
        Ok(())
    }
}

/// Run `test` against a fresh database, or skip when no server is configured.
pub async fn with_db<F, Fut>(test: F)
where
    F: FnOnce(TestDb) -> Fut,
    Fut: Future<Output = TestDb>,
{
    let Ok(base_url) = std::env::var(ENV_URL) else {
        eprintln!("skipping database test: {ENV_URL} not set");
        return;
    };
    let db = TestDb::create(&base_url).await.unwrap();
    let db = test(db).await;
    db.drop_database().await.unwrap();
}

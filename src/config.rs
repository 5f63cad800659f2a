/*
 * Responsibility
 * - Load settings from the environment (DATABASE_URL, CORS allowlist, token secrets and lifetimes)
 * - Validate them up front so a bad deployment fails at startup
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Upper bound for every `*_SECONDS` setting (ten years). Keeps the
/// `as i64` conversions in the token services and cookie `Max-Age` in range.
pub const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var("APP_ENV").ok())
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // HS256 signing key for access tokens
    pub jwt_secret: String,
    // Token lifetimes (seconds)
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    pub access_token_leeway_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the database url or the signing secret.
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("access_token_leeway_seconds", &self.access_token_leeway_seconds)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let access_token_ttl_seconds = seconds(&lookup, "ACCESS_TOKEN_TTL_SECONDS", 900)?; // 15 min
        let refresh_token_ttl_seconds = seconds(&lookup, "REFRESH_TOKEN_TTL_SECONDS", 604_800)?; // 7 days
        let access_token_leeway_seconds = seconds(&lookup, "ACCESS_TOKEN_LEEWAY_SECONDS", 0)?;

        if access_token_ttl_seconds == 0 {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"));
        }
        if refresh_token_ttl_seconds < access_token_ttl_seconds {
            return Err(ConfigError::Invalid("REFRESH_TOKEN_TTL_SECONDS"));
        }

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            access_token_leeway_seconds,
        })
    }
}

fn seconds<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key))?,
        None => default,
    };
    if value > MAX_TTL_SECONDS {
        return Err(ConfigError::Invalid(key));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/minimarket"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert!(config.cors_allowed_origins.is_empty());
        assert_eq!(config.access_token_ttl_seconds, 900);
        assert_eq!(config.refresh_token_ttl_seconds, 604_800);
        assert_eq!(config.access_token_leeway_seconds, 0);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://db/minimarket"),
            ("APP_ENV", "PROD"),
            ("CORS_ALLOWED_ORIGINS", "https://a.test, ,https://b.test"),
            ("JWT_SECRET", SECRET),
            ("ACCESS_TOKEN_TTL_SECONDS", "60"),
        ]))
        .unwrap();

        assert_eq!(config.addr.port(), 8080);
        assert!(config.app_env.is_production());
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.test".to_string(), "https://b.test".to_string()]
        );
        assert_eq!(config.access_token_ttl_seconds, 60);
    }

    #[test]
    fn rejects_missing_and_weak_settings() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/minimarket"),
            ("JWT_SECRET", "short"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Invalid("JWT_SECRET"));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/minimarket"),
            ("JWT_SECRET", SECRET),
            ("PORT", "http"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Invalid("PORT"));
    }

    #[test]
    fn refresh_must_outlive_access() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/minimarket"),
            ("JWT_SECRET", SECRET),
            ("ACCESS_TOKEN_TTL_SECONDS", "3600"),
            ("REFRESH_TOKEN_TTL_SECONDS", "60"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Invalid("REFRESH_TOKEN_TTL_SECONDS"));
    }

    #[test]
    fn durations_are_capped() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/minimarket"),
            ("JWT_SECRET", SECRET),
            ("REFRESH_TOKEN_TTL_SECONDS", "18446744073709551615"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Invalid("REFRESH_TOKEN_TTL_SECONDS"));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/minimarket"),
            ("JWT_SECRET", SECRET),
            ("ACCESS_TOKEN_LEEWAY_SECONDS", &(MAX_TTL_SECONDS + 1).to_string()),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Invalid("ACCESS_TOKEN_LEEWAY_SECONDS"));

        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/minimarket"),
            ("JWT_SECRET", SECRET),
            ("REFRESH_TOKEN_TTL_SECONDS", &MAX_TTL_SECONDS.to_string()),
        ]))
        .unwrap();
        assert_eq!(config.refresh_token_ttl_seconds, MAX_TTL_SECONDS);
    }

    #[test]
    fn debug_hides_secrets() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://user:pw@db/minimarket"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();
        let shown = format!("{config:?}");
        assert!(!shown.contains(SECRET));
        assert!(!shown.contains("pw@db"));
    }
}

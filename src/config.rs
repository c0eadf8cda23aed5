use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

/// Used when `JWT_SECRET` is not set. Anyone who knows it can mint tokens,
/// so production deployments must override it.
pub const FALLBACK_JWT_SECRET: &str = "skwela-alert-secret-key-2024";

pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    /// Production deployments talk to the database over TLS.
    pub production: bool,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let db_max_connections = match std::env::var("DB_MAX_CONNECTIONS") {
            Ok(v) => v
                .parse::<u32>()
                .with_context(|| format!("invalid DB_MAX_CONNECTIONS: {v}"))?,
            Err(_) => 10,
        };

        let production = std::env::var("APP_ENV")
            .or_else(|_| std::env::var("NODE_ENV"))
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let port = match std::env::var("PORT").or_else(|_| std::env::var("APP_PORT")) {
            Ok(v) => v.parse::<u16>().with_context(|| format!("invalid PORT: {v}"))?,
            Err(_) => 3000,
        };

        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                warn!("JWT_SECRET not set; falling back to the built-in secret");
                FALLBACK_JWT_SECRET.to_string()
            }
        };

        Ok(Self {
            database_url,
            db_max_connections,
            production,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            jwt: JwtConfig {
                secret,
                ttl_days: TOKEN_TTL_DAYS,
            },
        })
    }
}

// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

use crate::{
    common::error::ConfigError,
    db::{ProfileRepository, SessionRepository, UserRepository},
    services::{auth::AuthService, profile::DEFAULT_PROFILE_TIMEOUT, registry::StoreRegistry},
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_TTL_DAYS: i64 = 7;
const DEFAULT_CLIENT_IDLE_SECS: u64 = 30 * 60;

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub profile_timeout: Duration,
    pub session_ttl: chrono::Duration,
    // Clientes sem requisições por mais tempo que isso perdem o store
    pub client_idle: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let positive = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or(ConfigError::Invalid { key, value: raw }),
            }
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let profile_timeout = Duration::from_secs(positive("PROFILE_TIMEOUT_SECS", DEFAULT_PROFILE_TIMEOUT.as_secs())?);
        let ttl_days = positive("SESSION_TTL_DAYS", DEFAULT_SESSION_TTL_DAYS as u64)?;
        let client_idle = Duration::from_secs(positive("CLIENT_IDLE_SECS", DEFAULT_CLIENT_IDLE_SECS)?);

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            profile_timeout,
            session_ttl: chrono::Duration::days(ttl_days as i64),
            client_idle,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    // Um store de sessão por instância de aplicação (x-client-id)
    pub registry: StoreRegistry,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let profile_repo = ProfileRepository::new(db_pool.clone());
        let session_repo = SessionRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo,
            profile_repo.clone(),
            session_repo,
            config.jwt_secret.clone(),
            config.session_ttl,
            db_pool.clone(),
        );

        let registry = StoreRegistry::new(
            Arc::new(auth_service.clone()),
            Arc::new(profile_repo),
            config.profile_timeout,
        );

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            registry,
        })
    }
}

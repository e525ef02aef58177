// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::{error::AppError, i18n::I18nStore},
    db::{MemoryRecordStore, PgRecordStore, RecordStore},
    services::{
        auth::AuthService,
        notification::{DisabledNotifier, Notifier, ResendNotifier},
        record_service::RecordService,
        shift_service::ShiftService,
        tenancy::{build_resolver, TenantStrategy},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow::anyhow!("STORE_BACKEND desconhecido: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub session_ttl_days: i64,
    pub tenant_strategy: TenantStrategy,
    pub app_id: String,
    pub resend_api_key: Option<String>,
    pub notification_from: String,
    pub notification_fallback_recipient: Option<String>,
    pub notification_recipient: Option<String>,
    pub client_origin: String,
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{} inválido ({}): {}", key, raw, e)),
        None => Ok(default),
    }
}

impl Settings {
    /// Valores padrão para desenvolvimento e testes (store em memória).
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 4000,
            store_backend: StoreBackend::Memory,
            database_url: None,
            db_max_connections: 5,
            jwt_secret: jwt_secret.into(),
            session_ttl_days: 7,
            tenant_strategy: TenantStrategy::Fixed,
            app_id: "default-app-id".to_string(),
            resend_api_key: None,
            notification_from: "onboarding@resend.dev".to_string(),
            notification_fallback_recipient: None,
            notification_recipient: None,
            client_origin: "http://localhost:5173".to_string(),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = optional("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let defaults = Self::new(jwt_secret);

        let store_backend = parsed("STORE_BACKEND", StoreBackend::Postgres)?;
        let database_url = optional("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL deve ser definida quando STORE_BACKEND=postgres");
        }

        Ok(Self {
            bind_addr: optional("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parsed("PORT", defaults.port)?,
            store_backend,
            database_url,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            session_ttl_days: parsed("SESSION_TTL_DAYS", defaults.session_ttl_days)?,
            tenant_strategy: parsed("TENANT_STRATEGY", defaults.tenant_strategy)?,
            app_id: optional("APP_ID").unwrap_or(defaults.app_id),
            resend_api_key: optional("RESEND_API_KEY"),
            notification_from: optional("NOTIFICATION_FROM_EMAIL").unwrap_or(defaults.notification_from),
            notification_fallback_recipient: optional("NOTIFICATION_FALLBACK_RECIPIENT"),
            notification_recipient: optional("NOTIFICATION_RECIPIENT"),
            client_origin: optional("CLIENT_ORIGIN").unwrap_or(defaults.client_origin),
            jwt_secret: defaults.jwt_secret,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn build_notifier(&self) -> Result<Arc<dyn Notifier>, AppError> {
        Ok(match &self.resend_api_key {
            Some(key) => Arc::new(ResendNotifier::new(
                key.clone(),
                self.notification_from.clone(),
                self.notification_fallback_recipient.clone(),
            )?),
            None => Arc::new(DisabledNotifier),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: Option<PgPool>,
    pub settings: Arc<Settings>,
    pub i18n_store: I18nStore,
    pub notifier: Arc<dyn Notifier>,
    // --- Serviços ---
    pub auth_service: AuthService,
    pub record_service: RecordService,
    pub shift_service: ShiftService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let settings = Settings::from_env()?;

        let db_pool = match (settings.store_backend, &settings.database_url) {
            (StoreBackend::Postgres, Some(database_url)) => {
                // Conecta ao banco de dados, usando '?' para propagar erros
                let pool = PgPoolOptions::new()
                    .max_connections(settings.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
                Some(pool)
            }
            _ => {
                tracing::warn!("⚠️ STORE_BACKEND=memory: os dados somem ao reiniciar");
                None
            }
        };

        let store: Arc<dyn RecordStore> = match &db_pool {
            Some(pool) => Arc::new(PgRecordStore::new(pool.clone())),
            None => Arc::new(MemoryRecordStore::new()),
        };
        let notifier = settings.build_notifier()?;

        let mut state = Self::from_parts(settings, store, notifier)?;
        state.db_pool = db_pool;
        Ok(state)
    }

    /// Monta o gráfico de dependências a partir de peças prontas (também usado nos testes).
    pub fn from_parts(
        settings: Settings,
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppError> {
        let resolver = build_resolver(settings.tenant_strategy, &settings.app_id, store.clone())?;

        let auth_service = AuthService::new(resolver, settings.jwt_secret.clone(), settings.session_ttl_days);
        let record_service = RecordService::new(store);
        let shift_service = ShiftService::new(
            record_service.clone(),
            notifier.clone(),
            settings.notification_recipient.clone(),
        );

        Ok(Self {
            db_pool: None,
            settings: Arc::new(settings),
            i18n_store: I18nStore::default(),
            notifier,
            auth_service,
            record_service,
            shift_service,
        })
    }
}

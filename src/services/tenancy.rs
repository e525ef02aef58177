// src/services/tenancy.rs

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::{
        auth::{UserProfile, DEFAULT_USER_NAME},
        workforce::TenantId,
    },
};

/// Decide o tenant de um usuário no momento do login.
///
/// Só uma estratégia fica ativa por instalação: misturar estratégias no mesmo
/// banco quebra o isolamento entre tenants.
#[async_trait]
pub trait TenantResolver: Send + Sync {
    /// `requested` é o appId enviado pelo cliente (pode ser ignorado).
    async fn resolve(&self, user_id: Uuid, requested: Option<&str>) -> Result<TenantId, AppError>;

    fn strategy(&self) -> TenantStrategy;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantStrategy {
    Fixed,
    UserId,
    Profile,
}

impl FromStr for TenantStrategy {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(TenantStrategy::Fixed),
            "user-id" | "user_id" => Ok(TenantStrategy::UserId),
            "profile" => Ok(TenantStrategy::Profile),
            other => Err(anyhow::anyhow!("TENANT_STRATEGY desconhecida: {}", other)),
        }
    }
}

// ---
// 1. Tenant fixo (APP_ID): todos os usuários da instalação compartilham os dados.
// ---
pub struct FixedTenantResolver {
    tenant: TenantId,
}

impl FixedTenantResolver {
    pub fn new(app_id: &str) -> Result<Self, AppError> {
        Ok(Self { tenant: TenantId::new(app_id)? })
    }
}

#[async_trait]
impl TenantResolver for FixedTenantResolver {
    async fn resolve(&self, _user_id: Uuid, requested: Option<&str>) -> Result<TenantId, AppError> {
        if let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) {
            if requested != self.tenant.as_str() {
                tracing::warn!(
                    "⚠️ appId '{}' ignorado, usando o tenant configurado '{}'",
                    requested,
                    self.tenant
                );
            }
        }
        Ok(self.tenant.clone())
    }

    fn strategy(&self) -> TenantStrategy {
        TenantStrategy::Fixed
    }
}

// ---
// 2. O próprio id do usuário é o tenant.
// ---
pub struct UserIdTenantResolver;

#[async_trait]
impl TenantResolver for UserIdTenantResolver {
    async fn resolve(&self, user_id: Uuid, _requested: Option<&str>) -> Result<TenantId, AppError> {
        TenantId::new(user_id.to_string())
    }

    fn strategy(&self) -> TenantStrategy {
        TenantStrategy::UserId
    }
}

// ---
// 3. UUID gerado no primeiro login e guardado no perfil do usuário.
// ---
pub struct ProfileTenantResolver {
    store: Arc<dyn RecordStore>,
}

impl ProfileTenantResolver {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TenantResolver for ProfileTenantResolver {
    async fn resolve(&self, user_id: Uuid, _requested: Option<&str>) -> Result<TenantId, AppError> {
        if let Some(profile) = self.store.find_profile_by_user(user_id).await? {
            return Ok(profile.tenant_id);
        }

        let tenant_id = TenantId::new(Uuid::new_v4().to_string())?;
        let profile = self
            .store
            .upsert_profile(UserProfile {
                user_id,
                tenant_id: tenant_id.clone(),
                name: DEFAULT_USER_NAME.to_string(),
                updated_at: Utc::now(),
            })
            .await?;

        tracing::info!("🏢 Novo tenant {} criado para o usuário {}", profile.tenant_id, user_id);
        Ok(profile.tenant_id)
    }

    fn strategy(&self) -> TenantStrategy {
        TenantStrategy::Profile
    }
}

pub fn build_resolver(
    strategy: TenantStrategy,
    app_id: &str,
    store: Arc<dyn RecordStore>,
) -> Result<Arc<dyn TenantResolver>, AppError> {
    let resolver: Arc<dyn TenantResolver> = match strategy {
        TenantStrategy::Fixed => Arc::new(FixedTenantResolver::new(app_id)?),
        TenantStrategy::UserId => Arc::new(UserIdTenantResolver),
        TenantStrategy::Profile => Arc::new(ProfileTenantResolver::new(store)),
    };
    Ok(resolver)
}

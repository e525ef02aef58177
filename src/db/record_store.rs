// src/db/record_store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::UserProfile,
        record::{Record, RecordKind, RecordPatch},
        workforce::TenantId,
    },
};

/// Persistência das quatro tabelas + perfis, sempre filtrada por tenant.
///
/// Um id que existe sob outro tenant é tratado como inexistente
/// (`RecordNotFound`), nunca como erro de permissão.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Grava o registro com o tenant da sessão (sobrescreve o que vier no registro).
    async fn insert(&self, tenant: &TenantId, record: Record) -> Result<Record, AppError>;

    async fn find(&self, tenant: &TenantId, kind: RecordKind, id: Uuid) -> Result<Option<Record>, AppError>;

    /// Atualização parcial casando (id, tenant). Last writer wins.
    async fn update(
        &self,
        tenant: &TenantId,
        kind: RecordKind,
        id: Uuid,
        patch: RecordPatch,
    ) -> Result<Record, AppError>;

    async fn delete(&self, tenant: &TenantId, kind: RecordKind, id: Uuid) -> Result<(), AppError>;

    async fn list(&self, tenant: &TenantId, kind: RecordKind) -> Result<Vec<Record>, AppError>;

    // --- Perfis ---

    async fn find_profile(&self, tenant: &TenantId, user_id: Uuid) -> Result<Option<UserProfile>, AppError>;

    /// Perfil mais antigo do usuário, em qualquer tenant (usado pela estratégia "profile").
    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError>;

    async fn upsert_profile(&self, profile: UserProfile) -> Result<UserProfile, AppError>;
}

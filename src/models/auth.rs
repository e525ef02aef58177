// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::validation::not_blank,
    models::{
        shift::Shift,
        workforce::{Employee, Job, Material, TenantId},
    },
};

/// Nome exibido quando o usuário ainda não preencheu o perfil.
pub const DEFAULT_USER_NAME: &str = "Utilizator";

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,          // Subject (ID do usuário anônimo)
    pub tenant: TenantId,   // Tenant resolvido no momento do login
    pub exp: usize,         // Expiration time
    pub iat: usize,         // Issued At
}

// Usuário da sessão, já com o tenant resolvido. É o que vai nos extensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub tenant_id: TenantId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: Uuid,
    pub tenant_id: TenantId,
    #[schema(example = "Alice Ionescu")]
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousSignInPayload {
    // Só é levado em conta quando a estratégia de tenant é "fixed".
    #[serde(default)]
    #[schema(example = "default-app-id")]
    pub app_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: Uuid,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserRef,
    pub tenant_id: TenantId,
    pub token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProfilePayload {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Alice Ionescu")]
    pub name: String,
}

// Tudo o que o cliente precisa para montar as telas depois do login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapResponse {
    pub user: SessionUser,
    pub user_name: String,
    pub employees: Vec<Employee>,
    pub jobs: Vec<Job>,
    pub materials: Vec<Material>,
    pub shifts: Vec<Shift>,
}

// GET /auth/session: `user` nulo quando não há sessão válida.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
}

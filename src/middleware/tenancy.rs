// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, models::workforce::TenantId};

// Tenant da sessão. Inserido pelo `session_guard` a partir do token,
// nunca lido do corpo ou de cabeçalhos do cliente.
#[derive(Debug, Clone)]
pub struct TenantContext(pub TenantId);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .ok_or(AppError::MissingTenant)
    }
}

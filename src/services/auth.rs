// src/services/auth.rs

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{Claims, SessionResponse, SessionUser, UserRef},
        workforce::TenantId,
    },
    services::tenancy::TenantResolver,
};

#[derive(Clone)]
pub struct AuthService {
    resolver: Arc<dyn TenantResolver>,
    jwt_secret: String,
    session_ttl_days: i64,
}

impl AuthService {
    pub fn new(resolver: Arc<dyn TenantResolver>, jwt_secret: String, session_ttl_days: i64) -> Self {
        Self { resolver, jwt_secret, session_ttl_days }
    }

    /// Login anônimo: cria o usuário, resolve o tenant e emite o token.
    /// O tenant fica gravado no token, então não muda durante a sessão.
    pub async fn sign_in_anonymous(&self, app_id: Option<&str>) -> Result<SessionResponse, AppError> {
        let user_id = Uuid::new_v4();
        let tenant_id = self.resolver.resolve(user_id, app_id).await?;
        let token = self.create_token(user_id, &tenant_id)?;

        tracing::info!("🔑 Sessão anônima {} aberta no tenant {}", user_id, tenant_id);

        Ok(SessionResponse {
            user: UserRef { id: user_id },
            tenant_id,
            token,
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<SessionUser, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Token antigo sem tenant não serve
        let tenant_id = TenantId::new(token_data.claims.tenant.0).map_err(|_| AppError::InvalidToken)?;

        Ok(SessionUser {
            id: token_data.claims.sub,
            tenant_id,
        })
    }

    fn create_token(&self, user_id: Uuid, tenant_id: &TenantId) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.session_ttl_days);

        let claims = Claims {
            sub: user_id,
            tenant: tenant_id.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

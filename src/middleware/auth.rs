// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::auth::SessionUser,
};

/// Valida o Bearer token e coloca usuário + tenant nos extensions.
pub async fn session_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&app_state, request.headers())
        .map_err(|err| err.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(TenantContext(user.tenant_id.clone()));
    request.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(request).await)
}

pub fn authenticate(app_state: &AppState, headers: &HeaderMap) -> Result<SessionUser, AppError> {
    let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() else {
        return Err(AppError::InvalidToken);
    };
    app_state.auth_service.validate_token(bearer.token())
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub SessionUser);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

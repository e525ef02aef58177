// src/handlers/auth.rs

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::authenticate, i18n::Locale},
    models::auth::{AnonymousSignInPayload, SessionInfo, SessionResponse, UserRef},
};

// POST /auth/anonymous
#[utoipa::path(
    post,
    path = "/auth/anonymous",
    tag = "Auth",
    request_body(content = AnonymousSignInPayload, description = "Corpo opcional"),
    responses(
        (status = 201, description = "Sessão anônima criada", body = SessionResponse),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn sign_in_anonymous(
    State(app_state): State<AppState>,
    locale: Locale,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // Corpo vazio é aceito: o appId só importa na estratégia "fixed".
    let payload: AnonymousSignInPayload = if body.iter().all(u8::is_ascii_whitespace) {
        AnonymousSignInPayload::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::InvalidPayload(e.to_string()).to_api_error(&locale, &app_state.i18n_store))?
    };

    let session = app_state
        .auth_service
        .sign_in_anonymous(payload.app_id.as_deref())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(session)))
}

// GET /auth/session
#[utoipa::path(
    get,
    path = "/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Sessão atual (user nulo se não houver)", body = SessionInfo)
    ),
    security((), ("session_jwt" = []))
)]
pub async fn current_session(State(app_state): State<AppState>, headers: HeaderMap) -> Json<SessionInfo> {
    match authenticate(&app_state, &headers) {
        Ok(user) => Json(SessionInfo {
            user: Some(UserRef { id: user.id }),
            tenant_id: Some(user.tenant_id),
        }),
        Err(_) => Json(SessionInfo { user: None, tenant_id: None }),
    }
}

// POST /auth/logout
// O token é stateless: basta o cliente descartá-lo.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 204, description = "Sessão encerrada"))
)]
pub async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

// src/handlers/notifications.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    services::notification::{NotificationOutcome, ShiftApprovedNotice},
};

// POST /api/notifications/shift-approved
#[utoipa::path(
    post,
    path = "/api/notifications/shift-approved",
    tag = "Notifications",
    request_body = ShiftApprovedNotice,
    responses(
        (status = 200, description = "Enviado (resposta do provedor) ou ignorado ({skipped: true, reason})"),
        (status = 500, description = "Falha na entrega")
    ),
    security(("session_jwt" = []))
)]
pub async fn shift_approved(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ShiftApprovedNotice>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let outcome = app_state
        .notifier
        .shift_approved(&payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let body = match outcome {
        NotificationOutcome::Sent { response } => response,
        NotificationOutcome::Skipped { reason } => json!({ "skipped": true, "reason": reason }),
        // O Notifier devolve falhas como Err; não chega aqui.
        NotificationOutcome::Failed { reason } => {
            return Err(AppError::NotificationError(reason).to_api_error(&locale, &app_state.i18n_store));
        }
    };

    Ok(Json(body))
}

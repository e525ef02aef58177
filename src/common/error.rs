// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    models::shift::ShiftStatus,
};

// Nosso tipo de erro de domínio, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Payload inválido: {0}")]
    InvalidPayload(String),

    #[error("Registro não encontrado")]
    RecordNotFound,

    #[error("Tabela desconhecida: {0}")]
    UnknownTable(String),

    #[error("Turno aprovado é somente leitura")]
    ShiftLocked,

    #[error("Transição inválida: {from} -> {to}")]
    InvalidTransition { from: ShiftStatus, to: ShiftStatus },

    #[error("Funcionário {0} não está alocado neste turno")]
    EmployeeNotAssigned(Uuid),

    #[error("Tenant ausente na sessão")]
    MissingTenant,

    #[error("Token inválido")]
    InvalidToken,

    // Falhas de rede/servidor vistas pelo lado cliente (ApiClient)
    #[error("Falha remota: {0}")]
    RemoteError(String),

    #[error("Tempo limite excedido na chamada remota")]
    Timeout,

    #[error("Falha ao enviar notificação: {0}")]
    NotificationError(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout
        } else {
            AppError::RemoteError(err.to_string())
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidPayload(_)
            | AppError::EmployeeNotAssigned(_)
            | AppError::MissingTenant => StatusCode::BAD_REQUEST,
            AppError::RecordNotFound | AppError::UnknownTable(_) => StatusCode::NOT_FOUND,
            AppError::ShiftLocked | AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::RemoteError(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::NotificationError(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Chave da mensagem no I18nStore.
    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::InvalidPayload(_) => "invalid_payload",
            AppError::RecordNotFound => "record_not_found",
            AppError::UnknownTable(_) => "unknown_table",
            AppError::ShiftLocked => "shift_locked",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::EmployeeNotAssigned(_) => "employee_not_assigned",
            AppError::MissingTenant => "missing_tenant",
            AppError::InvalidToken => "unauthorized",
            AppError::RemoteError(_) => "remote_failure",
            AppError::Timeout => "timeout",
            AppError::NotificationError(_) => "notification_failed",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::JwtError(_) => "internal",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::RecordNotFound)
    }

    /// Converte o erro de domínio na resposta HTTP, traduzida para o idioma do pedido.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status_code();
        let error = i18n.translate(&locale.0, self.message_key());

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            Value::String(i18n.translate(&locale.0, key))
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(details))
            }
            AppError::InvalidPayload(reason) => Some(json!({ "reason": reason })),
            AppError::UnknownTable(table) => Some(json!({ "table": table })),
            AppError::InvalidTransition { from, to } => Some(json!({ "from": from, "to": to })),
            AppError::EmployeeNotAssigned(id) => Some(json!({ "employeeId": id })),
            _ => None,
        };

        if status.is_server_error() {
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        ApiError { status, error, details }
    }
}

// Resposta de erro que sai pela API.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Para os pontos sem acesso ao Locale (middleware), usa o idioma padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::default())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::validation::field_error;

    #[test]
    fn status_codes_follow_the_error_taxonomy() {
        assert_eq!(AppError::RecordNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::ShiftLocked.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::MissingTenant.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn validation_details_are_translated_per_field() {
        let err = field_error("name", "required");
        let api = err.to_api_error(&Locale("en".into()), &I18nStore::default());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["name"][0], "This field is required.");
    }
}

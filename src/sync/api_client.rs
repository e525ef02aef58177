// src/sync/api_client.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::SessionResponse,
        record::{Record, RecordDraft, RecordKind, RecordPatch},
        shift::ShiftPatch,
    },
    services::shift_service::ApprovalResponse,
    sync::remote::RemoteStore,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Cliente da API HTTP (/api/...), com o Bearer token da sessão.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

fn build_http() -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| AppError::InternalServerError(e.into()))
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, AppError> {
        Ok(Self {
            http: build_http()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Abre uma sessão anônima e devolve o cliente já autenticado.
    pub async fn sign_in_anonymous(
        base_url: impl Into<String>,
        app_id: Option<String>,
    ) -> Result<(Self, SessionResponse), AppError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = build_http()?;

        let response = http
            .post(format!("{}/auth/anonymous", base_url))
            .json(&json!({ "appId": app_id }))
            .send()
            .await?;
        let session: SessionResponse = read_json(response).await?;
        tracing::info!("🔑 Sessão anônima aberta no tenant {}", session.tenant_id);

        let client = Self { http, base_url, token: session.token.clone() };
        Ok((client, session))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }
}

/// Converte a resposta de erro da API no AppError equivalente.
pub fn error_from_status(status: StatusCode, body: &Value) -> AppError {
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    match status {
        StatusCode::NOT_FOUND => AppError::RecordNotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            let details = body.get("details").map(Value::to_string).unwrap_or_default();
            AppError::InvalidPayload(format!("{} {}", message, details).trim().to_string())
        }
        StatusCode::UNAUTHORIZED => AppError::InvalidToken,
        StatusCode::CONFLICT => AppError::ShiftLocked,
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => AppError::Timeout,
        other => AppError::RemoteError(format!("{}: {}", other, message)),
    }
}

async fn check(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    Err(error_from_status(status, &body))
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let response = check(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| AppError::RemoteError(format!("resposta inesperada: {}", e)))
}

#[async_trait]
impl RemoteStore for ApiClient {
    async fn create(&self, draft: RecordDraft) -> Result<Record, AppError> {
        // Validação local: dado inválido nunca sai da máquina.
        draft.check()?;
        let kind = draft.kind();

        let response = self
            .request(Method::POST, &format!("/api/{}", kind.table()))
            .json(&draft.to_json()?)
            .send()
            .await?;
        Record::from_json(kind, read_json(response).await?)
    }

    async fn update(&self, kind: RecordKind, id: Uuid, patch: RecordPatch) -> Result<Record, AppError> {
        patch.check()?;

        // O PATCH genérico não aprova; a aprovação tem rota própria.
        if let RecordPatch::Shift(shift_patch) = &patch {
            if shift_patch.touches_approval() {
                return self.approve(id, shift_patch.clone()).await.map(|a| Record::Shift(a.shift));
            }
        }

        let response = self
            .request(Method::PATCH, &format!("/api/{}/{}", kind.table(), id))
            .json(&json!({ "updates": patch.to_json()? }))
            .send()
            .await?;
        Record::from_json(kind, read_json(response).await?)
    }

    async fn delete(&self, kind: RecordKind, id: Uuid) -> Result<(), AppError> {
        let response = self
            .request(Method::DELETE, &format!("/api/{}/{}", kind.table(), id))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn list(&self, kind: RecordKind) -> Result<Vec<Record>, AppError> {
        let response = self
            .request(Method::GET, &format!("/api/{}", kind.table()))
            .send()
            .await?;
        let rows: Vec<Value> = read_json(response).await?;
        rows.into_iter().map(|row| Record::from_json(kind, row)).collect()
    }

    /// O servidor grava, notifica e devolve o resultado do e-mail junto.
    async fn approve(&self, id: Uuid, patch: ShiftPatch) -> Result<ApprovalResponse, AppError> {
        patch.check()?;
        let response = self
            .request(Method::POST, &format!("/api/shifts/{}/approve", id))
            .json(&json!({ "approverName": patch.approved_by_name }))
            .send()
            .await?;
        read_json(response).await
    }
}

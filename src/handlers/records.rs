// src/handlers/records.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::TenantContext},
    models::{
        auth::{BootstrapResponse, SessionUser, UpsertProfilePayload, UserProfile},
        record::RecordKind,
    },
};

// =============================================================================
//  ÁREA 1: SESSÃO
// =============================================================================

// GET /api/bootstrap
#[utoipa::path(
    get,
    path = "/api/bootstrap",
    tag = "Records",
    responses(
        (status = 200, description = "Todos os dados do tenant", body = BootstrapResponse),
        (status = 401, description = "Sem sessão")
    ),
    security(("session_jwt" = []))
)]
pub async fn bootstrap(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let data = app_state
        .record_service
        .bootstrap(&user)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(data))
}

// PUT /api/user-profile
#[utoipa::path(
    put,
    path = "/api/user-profile",
    tag = "Records",
    request_body = UpsertProfilePayload,
    responses(
        (status = 200, description = "Perfil gravado", body = UserProfile),
        (status = 400, description = "Nome obrigatório")
    ),
    security(("session_jwt" = []))
)]
pub async fn upsert_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<UpsertProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let profile = app_state
        .record_service
        .upsert_profile(&user, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profile))
}

// =============================================================================
//  ÁREA 2: CRUD GENÉRICO (/api/{table})
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRecordPayload {
    // Campos parciais do registro; `id` e `tenantId` são ignorados.
    #[schema(value_type = Object)]
    pub updates: Option<Value>,
}

fn table_kind(table: &str, locale: &Locale, app_state: &AppState) -> Result<RecordKind, ApiError> {
    table
        .parse::<RecordKind>()
        .map_err(|e| e.to_api_error(locale, &app_state.i18n_store))
}

// GET /api/{table}
#[utoipa::path(
    get,
    path = "/api/{table}",
    tag = "Records",
    params(("table" = String, Path, description = "employees | jobs | materials | shifts")),
    responses(
        (status = 200, description = "Registros do tenant"),
        (status = 404, description = "Tabela desconhecida")
    ),
    security(("session_jwt" = []))
)]
pub async fn list_records(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(table): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = table_kind(&table, &locale, &app_state)?;
    list_in(app_state, locale, tenant, kind).await
}

async fn list_in(
    app_state: AppState,
    locale: Locale,
    tenant: TenantContext,
    kind: RecordKind,
) -> Result<impl IntoResponse, ApiError> {
    let records = app_state
        .record_service
        .list(&tenant.0, kind)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(records))
}

// POST /api/{table}
#[utoipa::path(
    post,
    path = "/api/{table}",
    tag = "Records",
    params(("table" = String, Path, description = "employees | jobs | materials | shifts")),
    request_body(content = Object, description = "Campos do registro (tenant é definido pelo servidor)"),
    responses(
        (status = 201, description = "Registro criado"),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Tabela desconhecida")
    ),
    security(("session_jwt" = []))
)]
pub async fn create_record(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(table): Path<String>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = table_kind(&table, &locale, &app_state)?;
    create_in(app_state, locale, user, kind, payload).await
}

async fn create_in(
    app_state: AppState,
    locale: Locale,
    user: SessionUser,
    kind: RecordKind,
    payload: Value,
) -> Result<impl IntoResponse, ApiError> {
    let record = app_state
        .record_service
        .create(&user, kind, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(record)))
}

// PATCH /api/{table}/{id}
#[utoipa::path(
    patch,
    path = "/api/{table}/{id}",
    tag = "Records",
    params(
        ("table" = String, Path, description = "employees | jobs | materials | shifts"),
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    request_body = UpdateRecordPayload,
    responses(
        (status = 200, description = "Registro atualizado"),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Registro não encontrado neste tenant"),
        (status = 409, description = "Raport aprovado")
    ),
    security(("session_jwt" = []))
)]
pub async fn update_record(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path((table, id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateRecordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = table_kind(&table, &locale, &app_state)?;
    update_in(app_state, locale, tenant, kind, id, payload).await
}

async fn update_in(
    app_state: AppState,
    locale: Locale,
    tenant: TenantContext,
    kind: RecordKind,
    id: Uuid,
    payload: UpdateRecordPayload,
) -> Result<impl IntoResponse, ApiError> {
    let updates = match payload.updates {
        Some(updates @ Value::Object(_)) => updates,
        _ => {
            return Err(AppError::InvalidPayload("updates are required".into())
                .to_api_error(&locale, &app_state.i18n_store));
        }
    };

    let record = app_state
        .record_service
        .update(&tenant.0, kind, id, updates)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(record))
}

// DELETE /api/{table}/{id}
#[utoipa::path(
    delete,
    path = "/api/{table}/{id}",
    tag = "Records",
    params(
        ("table" = String, Path, description = "employees | jobs | materials | shifts"),
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    responses(
        (status = 204, description = "Removido"),
        (status = 404, description = "Registro não encontrado neste tenant")
    ),
    security(("session_jwt" = []))
)]
pub async fn delete_record(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path((table, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = table_kind(&table, &locale, &app_state)?;
    delete_in(app_state, locale, tenant, kind, id).await
}

async fn delete_in(
    app_state: AppState,
    locale: Locale,
    tenant: TenantContext,
    kind: RecordKind,
    id: Uuid,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .record_service
        .delete(&tenant.0, kind, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// --- /api/shifts e /api/shifts/{id} ---
// Registradas explicitamente porque /api/shifts/... também tem as rotas do ciclo de vida.

pub async fn list_shifts(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    list_in(app_state, locale, tenant, RecordKind::Shifts).await
}

pub async fn create_shift(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    create_in(app_state, locale, user, RecordKind::Shifts, payload).await
}

pub async fn update_shift(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRecordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    update_in(app_state, locale, tenant, RecordKind::Shifts, id, payload).await
}

pub async fn delete_shift(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    delete_in(app_state, locale, tenant, RecordKind::Shifts, id).await
}

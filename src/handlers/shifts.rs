// src/handlers/shifts.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::ApiError, validation::field_error},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::TenantContext},
    models::shift::{Shift, TaskItem},
    services::shift_service::ApprovalResponse,
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetHoursPayload {
    #[schema(example = "6")]
    pub hours: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUsagePayload {
    pub material_id: Uuid,
    #[schema(example = "10")]
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProgressPayload {
    #[schema(example = 50)]
    pub progress: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NotesPayload {
    pub notes: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChecklistPayload {
    pub tasks: Vec<TaskItem>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveDatePayload {
    #[schema(example = "2026-03-12")]
    pub date: NaiveDate,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovePayload {
    // Se ausente, usa o nome do perfil do usuário.
    #[serde(default)]
    #[schema(example = "Alice")]
    pub approver_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DuplicatePayload {
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ForJobPayload {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

// =============================================================================
//  ÁREA 1: EQUIPE E HORAS
// =============================================================================

// POST /api/shifts/{id}/employees/{employee_id}/toggle
#[utoipa::path(
    post,
    path = "/api/shifts/{id}/employees/{employee_id}/toggle",
    tag = "Shifts",
    params(("id" = Uuid, Path), ("employee_id" = Uuid, Path)),
    responses(
        (status = 200, description = "Alocação alternada (8h por padrão)", body = Shift),
        (status = 404, description = "Raport não encontrado"),
        (status = 409, description = "Raport aprovado")
    ),
    security(("session_jwt" = []))
)]
pub async fn toggle_employee(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path((id, employee_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let shift = app_state
        .shift_service
        .toggle_employee(&tenant.0, id, employee_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(shift))
}

// PUT /api/shifts/{id}/employees/{employee_id}/hours
#[utoipa::path(
    put,
    path = "/api/shifts/{id}/employees/{employee_id}/hours",
    tag = "Shifts",
    params(("id" = Uuid, Path), ("employee_id" = Uuid, Path)),
    request_body = SetHoursPayload,
    responses(
        (status = 200, description = "Horas atualizadas", body = Shift),
        (status = 400, description = "Horas negativas ou funcionário não alocado"),
        (status = 409, description = "Raport aprovado")
    ),
    security(("session_jwt" = []))
)]
pub async fn set_hours(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path((id, employee_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SetHoursPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let shift = app_state
        .shift_service
        .set_hours(&tenant.0, id, employee_id, payload.hours)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(shift))
}

// =============================================================================
//  ÁREA 2: MATERIAIS
// =============================================================================

// POST /api/shifts/{id}/materials
#[utoipa::path(
    post,
    path = "/api/shifts/{id}/materials",
    tag = "Shifts",
    params(("id" = Uuid, Path)),
    request_body = MaterialUsagePayload,
    responses(
        (status = 200, description = "Consumo registrado (somado se o material já existir)", body = Shift),
        (status = 400, description = "Quantidade deve ser positiva"),
        (status = 409, description = "Raport aprovado")
    ),
    security(("session_jwt" = []))
)]
pub async fn record_material_usage(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<MaterialUsagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let shift = app_state
        .shift_service
        .record_material_usage(&tenant.0, id, payload.material_id, payload.quantity)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(shift))
}

// DELETE /api/shifts/{id}/materials/{index}
#[utoipa::path(
    delete,
    path = "/api/shifts/{id}/materials/{index}",
    tag = "Shifts",
    params(("id" = Uuid, Path), ("index" = usize, Path)),
    responses(
        (status = 200, description = "Linha removida", body = Shift),
        (status = 400, description = "Índice fora do intervalo"),
        (status = 409, description = "Raport aprovado")
    ),
    security(("session_jwt" = []))
)]
pub async fn remove_material_usage(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<impl IntoResponse, ApiError> {
    let shift = app_state
        .shift_service
        .remove_material_usage(&tenant.0, id, index)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(shift))
}

// =============================================================================
//  ÁREA 3: PROGRESSO, NOTAS, CHECKLIST, DATA
// =============================================================================

// PUT /api/shifts/{id}/progress
#[utoipa::path(
    put,
    path = "/api/shifts/{id}/progress",
    tag = "Shifts",
    params(("id" = Uuid, Path)),
    request_body = ProgressPayload,
    responses(
        (status = 200, description = "Progresso (limitado a 0..=100)", body = Shift),
        (status = 409, description = "Raport aprovado")
    ),
    security(("session_jwt" = []))
)]
pub async fn set_progress(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProgressPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let shift = app_state
        .shift_service
        .set_progress(&tenant.0, id, payload.progress)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(shift))
}

// PUT /api/shifts/{id}/notes
#[utoipa::path(
    put,
    path = "/api/shifts/{id}/notes",
    tag = "Shifts",
    params(("id" = Uuid, Path)),
    request_body = NotesPayload,
    responses(
        (status = 200, description = "Notas gravadas", body = Shift),
        (status = 409, description = "Raport aprovado")
    ),
    security(("session_jwt" = []))
)]
pub async fn set_notes(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<NotesPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let shift = app_state
        .shift_service
        .set_notes(&tenant.0, id, payload.notes)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(shift))
}

// PUT /api/shifts/{id}/checklist
#[utoipa::path(
    put,
    path = "/api/shifts/{id}/checklist",
    tag = "Shifts",
    params(("id" = Uuid, Path)),
    request_body = ChecklistPayload,
    responses(
        (status = 200, description = "Checklist substituída", body = Shift),
        (status = 409, description = "Raport aprovado")
    ),
    security(("session_jwt" = []))
)]
pub async fn set_checklist(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChecklistPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let shift = app_state
        .shift_service
        .set_checklist(&tenant.0, id, payload.tasks)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(shift))
}

// POST /api/shifts/{id}/checklist/{task_id}/toggle
#[utoipa::path(
    post,
    path = "/api/shifts/{id}/checklist/{task_id}/toggle",
    tag = "Shifts",
    params(("id" = Uuid, Path), ("task_id" = Uuid, Path)),
    responses(
        (status = 200, description = "Tarefa marcada/desmarcada", body = Shift),
        (status = 404, description = "Tarefa não encontrada"),
        (status = 409, description = "Raport aprovado")
    ),
    security(("session_jwt" = []))
)]
pub async fn toggle_task(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path((id, task_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let shift = app_state
        .shift_service
        .toggle_task(&tenant.0, id, task_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(shift))
}

// PUT /api/shifts/{id}/date
#[utoipa::path(
    put,
    path = "/api/shifts/{id}/date",
    tag = "Shifts",
    params(("id" = Uuid, Path)),
    request_body = MoveDatePayload,
    responses(
        (status = 200, description = "Reagendado (mantém a hora, vale para qualquer estado)", body = Shift)
    ),
    security(("session_jwt" = []))
)]
pub async fn move_date(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveDatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let shift = app_state
        .shift_service
        .move_date(&tenant.0, id, payload.date)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(shift))
}

// =============================================================================
//  ÁREA 4: FLUXO (SUBMIT / APPROVE)
// =============================================================================

// POST /api/shifts/{id}/submit
#[utoipa::path(
    post,
    path = "/api/shifts/{id}/submit",
    tag = "Shifts",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Raport enviado para aprovação", body = Shift),
        (status = 409, description = "Transição inválida")
    ),
    security(("session_jwt" = []))
)]
pub async fn submit(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let shift = app_state
        .shift_service
        .submit(&tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(shift))
}

// POST /api/shifts/{id}/approve
#[utoipa::path(
    post,
    path = "/api/shifts/{id}/approve",
    tag = "Shifts",
    params(("id" = Uuid, Path)),
    request_body = ApprovePayload,
    responses(
        (status = 200, description = "Aprovado; o resultado da notificação vem junto", body = ApprovalResponse),
        (status = 409, description = "Já aprovado")
    ),
    security(("session_jwt" = []))
)]
pub async fn approve(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<ApprovePayload>>,
) -> Result<impl IntoResponse, ApiError> {
    // POST sem corpo = aprovador pelo perfil.
    let Json(payload) = payload.unwrap_or_default();
    let approval = app_state
        .shift_service
        .approve(&user, id, payload.approver_name)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(approval))
}

// =============================================================================
//  ÁREA 5: CRIAÇÃO
// =============================================================================

// POST /api/shifts/{id}/duplicate
#[utoipa::path(
    post,
    path = "/api/shifts/{id}/duplicate",
    tag = "Shifts",
    params(("id" = Uuid, Path)),
    request_body = DuplicatePayload,
    responses(
        (status = 201, description = "Uma cópia limpa por data", body = Vec<Shift>),
        (status = 400, description = "Nenhuma data informada")
    ),
    security(("session_jwt" = []))
)]
pub async fn duplicate(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DuplicatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.dates.is_empty() {
        return Err(field_error("dates", "required").to_api_error(&locale, &app_state.i18n_store));
    }

    let copies = app_state
        .shift_service
        .duplicate_for_dates(&user, id, &payload.dates)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(copies)))
}

// POST /api/shifts/for-job/{job_id}
#[utoipa::path(
    post,
    path = "/api/shifts/for-job/{job_id}",
    tag = "Shifts",
    params(("job_id" = Uuid, Path)),
    request_body = ForJobPayload,
    responses(
        (status = 201, description = "Novo raport aberto para a obra", body = Shift)
    ),
    security(("session_jwt" = []))
)]
pub async fn create_for_job(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(job_id): Path<Uuid>,
    payload: Option<Json<ForJobPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.unwrap_or_default();
    let shift = app_state
        .shift_service
        .create_for_job(&user, job_id, payload.date)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(shift)))
}

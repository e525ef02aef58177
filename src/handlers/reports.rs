// src/handlers/reports.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::{
        record::RecordKind,
        reports::{JobCostSummary, ShiftCostBreakdown, ShiftReportEntry, TimesheetQuery, TimesheetRow},
        shift::Shift,
        workforce::{Employee, Job, Material, TenantId},
    },
    services::{costing, record_service::RecordService},
};

struct Snapshot {
    employees: Vec<Employee>,
    jobs: Vec<Job>,
    materials: Vec<Material>,
    shifts: Vec<Shift>,
}

async fn snapshot(records: &RecordService, tenant: &TenantId) -> Result<Snapshot, AppError> {
    let (employees, jobs, materials, shifts) = tokio::try_join!(
        records.employees(tenant),
        records.jobs(tenant),
        records.materials(tenant),
        records.shifts(tenant),
    )?;
    Ok(Snapshot { employees, jobs, materials, shifts })
}

// GET /api/reports/shifts
#[utoipa::path(
    get,
    path = "/api/reports/shifts",
    tag = "Reports",
    responses((status = 200, description = "Rapoarte, mais recente primeiro", body = Vec<ShiftReportEntry>)),
    security(("session_jwt" = []))
)]
pub async fn shift_reports(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let data = snapshot(&app_state.record_service, &tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let entries = costing::shift_reports(&data.shifts, &data.employees, &data.materials)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(entries))
}

// GET /api/reports/shifts/{id}/costs
#[utoipa::path(
    get,
    path = "/api/reports/shifts/{id}/costs",
    tag = "Reports",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Mão de obra + material", body = ShiftCostBreakdown),
        (status = 404, description = "Raport não encontrado")
    ),
    security(("session_jwt" = []))
)]
pub async fn shift_costs(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |app_err: AppError| app_err.to_api_error(&locale, &app_state.i18n_store);
    let records = &app_state.record_service;

    let shift = records
        .find(&tenant.0, RecordKind::Shifts, id)
        .await
        .and_then(|r| r.into_shift())
        .map_err(to_api)?;
    let (employees, materials) =
        tokio::try_join!(records.employees(&tenant.0), records.materials(&tenant.0)).map_err(to_api)?;

    let breakdown = costing::shift_cost_breakdown(&shift, &employees, &materials).map_err(to_api)?;
    Ok(Json(breakdown))
}

// GET /api/reports/jobs
#[utoipa::path(
    get,
    path = "/api/reports/jobs",
    tag = "Reports",
    responses((status = 200, description = "Custo real x estimado por obra", body = Vec<JobCostSummary>)),
    security(("session_jwt" = []))
)]
pub async fn job_reports(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let data = snapshot(&app_state.record_service, &tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let report = costing::job_cost_report(&data.jobs, &data.shifts, &data.employees, &data.materials)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(report))
}

// GET /api/reports/jobs/{id}/costs
#[utoipa::path(
    get,
    path = "/api/reports/jobs/{id}/costs",
    tag = "Reports",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Resumo de custos da obra", body = JobCostSummary),
        (status = 404, description = "Obra não encontrada")
    ),
    security(("session_jwt" = []))
)]
pub async fn job_costs(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let data = snapshot(&app_state.record_service, &tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let job = data
        .jobs
        .iter()
        .find(|j| j.id == id)
        .ok_or(AppError::RecordNotFound)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = costing::job_cost_summary(job, &data.shifts, &data.employees, &data.materials)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(summary))
}

// GET /api/reports/timesheet?month=YYYY-MM
#[utoipa::path(
    get,
    path = "/api/reports/timesheet",
    tag = "Reports",
    params(TimesheetQuery),
    responses(
        (status = 200, description = "Pontaj do mês", body = Vec<TimesheetRow>),
        (status = 400, description = "Mês inválido")
    ),
    security(("session_jwt" = []))
)]
pub async fn timesheet(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Query(query): Query<TimesheetQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (year, month) = costing::parse_month(&query.month)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let records = &app_state.record_service;
    let (shifts, employees) = tokio::try_join!(records.shifts(&tenant.0), records.employees(&tenant.0))
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let rows = costing::monthly_timesheet(&shifts, &employees, year, month)
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(rows))
}

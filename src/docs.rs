// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Auth ---
        handlers::auth::sign_in_anonymous,
        handlers::auth::current_session,
        handlers::auth::logout,

        // --- Records ---
        handlers::records::bootstrap,
        handlers::records::upsert_profile,
        handlers::records::list_records,
        handlers::records::create_record,
        handlers::records::update_record,
        handlers::records::delete_record,

        // --- Shifts ---
        handlers::shifts::toggle_employee,
        handlers::shifts::set_hours,
        handlers::shifts::record_material_usage,
        handlers::shifts::remove_material_usage,
        handlers::shifts::set_progress,
        handlers::shifts::set_notes,
        handlers::shifts::set_checklist,
        handlers::shifts::toggle_task,
        handlers::shifts::move_date,
        handlers::shifts::submit,
        handlers::shifts::approve,
        handlers::shifts::duplicate,
        handlers::shifts::create_for_job,

        // --- Reports ---
        handlers::reports::shift_reports,
        handlers::reports::shift_costs,
        handlers::reports::job_reports,
        handlers::reports::job_costs,
        handlers::reports::timesheet,

        // --- Notifications ---
        handlers::notifications::shift_approved,
    ),
    components(
        schemas(
            // --- Workforce ---
            models::workforce::TenantId,
            models::workforce::Employee,
            models::workforce::NewEmployee,
            models::workforce::EmployeePatch,
            models::workforce::Job,
            models::workforce::NewJob,
            models::workforce::JobPatch,
            models::workforce::MaterialUnit,
            models::workforce::Material,
            models::workforce::NewMaterial,
            models::workforce::MaterialPatch,

            // --- Shift ---
            models::shift::ShiftStatus,
            models::shift::MaterialUsage,
            models::shift::TaskItem,
            models::shift::Shift,
            models::shift::NewShift,
            models::shift::ShiftPatch,
            models::record::RecordKind,

            // --- Auth ---
            models::auth::SessionUser,
            models::auth::UserProfile,
            models::auth::AnonymousSignInPayload,
            models::auth::UserRef,
            models::auth::SessionResponse,
            models::auth::SessionInfo,
            models::auth::UpsertProfilePayload,
            models::auth::BootstrapResponse,

            // --- Reports ---
            models::reports::ShiftCostBreakdown,
            models::reports::ShiftReportEntry,
            models::reports::JobCostSummary,
            models::reports::TimesheetEntry,
            models::reports::TimesheetRow,

            // --- Payloads ---
            handlers::records::UpdateRecordPayload,
            handlers::shifts::SetHoursPayload,
            handlers::shifts::MaterialUsagePayload,
            handlers::shifts::ProgressPayload,
            handlers::shifts::NotesPayload,
            handlers::shifts::ChecklistPayload,
            handlers::shifts::MoveDatePayload,
            handlers::shifts::ApprovePayload,
            handlers::shifts::DuplicatePayload,
            handlers::shifts::ForJobPayload,

            // --- Notifications ---
            services::notification::ShiftApprovedNotice,
            services::notification::NotificationOutcome,
            services::shift_service::ApprovalResponse,
        )
    ),
    tags(
        (name = "Health", description = "Verificação do servidor"),
        (name = "Auth", description = "Sessão anônima e tenant"),
        (name = "Records", description = "CRUD genérico por tenant (angajați, lucrări, materiale, rapoarte)"),
        (name = "Shifts", description = "Ciclo de vida do raport de lucru"),
        (name = "Reports", description = "Custos e pontaj"),
        (name = "Notifications", description = "E-mail de aprovação")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

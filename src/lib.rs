// src/lib.rs

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod sync;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::session_guard;

fn cors_layer(client_origin: &str) -> CorsLayer {
    match HeaderValue::from_str(client_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT_LANGUAGE]),
        Err(_) => {
            tracing::warn!("⚠️ CLIENT_ORIGIN inválido ({}), CORS aberto sem credenciais", client_origin);
            CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
        }
    }
}

/// Monta o router completo (rotas públicas, /api protegida e Swagger).
pub fn build_router(app_state: AppState) -> Router {
    // Rotas de sessão (públicas)
    let auth_routes = Router::new()
        .route("/anonymous", post(handlers::auth::sign_in_anonymous))
        .route("/session", get(handlers::auth::current_session))
        .route("/logout", post(handlers::auth::logout));

    // Ciclo de vida do raport
    let shift_routes = Router::new()
        .route(
            "/",
            get(handlers::records::list_shifts).post(handlers::records::create_shift),
        )
        .route(
            "/{id}",
            patch(handlers::records::update_shift).delete(handlers::records::delete_shift),
        )
        .route("/for-job/{job_id}", post(handlers::shifts::create_for_job))
        .route("/{id}/employees/{employee_id}/toggle", post(handlers::shifts::toggle_employee))
        .route("/{id}/employees/{employee_id}/hours", put(handlers::shifts::set_hours))
        .route("/{id}/materials", post(handlers::shifts::record_material_usage))
        .route("/{id}/materials/{index}", delete(handlers::shifts::remove_material_usage))
        .route("/{id}/progress", put(handlers::shifts::set_progress))
        .route("/{id}/notes", put(handlers::shifts::set_notes))
        .route("/{id}/checklist", put(handlers::shifts::set_checklist))
        .route("/{id}/checklist/{task_id}/toggle", post(handlers::shifts::toggle_task))
        .route("/{id}/date", put(handlers::shifts::move_date))
        .route("/{id}/submit", post(handlers::shifts::submit))
        .route("/{id}/approve", post(handlers::shifts::approve))
        .route("/{id}/duplicate", post(handlers::shifts::duplicate));

    let report_routes = Router::new()
        .route("/shifts", get(handlers::reports::shift_reports))
        .route("/shifts/{id}/costs", get(handlers::reports::shift_costs))
        .route("/jobs", get(handlers::reports::job_reports))
        .route("/jobs/{id}/costs", get(handlers::reports::job_costs))
        .route("/timesheet", get(handlers::reports::timesheet));

    // Tudo em /api exige sessão; o guard injeta usuário + tenant
    let api_routes = Router::new()
        .route("/bootstrap", get(handlers::records::bootstrap))
        .route("/user-profile", put(handlers::records::upsert_profile))
        .route("/notifications/shift-approved", post(handlers::notifications::shift_approved))
        .nest("/shifts", shift_routes)
        .nest("/reports", report_routes)
        .route(
            "/{table}",
            get(handlers::records::list_records).post(handlers::records::create_record),
        )
        .route(
            "/{table}/{id}",
            patch(handlers::records::update_record).delete(handlers::records::delete_record),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            session_guard,
        ));

    let cors = cors_layer(&app_state.settings.client_origin);

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/auth", auth_routes)
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

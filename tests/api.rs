// tests/api.rs
//
// Testes HTTP contra o router real, com store em memória.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use workforcehub::{
    build_router,
    config::{AppState, Settings},
    db::MemoryRecordStore,
    services::{notification::DisabledNotifier, tenancy::TenantStrategy},
};

fn app(strategy: TenantStrategy) -> Router {
    let mut settings = Settings::new("test-secret");
    settings.tenant_strategy = strategy;
    let state = AppState::from_parts(settings, Arc::new(MemoryRecordStore::new()), Arc::new(DisabledNotifier))
        .expect("app state");
    build_router(state)
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn sign_in(app: &Router) -> String {
    let (status, body) = call(app, Method::POST, "/auth/anonymous", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app(TenantStrategy::Fixed);
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn api_requires_a_session() {
    let app = app(TenantStrategy::Fixed);

    let (status, _) = call(&app, Method::GET, "/api/bootstrap", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, Method::GET, "/api/jobs", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&app, Method::GET, "/auth/session", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], Value::Null);
}

#[tokio::test]
async fn fixed_strategy_puts_every_session_in_the_same_tenant() {
    let app = app(TenantStrategy::Fixed);
    let token = sign_in(&app).await;

    let (status, body) = call(&app, Method::GET, "/auth/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenantId"], "default-app-id");

    let (status, body) = call(&app, Method::GET, "/api/bootstrap", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userName"], "Utilizator");
    assert_eq!(body["shifts"], json!([]));
}

#[tokio::test]
async fn unknown_tables_are_not_found() {
    let app = app(TenantStrategy::Fixed);
    let token = sign_in(&app).await;

    let (status, _) = call(&app, Method::POST, "/api/payroll", Some(&token), Some(json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_names_are_rejected() {
    let app = app(TenantStrategy::Fixed);
    let token = sign_in(&app).await;

    let (status, body) = call(&app, Method::POST, "/api/employees", Some(&token), Some(json!({ "name": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["name"].is_array());

    let (status, _) = call(&app, Method::PUT, "/api/user-profile", Some(&token), Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::GET, "/api/employees", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn other_tenants_records_are_invisible() {
    let app = app(TenantStrategy::UserId);
    let alice = sign_in(&app).await;
    let mallory = sign_in(&app).await;

    let (status, job) = call(&app, Method::POST, "/api/jobs", Some(&alice), Some(json!({ "title": "Casa Pop" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/jobs/{}", job["id"].as_str().unwrap());

    let (status, _) = call(&app, Method::PATCH, &uri, Some(&mallory), Some(json!({ "updates": { "title": "x" } }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::DELETE, &uri, Some(&mallory), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, jobs) = call(&app, Method::GET, "/api/jobs", Some(&mallory), None).await;
    assert_eq!(jobs, json!([]));

    // Patch com tenantId no corpo não troca o dono do registro.
    let (status, updated) = call(
        &app,
        Method::PATCH,
        &uri,
        Some(&alice),
        Some(json!({ "updates": { "title": "Casa Pop 2", "tenantId": "evil", "id": "x" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Casa Pop 2");
    assert_eq!(updated["tenantId"], job["tenantId"]);
    assert_eq!(updated["id"], job["id"]);

    let (status, _) = call(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn patch_without_updates_is_a_bad_request() {
    let app = app(TenantStrategy::Fixed);
    let token = sign_in(&app).await;

    let (_, job) = call(&app, Method::POST, "/api/jobs", Some(&token), Some(json!({ "title": "Bloc C" }))).await;
    let uri = format!("/api/jobs/{}", job["id"].as_str().unwrap());
    let (status, _) = call(&app, Method::PATCH, &uri, Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unconfigured_notifications_are_skipped() {
    let app = app(TenantStrategy::Fixed);
    let token = sign_in(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/notifications/shift-approved",
        Some(&token),
        Some(json!({ "shiftTitle": "Site A", "approvedBy": "Alice", "date": "10.03.2026" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["skipped"], true);
}

#[tokio::test]
async fn huge_amounts_fail_cleanly_instead_of_crashing() {
    let app = app(TenantStrategy::Fixed);
    let token = sign_in(&app).await;
    let t = Some(token.as_str());

    let (_, job) = call(&app, Method::POST, "/api/jobs", t, Some(json!({ "title": "Site A" }))).await;
    let (status, rich) = call(&app, Method::POST, "/api/employees", t, Some(json!({ "name": "Rich", "hourlyRate": 1e28 }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, gravel) = call(&app, Method::POST, "/api/materials", t, Some(json!({ "name": "Gravel", "unit": "kg" }))).await;

    let (_, shift) = call(&app, Method::POST, &format!("/api/shifts/for-job/{}", job["id"].as_str().unwrap()), t, None).await;
    let shift_id = shift["id"].as_str().unwrap();
    let base = format!("/api/shifts/{}", shift_id);

    let (status, _) = call(&app, Method::POST, &format!("{}/employees/{}/toggle", base, rich["id"].as_str().unwrap()), t, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::GET, &format!("/api/reports/shifts/{}/costs", shift_id), t, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _) = call(&app, Method::GET, "/api/reports/jobs", t, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let usage = json!({ "materialId": gravel["id"], "quantity": 6e28 });
    let (status, _) = call(&app, Method::POST, &format!("{}/materials", base), t, Some(usage.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::POST, &format!("{}/materials", base), t, Some(usage)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // O servidor continua de pé.
    let (status, _) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn lifecycle_posts_accept_an_empty_body() {
    let app = app(TenantStrategy::Fixed);
    let token = sign_in(&app).await;
    let t = Some(token.as_str());

    let (_, job) = call(&app, Method::POST, "/api/jobs", t, Some(json!({ "title": "Bloc C" }))).await;
    let (status, shift) = call(&app, Method::POST, &format!("/api/shifts/for-job/{}", job["id"].as_str().unwrap()), t, None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, approval) = call(&app, Method::POST, &format!("/api/shifts/{}/approve", shift["id"].as_str().unwrap()), t, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approval["shift"]["approvedByName"], "Utilizator");
}

#[tokio::test]
async fn shift_lifecycle_end_to_end() {
    let app = app(TenantStrategy::Fixed);
    let token = sign_in(&app).await;
    let t = Some(token.as_str());

    let (_, job) = call(&app, Method::POST, "/api/jobs", t, Some(json!({ "title": "Site A", "estimatedLaborCost": 500 }))).await;
    let (_, bob) = call(&app, Method::POST, "/api/employees", t, Some(json!({ "name": "Bob", "hourlyRate": 20 }))).await;
    let (_, cement) = call(
        &app,
        Method::POST,
        "/api/materials",
        t,
        Some(json!({ "name": "Cement", "unit": "sac", "unitCost": 5 })),
    )
    .await;
    let job_id = job["id"].as_str().unwrap();
    let bob_id = bob["id"].as_str().unwrap();

    let (status, shift) = call(&app, Method::POST, &format!("/api/shifts/for-job/{}", job_id), t, Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(shift["status"], "open");
    assert_eq!(shift["jobTitle"], "Site A");
    let base = format!("/api/shifts/{}", shift["id"].as_str().unwrap());

    let (status, shift) = call(&app, Method::POST, &format!("{}/employees/{}/toggle", base, bob_id), t, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shift["employeeHours"][bob_id], 8.0);

    let (status, _) = call(&app, Method::PUT, &format!("{}/employees/{}/hours", base, bob_id), t, Some(json!({ "hours": 10 }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("{}/materials", base),
        t,
        Some(json!({ "materialId": cement["id"], "quantity": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, costs) = call(&app, Method::GET, &format!("/api/reports/shifts/{}/costs", shift["id"].as_str().unwrap()), t, None).await;
    assert_eq!(costs["labor"], 200.0);
    assert_eq!(costs["material"], 30.0);
    assert_eq!(costs["total"], 230.0);

    // Aprovação pelo PATCH genérico é recusada
    let (status, _) = call(&app, Method::PATCH, &base, t, Some(json!({ "updates": { "status": "approved" } }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, approval) = call(&app, Method::POST, &format!("{}/approve", base), t, Some(json!({ "approverName": "Alice" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approval["shift"]["status"], "approved");
    assert_eq!(approval["shift"]["approvedByName"], "Alice");
    assert_eq!(approval["notification"]["status"], "skipped");

    let (status, _) = call(&app, Method::PUT, &format!("{}/progress", base), t, Some(json!({ "progress": 80 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, moved) = call(&app, Method::PUT, &format!("{}/date", base), t, Some(json!({ "date": "2026-04-02" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(moved["date"].as_str().unwrap().starts_with("2026-04-02"));

    let (_, jobs) = call(&app, Method::GET, &format!("/api/reports/jobs/{}/costs", job_id), t, None).await;
    assert_eq!(jobs["actual"], 230.0);
    assert_eq!(jobs["estimate"], 500.0);
    assert_eq!(jobs["variance"], -270.0);

    let (status, rows) = call(&app, Method::GET, "/api/reports/timesheet?month=2026-04", t, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows[0]["employeeName"], "Bob");
    assert_eq!(rows[0]["totalHours"], 10.0);

    let (status, _) = call(&app, Method::GET, "/api/reports/timesheet?month=2026-13", t, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

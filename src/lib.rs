// src/lib.rs

pub mod client;
pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod workflow;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, middleware::auth::auth_guard};

// Fotos em base64 vão no corpo JSON
const BODY_LIMIT_BYTES: usize = 25 * 1024 * 1024;

/// Router completo da API.
pub fn app(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/", get(handlers::auth::list_users).post(handlers::auth::create_user))
        .route("/me", get(handlers::auth::get_me))
        .route("/{id}", axum::routing::delete(handlers::auth::delete_user));

    let department_routes = Router::new()
        .route(
            "/",
            get(handlers::fleet::list_departments).post(handlers::fleet::create_department),
        )
        .route(
            "/{id}",
            get(handlers::fleet::get_department)
                .put(handlers::fleet::update_department)
                .delete(handlers::fleet::delete_department),
        );

    let unit_routes = Router::new()
        .route("/", get(handlers::fleet::list_units).post(handlers::fleet::create_unit))
        .route(
            "/{id}",
            get(handlers::fleet::get_unit)
                .put(handlers::fleet::update_unit)
                .delete(handlers::fleet::delete_unit),
        );

    let checklist_routes = Router::new()
        .route(
            "/",
            get(handlers::checklist::list_items).post(handlers::checklist::create_item),
        )
        .route(
            "/{id}",
            get(handlers::checklist::get_item)
                .put(handlers::checklist::update_item)
                .delete(handlers::checklist::delete_item),
        )
        .route("/{id}/qr", get(handlers::checklist::get_item_qr));

    let report_routes = Router::new()
        .route(
            "/",
            get(handlers::inspections::list_reports).post(handlers::inspections::create_report),
        )
        .route(
            "/{id}",
            get(handlers::inspections::get_report)
                .put(handlers::inspections::update_report)
                .delete(handlers::inspections::delete_report),
        )
        .route("/{id}/pdf", get(handlers::inspections::get_report_pdf));

    let downtime_routes = Router::new()
        .route("/", get(handlers::downtime::list_logs).post(handlers::downtime::create_log))
        .route(
            "/{id}",
            get(handlers::downtime::get_log)
                .put(handlers::downtime::update_log)
                .delete(handlers::downtime::delete_log),
        );

    let pms_task_routes = Router::new()
        .route(
            "/",
            get(handlers::pms::list_task_masters).post(handlers::pms::create_task_master),
        )
        .route(
            "/{id}",
            put(handlers::pms::update_task_master).delete(handlers::pms::delete_task_master),
        );

    let pms_entry_routes = Router::new()
        .route("/", get(handlers::pms::list_entries).post(handlers::pms::create_entry))
        .route(
            "/{id}",
            put(handlers::pms::update_entry).delete(handlers::pms::delete_entry),
        );

    // Tudo abaixo exige Bearer token
    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/departments", department_routes)
        .nest("/mhe-units", unit_routes)
        .nest("/checklist-items", checklist_routes)
        .nest("/inspection-reports", report_routes)
        .route("/inspections", post(handlers::inspections::submit_inspection))
        .route("/safety-analysis", post(handlers::inspections::analyze_safety))
        .nest("/downtime-logs", downtime_routes)
        .nest("/pms-task-masters", pms_task_routes)
        .nest("/pms-schedule-entries", pms_entry_routes)
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(app_state)
}

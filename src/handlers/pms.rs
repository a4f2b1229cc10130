// src/handlers/pms.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath, AppQuery},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, Supervisor},
    },
    models::pms::{
        CreatePmsEntryPayload, PmsEntryFilter, PmsScheduleEntry, PmsTaskMaster, PmsTaskMasterPayload,
        UpdatePmsEntryPayload,
    },
};

// =============================================================================
//  TASK MASTERS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/pms-task-masters",
    tag = "PMS",
    responses((status = 200, description = "Preventive maintenance tasks", body = Vec<PmsTaskMaster>)),
    security(("api_jwt" = []))
)]
pub async fn list_task_masters(State(app_state): State<AppState>) -> Result<Json<Vec<PmsTaskMaster>>, AppError> {
    Ok(Json(app_state.pms_service.list_task_masters().await?))
}

#[utoipa::path(
    post,
    path = "/api/pms-task-masters",
    tag = "PMS",
    request_body = PmsTaskMasterPayload,
    responses(
        (status = 201, description = "Task created", body = PmsTaskMaster),
        (status = 409, description = "Task name already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_task_master(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppJson(payload): AppJson<PmsTaskMasterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let task = app_state.pms_service.create_task_master(&payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    put,
    path = "/api/pms-task-masters/{id}",
    tag = "PMS",
    request_body = PmsTaskMasterPayload,
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task updated", body = PmsTaskMaster),
        (status = 404, description = "Task not found"),
        (status = 409, description = "Task name already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_task_master(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<PmsTaskMasterPayload>,
) -> Result<Json<PmsTaskMaster>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.pms_service.update_task_master(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/pms-task-masters/{id}",
    tag = "PMS",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deleted with its schedule entries"),
        (status = 404, description = "Task not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_task_master(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    app_state.pms_service.delete_task_master(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  SCHEDULE ENTRIES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/pms-schedule-entries",
    tag = "PMS",
    params(PmsEntryFilter),
    responses((status = 200, description = "Scheduled maintenance", body = Vec<PmsScheduleEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_entries(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<PmsEntryFilter>,
) -> Result<Json<Vec<PmsScheduleEntry>>, AppError> {
    Ok(Json(app_state.pms_service.list_entries(&filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/pms-schedule-entries",
    tag = "PMS",
    request_body = CreatePmsEntryPayload,
    responses(
        (status = 201, description = "Maintenance scheduled", body = PmsScheduleEntry),
        (status = 400, description = "Unknown task or unit")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_entry(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<Supervisor>,
    AppJson(payload): AppJson<CreatePmsEntryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let entry = app_state.pms_service.create_entry(&payload, &user).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    put,
    path = "/api/pms-schedule-entries/{id}",
    tag = "PMS",
    request_body = UpdatePmsEntryPayload,
    params(("id" = i64, Path, description = "Schedule entry id")),
    responses(
        (status = 200, description = "Entry updated; Completed stamps completedAt", body = PmsScheduleEntry),
        (status = 404, description = "Entry not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_entry(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdatePmsEntryPayload>,
) -> Result<Json<PmsScheduleEntry>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.pms_service.update_entry(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/pms-schedule-entries/{id}",
    tag = "PMS",
    params(("id" = i64, Path, description = "Schedule entry id")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Entry not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_entry(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    app_state.pms_service.delete_entry(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

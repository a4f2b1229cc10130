// src/handlers/downtime.rs

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
    middleware::auth::AuthenticatedUser,
    models::downtime::{
        CreateDowntimeLogPayload, DowntimeFilter, DowntimeLog, DowntimeLogDetail, UpdateDowntimeLogPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/downtime-logs",
    tag = "Downtime",
    params(DowntimeFilter),
    responses((status = 200, description = "Downtime logs, newest first", body = Vec<DowntimeLog>)),
    security(("api_jwt" = []))
)]
pub async fn list_logs(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<DowntimeFilter>,
) -> Result<Json<Vec<DowntimeLog>>, AppError> {
    Ok(Json(app_state.downtime_service.list_logs(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/downtime-logs/{id}",
    tag = "Downtime",
    params(("id" = i64, Path, description = "Downtime log id")),
    responses(
        (status = 200, description = "Downtime log with its unsafe items", body = DowntimeLogDetail),
        (status = 404, description = "Downtime log not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_log(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<DowntimeLogDetail>, AppError> {
    Ok(Json(app_state.downtime_service.get_detail(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/downtime-logs",
    tag = "Downtime",
    request_body = CreateDowntimeLogPayload,
    responses(
        (status = 201, description = "Downtime opened", body = DowntimeLogDetail),
        (status = 400, description = "Invalid payload, unknown unit or report from another unit")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_log(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<CreateDowntimeLogPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = app_state.downtime_service.create_log(&payload, &user).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    put,
    path = "/api/downtime-logs/{id}",
    tag = "Downtime",
    request_body = UpdateDowntimeLogPayload,
    params(("id" = i64, Path, description = "Downtime log id")),
    responses(
        (status = 200, description = "Downtime log updated", body = DowntimeLogDetail),
        (status = 404, description = "Downtime log not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_log(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateDowntimeLogPayload>,
) -> Result<Json<DowntimeLogDetail>, AppError> {
    payload.validate()?;

    Ok(Json(app_state.downtime_service.update_log(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/downtime-logs/{id}",
    tag = "Downtime",
    params(("id" = i64, Path, description = "Downtime log id")),
    responses(
        (status = 204, description = "Downtime log deleted"),
        (status = 404, description = "Downtime log not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_log(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    app_state.downtime_service.delete_log(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// src/handlers/checklist.rs

use axum::{
    extract::State,
    http::{header, StatusCode},
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
    middleware::rbac::{RequireRole, Supervisor},
    models::checklist::{ChecklistFilter, ChecklistItem, ChecklistItemPayload},
};

#[utoipa::path(
    get,
    path = "/api/checklist-items",
    tag = "Checklist",
    params(ChecklistFilter),
    responses((status = 200, description = "Checklist master items in inspection order", body = Vec<ChecklistItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<ChecklistFilter>,
) -> Result<Json<Vec<ChecklistItem>>, AppError> {
    Ok(Json(app_state.checklist_service.list_items(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/checklist-items/{id}",
    tag = "Checklist",
    params(("id" = i64, Path, description = "Checklist item id")),
    responses(
        (status = 200, description = "Checklist item", body = ChecklistItem),
        (status = 404, description = "Checklist item not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ChecklistItem>, AppError> {
    Ok(Json(app_state.checklist_service.get_item(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/checklist-items",
    tag = "Checklist",
    request_body = ChecklistItemPayload,
    responses((status = 201, description = "Checklist item created", body = ChecklistItem)),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppJson(payload): AppJson<ChecklistItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let item = app_state.checklist_service.create_item(&payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/checklist-items/{id}",
    tag = "Checklist",
    request_body = ChecklistItemPayload,
    params(("id" = i64, Path, description = "Checklist item id")),
    responses(
        (status = 200, description = "Checklist item updated; past reports keep their snapshot", body = ChecklistItem),
        (status = 404, description = "Checklist item not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<ChecklistItemPayload>,
) -> Result<Json<ChecklistItem>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.checklist_service.update_item(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/checklist-items/{id}",
    tag = "Checklist",
    params(("id" = i64, Path, description = "Checklist item id")),
    responses(
        (status = 204, description = "Checklist item deleted"),
        (status = 404, description = "Checklist item not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    app_state.checklist_service.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/checklist-items/{id}/qr",
    tag = "Checklist",
    params(("id" = i64, Path, description = "Checklist item id")),
    responses(
        (status = 200, description = "QR code for the item", body = Vec<u8>, content_type = "image/png"),
        (status = 404, description = "Checklist item not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_item_qr(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let png = app_state.document_service.checklist_item_qr(id).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

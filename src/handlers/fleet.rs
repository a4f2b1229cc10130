// src/handlers/fleet.rs

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
    middleware::rbac::{RequireRole, Supervisor},
    models::fleet::{Department, DepartmentPayload, MheUnit, MheUnitPayload, UnitFilter},
};

// =============================================================================
//  DEPARTMENTS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/departments",
    tag = "Fleet",
    responses((status = 200, description = "All departments", body = Vec<Department>)),
    security(("api_jwt" = []))
)]
pub async fn list_departments(State(app_state): State<AppState>) -> Result<Json<Vec<Department>>, AppError> {
    Ok(Json(app_state.fleet_service.list_departments().await?))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    tag = "Fleet",
    params(("id" = i64, Path, description = "Department id")),
    responses(
        (status = 200, description = "Department", body = Department),
        (status = 404, description = "Department not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_department(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Department>, AppError> {
    Ok(Json(app_state.fleet_service.get_department(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    tag = "Fleet",
    request_body = DepartmentPayload,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 409, description = "Department name already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_department(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppJson(payload): AppJson<DepartmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let department = app_state.fleet_service.create_department(&payload).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    tag = "Fleet",
    request_body = DepartmentPayload,
    params(("id" = i64, Path, description = "Department id")),
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department name already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_department(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<DepartmentPayload>,
) -> Result<Json<Department>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.fleet_service.update_department(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    tag = "Fleet",
    params(("id" = i64, Path, description = "Department id")),
    responses(
        (status = 204, description = "Department deleted; its units keep no department"),
        (status = 404, description = "Department not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_department(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    app_state.fleet_service.delete_department(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  MHE UNITS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/mhe-units",
    tag = "Fleet",
    params(UnitFilter),
    responses((status = 200, description = "MHE units", body = Vec<MheUnit>)),
    security(("api_jwt" = []))
)]
pub async fn list_units(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<UnitFilter>,
) -> Result<Json<Vec<MheUnit>>, AppError> {
    Ok(Json(app_state.fleet_service.list_units(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/mhe-units/{id}",
    tag = "Fleet",
    params(("id" = i64, Path, description = "Unit id")),
    responses(
        (status = 200, description = "MHE unit", body = MheUnit),
        (status = 404, description = "Unit not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_unit(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<MheUnit>, AppError> {
    Ok(Json(app_state.fleet_service.get_unit(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/mhe-units",
    tag = "Fleet",
    request_body = MheUnitPayload,
    responses(
        (status = 201, description = "Unit registered", body = MheUnit),
        (status = 400, description = "Invalid payload or unknown department"),
        (status = 409, description = "Unit code already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_unit(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppJson(payload): AppJson<MheUnitPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let unit = app_state.fleet_service.create_unit(&payload).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

#[utoipa::path(
    put,
    path = "/api/mhe-units/{id}",
    tag = "Fleet",
    request_body = MheUnitPayload,
    params(("id" = i64, Path, description = "Unit id")),
    responses(
        (status = 200, description = "Unit updated", body = MheUnit),
        (status = 404, description = "Unit not found"),
        (status = 409, description = "Unit code already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_unit(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<MheUnitPayload>,
) -> Result<Json<MheUnit>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.fleet_service.update_unit(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/mhe-units/{id}",
    tag = "Fleet",
    params(("id" = i64, Path, description = "Unit id")),
    responses(
        (status = 204, description = "Unit deleted with its reports, downtime logs and PMS entries"),
        (status = 404, description = "Unit not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_unit(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    app_state.fleet_service.delete_unit(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

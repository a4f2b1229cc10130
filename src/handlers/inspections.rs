// src/handlers/inspections.rs

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
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, Supervisor},
    },
    models::inspection::{
        CreateInspectionReportPayload, InspectionOutcome, InspectionReport, InspectionReportDetail, ReportFilter,
        SafetyAnalysisPayload, SafetyVerdict, SubmitInspectionPayload, UpdateInspectionReportPayload,
    },
};

// =============================================================================
//  INSPECTION REPORTS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/inspection-reports",
    tag = "Inspections",
    params(ReportFilter),
    responses((status = 200, description = "Inspection reports, newest first", body = Vec<InspectionReport>)),
    security(("api_jwt" = []))
)]
pub async fn list_reports(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<ReportFilter>,
) -> Result<Json<Vec<InspectionReport>>, AppError> {
    Ok(Json(app_state.inspection_service.list_reports(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/inspection-reports/{id}",
    tag = "Inspections",
    params(("id" = i64, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report with its items", body = InspectionReportDetail),
        (status = 404, description = "Report not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_report(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<InspectionReportDetail>, AppError> {
    Ok(Json(app_state.inspection_service.get_detail(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/inspection-reports",
    tag = "Inspections",
    request_body = CreateInspectionReportPayload,
    responses(
        (status = 201, description = "Report stored; status computed from the items", body = InspectionReportDetail),
        (status = 400, description = "Invalid payload or unknown unit")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<CreateInspectionReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let detail = app_state.inspection_service.create_report(&payload, &user).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    put,
    path = "/api/inspection-reports/{id}",
    tag = "Inspections",
    request_body = UpdateInspectionReportPayload,
    params(("id" = i64, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report updated", body = InspectionReportDetail),
        (status = 404, description = "Report not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_report(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateInspectionReportPayload>,
) -> Result<Json<InspectionReportDetail>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.inspection_service.update_report(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/inspection-reports/{id}",
    tag = "Inspections",
    params(("id" = i64, Path, description = "Report id")),
    responses(
        (status = 204, description = "Report deleted"),
        (status = 403, description = "Supervisor role required"),
        (status = 404, description = "Report not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_report(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    app_state.inspection_service.delete_report(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/inspection-reports/{id}/pdf",
    tag = "Inspections",
    params(("id" = i64, Path, description = "Report id")),
    responses(
        (status = 200, description = "Printable report", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Report not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_report_pdf(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let pdf = app_state.document_service.generate_report_pdf(id).await?;
    let disposition = format!("inline; filename=\"inspection-report-{id}.pdf\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    ))
}

// =============================================================================
//  GUIDED INSPECTION + SAFETY ANALYSIS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/inspections",
    tag = "Inspections",
    request_body = SubmitInspectionPayload,
    responses(
        (status = 201, description = "Inspection completed, analysed and stored", body = InspectionOutcome),
        (status = 400, description = "Incomplete inspection, unknown item or unknown unit")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_inspection(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<SubmitInspectionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let outcome = app_state.inspection_service.submit_inspection(&payload, &user).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Sempre responde 200: falha do analisador vira veredito "inseguro".
#[utoipa::path(
    post,
    path = "/api/safety-analysis",
    tag = "Inspections",
    request_body = SafetyAnalysisPayload,
    responses((status = 200, description = "Safety verdict", body = SafetyVerdict)),
    security(("api_jwt" = []))
)]
pub async fn analyze_safety(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<SafetyAnalysisPayload>,
) -> Result<Json<SafetyVerdict>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.inspection_service.analyze(&payload.items).await))
}

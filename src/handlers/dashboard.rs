// src/handlers/dashboard.rs

use axum::{
    extract::State,
    Json,
};

use crate::{
    common::{
        error::AppError,
        extract::{AppQuery},
    },
    config::AppState,
    models::dashboard::{DashboardFilter, DashboardSummary},
};

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    params(DashboardFilter),
    responses(
        (status = 200, description = "Inspection coverage and safety per unit", body = DashboardSummary),
        (status = 404, description = "Department not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<DashboardFilter>,
) -> Result<Json<DashboardSummary>, AppError> {
    Ok(Json(app_state.dashboard_service.get_summary(&filter).await?))
}

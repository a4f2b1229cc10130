// src/models/dashboard.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::inspection::ReportStatus;

#[derive(Debug, Default, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DashboardFilter {
    pub department_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// Situação de cada unidade segundo o relatório mais recente da janela
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnitStatusEntry {
    pub unit_id: i64,
    pub unit_code: String,
    // None = sem inspeção na janela
    pub status: Option<ReportStatus>,
    pub last_inspection_date: Option<NaiveDate>,
}

// Barras do gráfico mensal ("2025-03")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCount {
    #[schema(example = "2025-03")]
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
    pub total_units: usize,
    pub inspected_units: usize,
    pub uninspected_units: usize,
    pub safe_units: usize,
    pub unsafe_units: usize,
    pub unit_statuses: Vec<UnitStatusEntry>,
    pub monthly: Vec<MonthlyCount>,
}

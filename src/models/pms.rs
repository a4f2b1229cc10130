// src/models/pms.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum PmsStatus {
    Pending,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    Completed,
    Overdue,
    Skipped,
}

// Modelo de tarefa de manutenção preventiva
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PmsTaskMaster {
    pub id: i64,
    #[schema(example = "Hydraulic oil change")]
    pub task_name: String,
    pub description: Option<String>,
    #[schema(example = 90)]
    pub frequency_days: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PmsTaskMasterPayload {
    #[validate(length(min = 1, max = 100, message = "Task name is required."))]
    pub task_name: String,
    pub description: Option<String>,

    #[validate(range(min = 1, message = "Frequency must be at least one day."))]
    pub frequency_days: i64,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

// Ocorrência agendada de uma tarefa para uma unidade
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PmsScheduleEntry {
    pub id: i64,
    pub task_master_id: i64,
    pub unit_id: i64,
    pub scheduled_date: NaiveDate,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: PmsStatus,
    pub remarks: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePmsEntryPayload {
    pub task_master_id: i64,
    pub unit_id: i64,
    pub scheduled_date: NaiveDate,
    // Padrão: Pending
    pub status: Option<PmsStatus>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePmsEntryPayload {
    pub scheduled_date: NaiveDate,
    pub status: PmsStatus,
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PmsEntryFilter {
    pub unit_id: Option<i64>,
    pub status: Option<PmsStatus>,
}

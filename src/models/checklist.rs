// src/models/checklist.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

// Pergunta "mestre" reutilizável. O relatório guarda uma cópia congelada dela.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: i64,
    #[schema(example = "FORK-ARMS-01")]
    pub qr_payload: Option<String>,
    #[schema(example = "Fork arms")]
    pub part_name: String,
    pub description: Option<String>,
    #[schema(example = "Are the fork arms free of cracks and bends?")]
    pub question: String,
    pub is_active: bool,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemPayload {
    pub qr_payload: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Part name is required."))]
    pub part_name: String,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "Question is required."))]
    pub question: String,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default)]
    pub sort_order: i64,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ChecklistFilter {
    pub active: Option<bool>,
}

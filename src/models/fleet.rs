// src/models/fleet.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

// ---
// 1. Department
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    #[schema(example = "Warehouse A")]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Usado tanto no POST quanto no PUT (substituição completa)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPayload {
    #[validate(length(min = 1, max = 100, message = "Department name is required."))]
    #[schema(example = "Warehouse A")]
    pub name: String,
    pub description: Option<String>,
}

// ---
// 2. MHE Unit (empilhadeiras e afins)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UnitStatus {
    Active,
    Inactive,
    Maintenance,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MheUnit {
    pub id: i64,
    #[schema(example = "FL-001")]
    pub unit_code: String,
    #[schema(example = "Toyota 8FGU25")]
    pub name: String,
    pub department_id: Option<i64>,
    #[schema(example = "Forklift")]
    pub unit_type: Option<String>,
    pub status: UnitStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MheUnitPayload {
    #[validate(length(min = 1, max = 50, message = "Unit code is required."))]
    #[schema(example = "FL-001")]
    pub unit_code: String,

    #[validate(length(min = 1, max = 100, message = "Unit name is required."))]
    pub name: String,

    pub department_id: Option<i64>,
    pub unit_type: Option<String>,

    // Padrão: active
    pub status: Option<UnitStatus>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UnitFilter {
    pub department_id: Option<i64>,
    pub status: Option<UnitStatus>,
}

// src/models/inspection.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum ReportStatus {
    Safe,
    Unsafe,
}

impl ReportStatus {
    /// Unsafe se qualquer item for inseguro.
    pub fn from_flags<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        if flags.into_iter().all(|is_safe| is_safe) {
            ReportStatus::Safe
        } else {
            ReportStatus::Unsafe
        }
    }
}

// Fotos trafegam como data URI base64 dentro do JSON.
pub(crate) fn validate_photo_data_uri(photo: &str) -> Result<(), ValidationError> {
    let valid = photo
        .strip_prefix("data:image/")
        .and_then(|rest| rest.split_once(";base64,"))
        .is_some_and(|(_, data)| !data.is_empty());

    if !valid {
        let mut err = ValidationError::new("photo");
        err.message = Some("Photo must be a base64 image data URI (data:image/...;base64,...).".into());
        return Err(err);
    }
    Ok(())
}

// --- Linhas do banco ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReport {
    pub id: i64,
    pub unit_id: i64,
    #[schema(example = "FL-001")]
    pub unit_code: String,
    pub inspection_date: NaiveDate,
    #[schema(example = "jdoe")]
    pub operator_username: String,
    pub status: ReportStatus,
    pub user_id: i64,
    pub analysis_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReportItem {
    pub id: i64,
    pub report_id: i64,
    // Fica NULL se a pergunta mestre for apagada; o snapshot abaixo permanece.
    pub checklist_item_id: Option<i64>,
    pub part_name: String,
    pub question: String,
    pub is_safe: bool,
    pub photo: String,
    pub inspected_at: DateTime<Utc>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReportDetail {
    #[serde(flatten)]
    pub report: InspectionReport,
    pub items: Vec<InspectionReportItem>,
}

// --- Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportItemPayload {
    pub checklist_item_id: Option<i64>,

    #[validate(length(min = 1, message = "Part name is required."))]
    pub part_name: String,

    #[validate(length(min = 1, message = "Question is required."))]
    pub question: String,

    pub is_safe: bool,

    #[validate(custom(function = "validate_photo_data_uri"))]
    pub photo: String,

    // Se ausente, usa o horário do servidor
    pub inspected_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInspectionReportPayload {
    pub unit_id: i64,

    // Se ausente, usa a data de hoje
    pub inspection_date: Option<NaiveDate>,

    #[validate(length(min = 1, message = "A report needs at least one item."))]
    #[validate(nested)]
    pub items: Vec<ReportItemPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRemarks {
    pub item_id: i64,
    pub remarks: Option<String>,
}

// Snapshots e status nunca mudam; só a data e as observações.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInspectionReportPayload {
    pub inspection_date: Option<NaiveDate>,
    #[serde(default)]
    pub remarks: Vec<ItemRemarks>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportFilter {
    pub unit_id: Option<i64>,
    pub status: Option<ReportStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// --- Fluxo de inspeção (checklist guiado) ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub checklist_item_id: i64,
    pub is_safe: bool,

    #[validate(custom(function = "validate_photo_data_uri"))]
    pub photo: String,

    pub remarks: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitInspectionPayload {
    pub unit_id: i64,
    pub inspection_date: Option<NaiveDate>,

    #[validate(length(min = 1, message = "At least one submission is required."))]
    #[validate(nested)]
    pub submissions: Vec<SubmissionPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InspectionOutcome {
    pub report: InspectionReportDetail,
    pub analysis: SafetyVerdict,
}

// --- Análise de segurança ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub checklist_item_id: i64,
    pub part_name: Option<String>,
    pub question: Option<String>,

    #[validate(custom(function = "validate_photo_data_uri"))]
    pub photo: String,

    pub is_safe: bool,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Nome legível do item para mensagens e prompts.
    pub fn label(&self) -> String {
        match &self.part_name {
            Some(name) => format!("{} (item #{})", name, self.checklist_item_id),
            None => format!("item #{}", self.checklist_item_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SafetyAnalysisPayload {
    #[validate(length(min = 1, message = "At least one inspection record is required."))]
    #[validate(nested)]
    pub items: Vec<AnalysisRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SafetyVerdict {
    // O serviço de IA responde em snake_case
    #[serde(alias = "is_safe")]
    pub is_safe: bool,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_unsafe_when_any_flag_is_false() {
        assert_eq!(ReportStatus::from_flags([true, true, true]), ReportStatus::Safe);
        assert_eq!(ReportStatus::from_flags([true, false, true]), ReportStatus::Unsafe);
        assert_eq!(ReportStatus::from_flags(Vec::<bool>::new()), ReportStatus::Safe);
    }

    #[test]
    fn photo_must_be_an_image_data_uri() {
        assert!(validate_photo_data_uri("data:image/png;base64,iVBORw0KGgo=").is_ok());
        assert!(validate_photo_data_uri("data:image/jpeg;base64,").is_err());
        assert!(validate_photo_data_uri("https://example.com/a.png").is_err());
        assert!(validate_photo_data_uri("data:text/plain;base64,aGVsbG8=").is_err());
    }

    #[test]
    fn verdict_accepts_snake_case_from_the_model() {
        let verdict: SafetyVerdict =
            serde_json::from_str(r#"{"is_safe": false, "reason": "Horn not working"}"#).unwrap();
        assert!(!verdict.is_safe);
        assert_eq!(verdict.reason, "Horn not working");
    }
}

// src/models/downtime.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DowntimeLog {
    pub id: i64,
    pub unit_id: i64,
    pub unit_code: String,
    #[schema(example = "Hydraulic leak found during inspection")]
    pub reason: String,
    pub start_time: DateTime<Utc>,
    // Enquanto for NULL a parada está em aberto
    pub end_time: Option<DateTime<Utc>>,
    pub logged_at: DateTime<Utc>,
    pub source_report_id: Option<i64>,
    pub user_id: i64,
}

// Item inseguro copiado do relatório que originou a parada
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DowntimeUnsafeItem {
    pub id: i64,
    pub downtime_log_id: i64,
    pub part_name: String,
    pub question: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DowntimeLogDetail {
    #[serde(flatten)]
    pub log: DowntimeLog,
    pub unsafe_items: Vec<DowntimeUnsafeItem>,
}

fn validate_time_window(
    start_time: &DateTime<Utc>,
    end_time: &Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    if let Some(end) = end_time {
        if end < start_time {
            let mut err = ValidationError::new("time_window");
            err.message = Some("End time cannot be before start time.".into());
            return Err(err);
        }
    }
    Ok(())
}

fn validate_create_window(payload: &CreateDowntimeLogPayload) -> Result<(), ValidationError> {
    validate_time_window(&payload.start_time, &payload.end_time)
}

fn validate_update_window(payload: &UpdateDowntimeLogPayload) -> Result<(), ValidationError> {
    validate_time_window(&payload.start_time, &payload.end_time)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_window", skip_on_field_errors = false))]
pub struct CreateDowntimeLogPayload {
    pub unit_id: i64,

    #[validate(length(min = 1, message = "Reason is required."))]
    pub reason: String,

    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,

    // Relatório inseguro que motivou a parada (opcional)
    pub source_report_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_window", skip_on_field_errors = false))]
pub struct UpdateDowntimeLogPayload {
    #[validate(length(min = 1, message = "Reason is required."))]
    pub reason: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DowntimeFilter {
    pub unit_id: Option<i64>,
    // true = apenas paradas sem end_time
    pub open: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn payload(end_offset_minutes: Option<i64>) -> CreateDowntimeLogPayload {
        let start = Utc::now();
        CreateDowntimeLogPayload {
            unit_id: 1,
            reason: "Mast chain worn".into(),
            start_time: start,
            end_time: end_offset_minutes.map(|m| start + Duration::minutes(m)),
            source_report_id: None,
        }
    }

    #[test]
    fn open_and_forward_windows_are_valid() {
        assert!(payload(None).validate().is_ok());
        assert!(payload(Some(30)).validate().is_ok());
    }

    #[test]
    fn end_before_start_fails_the_whole_payload() {
        let errors = payload(Some(-5)).validate().unwrap_err();
        let all = errors.field_errors();
        let window = all.values().flat_map(|errs| errs.iter()).find(|e| e.code == "time_window");
        assert!(window.is_some());
    }

    #[test]
    fn field_errors_do_not_hide_the_window_check() {
        let mut bad = payload(Some(-5));
        bad.reason.clear();
        let errors = bad.validate().unwrap_err();
        let all = errors.field_errors();
        assert!(all.contains_key("reason"));
        assert!(all.values().flat_map(|errs| errs.iter()).any(|e| e.code == "time_window"));
    }
}

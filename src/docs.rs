// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::signup,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::list_users,
        handlers::auth::create_user,
        handlers::auth::delete_user,

        // --- Fleet ---
        handlers::fleet::list_departments,
        handlers::fleet::get_department,
        handlers::fleet::create_department,
        handlers::fleet::update_department,
        handlers::fleet::delete_department,
        handlers::fleet::list_units,
        handlers::fleet::get_unit,
        handlers::fleet::create_unit,
        handlers::fleet::update_unit,
        handlers::fleet::delete_unit,

        // --- Checklist ---
        handlers::checklist::list_items,
        handlers::checklist::get_item,
        handlers::checklist::create_item,
        handlers::checklist::update_item,
        handlers::checklist::delete_item,
        handlers::checklist::get_item_qr,

        // --- Inspections ---
        handlers::inspections::list_reports,
        handlers::inspections::get_report,
        handlers::inspections::create_report,
        handlers::inspections::update_report,
        handlers::inspections::delete_report,
        handlers::inspections::get_report_pdf,
        handlers::inspections::submit_inspection,
        handlers::inspections::analyze_safety,

        // --- Downtime ---
        handlers::downtime::list_logs,
        handlers::downtime::get_log,
        handlers::downtime::create_log,
        handlers::downtime::update_log,
        handlers::downtime::delete_log,

        // --- PMS ---
        handlers::pms::list_task_masters,
        handlers::pms::create_task_master,
        handlers::pms::update_task_master,
        handlers::pms::delete_task_master,
        handlers::pms::list_entries,
        handlers::pms::create_entry,
        handlers::pms::update_entry,
        handlers::pms::delete_entry,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::SignupPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Fleet ---
            models::fleet::Department,
            models::fleet::DepartmentPayload,
            models::fleet::UnitStatus,
            models::fleet::MheUnit,
            models::fleet::MheUnitPayload,

            // --- Checklist ---
            models::checklist::ChecklistItem,
            models::checklist::ChecklistItemPayload,

            // --- Inspections ---
            models::inspection::ReportStatus,
            models::inspection::InspectionReport,
            models::inspection::InspectionReportItem,
            models::inspection::InspectionReportDetail,
            models::inspection::ReportItemPayload,
            models::inspection::CreateInspectionReportPayload,
            models::inspection::ItemRemarks,
            models::inspection::UpdateInspectionReportPayload,
            models::inspection::SubmissionPayload,
            models::inspection::SubmitInspectionPayload,
            models::inspection::InspectionOutcome,
            models::inspection::AnalysisRecord,
            models::inspection::SafetyAnalysisPayload,
            models::inspection::SafetyVerdict,

            // --- Downtime ---
            models::downtime::DowntimeLog,
            models::downtime::DowntimeUnsafeItem,
            models::downtime::DowntimeLogDetail,
            models::downtime::CreateDowntimeLogPayload,
            models::downtime::UpdateDowntimeLogPayload,

            // --- PMS ---
            models::pms::PmsStatus,
            models::pms::PmsTaskMaster,
            models::pms::PmsTaskMasterPayload,
            models::pms::PmsScheduleEntry,
            models::pms::CreatePmsEntryPayload,
            models::pms::UpdatePmsEntryPayload,

            // --- Dashboard ---
            models::dashboard::UnitStatusEntry,
            models::dashboard::MonthlyCount,
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Signup and login"),
        (name = "Users", description = "User accounts and roles"),
        (name = "Fleet", description = "Departments and MHE units"),
        (name = "Checklist", description = "Checklist master items and QR codes"),
        (name = "Inspections", description = "Pre-use inspections, reports and safety analysis"),
        (name = "Downtime", description = "Unit downtime logs"),
        (name = "PMS", description = "Preventive maintenance schedule"),
        (name = "Dashboard", description = "Inspection coverage indicators")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented_under_api() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().all(|p| p.starts_with("/api/")));
        assert!(doc.paths.paths.contains_key("/api/inspections"));
        assert!(doc.paths.paths.contains_key("/api/dashboard/summary"));
    }
}

// src/client/api_client.rs

use std::{io::Read, time::Duration};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    client::{ClientError, Session},
    models::{
        auth::{AuthResponse, LoginPayload, SignupPayload, User},
        checklist::{ChecklistFilter, ChecklistItem, ChecklistItemPayload},
        dashboard::{DashboardFilter, DashboardSummary},
        downtime::{
            CreateDowntimeLogPayload, DowntimeFilter, DowntimeLog, DowntimeLogDetail, UpdateDowntimeLogPayload,
        },
        fleet::{Department, DepartmentPayload, MheUnit, MheUnitPayload, UnitFilter},
        inspection::{
            AnalysisRecord, CreateInspectionReportPayload, InspectionOutcome, InspectionReport,
            InspectionReportDetail, ReportFilter, SafetyAnalysisPayload, SafetyVerdict, SubmitInspectionPayload,
            UpdateInspectionReportPayload,
        },
        pms::{
            CreatePmsEntryPayload, PmsEntryFilter, PmsScheduleEntry, PmsTaskMaster, PmsTaskMasterPayload,
            UpdatePmsEntryPayload,
        },
    },
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Cliente HTTP bloqueante para a API REST.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let agent = ureq::AgentBuilder::new().timeout(DEFAULT_TIMEOUT).build();
        Self { base_url, agent }
    }

    /// Usa `MHE_API_BASE_URL`, ou o servidor local.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("MHE_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---
    // Infra
    // ---

    fn request(&self, method: &str, path: &str, session: Option<&Session>) -> ureq::Request {
        let request = self.agent.request(method, &format!("{}{}", self.base_url, path));
        match session {
            Some(session) => request.set("Authorization", &session.bearer()),
            None => request,
        }
    }

    // Filtros viram query string; campos None ficam de fora
    fn with_query<F: Serialize>(mut request: ureq::Request, filter: &F) -> Result<ureq::Request, ClientError> {
        let value = serde_json::to_value(filter).map_err(|e| ClientError::Decode(e.to_string()))?;
        if let Value::Object(fields) = value {
            for (key, value) in fields {
                let rendered = match value {
                    Value::Null => continue,
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                request = request.query(&key, &rendered);
            }
        }
        Ok(request)
    }

    fn execute(request: ureq::Request, body: Option<Value>) -> Result<ureq::Response, ClientError> {
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };
        match result {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(ClientError::from_status(status, &body))
            }
            Err(ureq::Error::Transport(transport)) => Err(ClientError::Network(transport.to_string())),
        }
    }

    fn json_body<B: Serialize>(body: &B) -> Result<Value, ClientError> {
        serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(response: ureq::Response) -> Result<T, ClientError> {
        response
            .into_json::<T>()
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, session: &Session) -> Result<T, ClientError> {
        Self::decode(Self::execute(self.request("GET", path, Some(session)), None)?)
    }

    fn list<T: DeserializeOwned, F: Serialize>(
        &self,
        path: &str,
        session: &Session,
        filter: &F,
    ) -> Result<T, ClientError> {
        let request = Self::with_query(self.request("GET", path, Some(session)), filter)?;
        Self::decode(Self::execute(request, None)?)
    }

    fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &str,
        path: &str,
        session: Option<&Session>,
        body: &B,
    ) -> Result<T, ClientError> {
        let request = self.request(method, path, session);
        Self::decode(Self::execute(request, Some(Self::json_body(body)?))?)
    }

    fn delete(&self, path: &str, session: &Session) -> Result<(), ClientError> {
        Self::execute(self.request("DELETE", path, Some(session)), None)?;
        Ok(())
    }

    fn get_bytes(&self, path: &str, session: &Session) -> Result<Vec<u8>, ClientError> {
        let response = Self::execute(self.request("GET", path, Some(session)), None)?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(bytes)
    }

    // =========================================================================
    //  AUTH / USERS
    // =========================================================================

    pub fn health(&self) -> Result<String, ClientError> {
        Self::execute(self.request("GET", "/api/health", None), None)?
            .into_string()
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub fn signup(&self, payload: &SignupPayload) -> Result<Session, ClientError> {
        let response: AuthResponse = self.send("POST", "/api/auth/signup", None, payload)?;
        Ok(response.into())
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let payload = LoginPayload {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self.send("POST", "/api/auth/login", None, &payload)?;
        Ok(response.into())
    }

    pub fn me(&self, session: &Session) -> Result<User, ClientError> {
        self.get_json("/api/users/me", session)
    }

    pub fn list_users(&self, session: &Session) -> Result<Vec<User>, ClientError> {
        self.get_json("/api/users", session)
    }

    pub fn create_user(&self, session: &Session, payload: &SignupPayload) -> Result<User, ClientError> {
        self.send("POST", "/api/users", Some(session), payload)
    }

    pub fn delete_user(&self, session: &Session, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/users/{id}"), session)
    }

    // =========================================================================
    //  DEPARTMENTS / UNITS
    // =========================================================================

    pub fn list_departments(&self, session: &Session) -> Result<Vec<Department>, ClientError> {
        self.get_json("/api/departments", session)
    }

    pub fn get_department(&self, session: &Session, id: i64) -> Result<Department, ClientError> {
        self.get_json(&format!("/api/departments/{id}"), session)
    }

    pub fn create_department(&self, session: &Session, payload: &DepartmentPayload) -> Result<Department, ClientError> {
        self.send("POST", "/api/departments", Some(session), payload)
    }

    pub fn update_department(
        &self,
        session: &Session,
        id: i64,
        payload: &DepartmentPayload,
    ) -> Result<Department, ClientError> {
        self.send("PUT", &format!("/api/departments/{id}"), Some(session), payload)
    }

    pub fn delete_department(&self, session: &Session, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/departments/{id}"), session)
    }

    pub fn list_units(&self, session: &Session, filter: &UnitFilter) -> Result<Vec<MheUnit>, ClientError> {
        self.list("/api/mhe-units", session, filter)
    }

    pub fn get_unit(&self, session: &Session, id: i64) -> Result<MheUnit, ClientError> {
        self.get_json(&format!("/api/mhe-units/{id}"), session)
    }

    pub fn create_unit(&self, session: &Session, payload: &MheUnitPayload) -> Result<MheUnit, ClientError> {
        self.send("POST", "/api/mhe-units", Some(session), payload)
    }

    pub fn update_unit(&self, session: &Session, id: i64, payload: &MheUnitPayload) -> Result<MheUnit, ClientError> {
        self.send("PUT", &format!("/api/mhe-units/{id}"), Some(session), payload)
    }

    pub fn delete_unit(&self, session: &Session, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/mhe-units/{id}"), session)
    }

    // =========================================================================
    //  CHECKLIST
    // =========================================================================

    pub fn list_checklist_items(
        &self,
        session: &Session,
        filter: &ChecklistFilter,
    ) -> Result<Vec<ChecklistItem>, ClientError> {
        self.list("/api/checklist-items", session, filter)
    }

    pub fn get_checklist_item(&self, session: &Session, id: i64) -> Result<ChecklistItem, ClientError> {
        self.get_json(&format!("/api/checklist-items/{id}"), session)
    }

    pub fn create_checklist_item(
        &self,
        session: &Session,
        payload: &ChecklistItemPayload,
    ) -> Result<ChecklistItem, ClientError> {
        self.send("POST", "/api/checklist-items", Some(session), payload)
    }

    pub fn update_checklist_item(
        &self,
        session: &Session,
        id: i64,
        payload: &ChecklistItemPayload,
    ) -> Result<ChecklistItem, ClientError> {
        self.send("PUT", &format!("/api/checklist-items/{id}"), Some(session), payload)
    }

    pub fn delete_checklist_item(&self, session: &Session, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/checklist-items/{id}"), session)
    }

    /// PNG do QR code do item.
    pub fn checklist_item_qr(&self, session: &Session, id: i64) -> Result<Vec<u8>, ClientError> {
        self.get_bytes(&format!("/api/checklist-items/{id}/qr"), session)
    }

    // =========================================================================
    //  INSPECTIONS
    // =========================================================================

    pub fn list_reports(&self, session: &Session, filter: &ReportFilter) -> Result<Vec<InspectionReport>, ClientError> {
        self.list("/api/inspection-reports", session, filter)
    }

    pub fn get_report(&self, session: &Session, id: i64) -> Result<InspectionReportDetail, ClientError> {
        self.get_json(&format!("/api/inspection-reports/{id}"), session)
    }

    pub fn create_report(
        &self,
        session: &Session,
        payload: &CreateInspectionReportPayload,
    ) -> Result<InspectionReportDetail, ClientError> {
        self.send("POST", "/api/inspection-reports", Some(session), payload)
    }

    pub fn update_report(
        &self,
        session: &Session,
        id: i64,
        payload: &UpdateInspectionReportPayload,
    ) -> Result<InspectionReportDetail, ClientError> {
        self.send("PUT", &format!("/api/inspection-reports/{id}"), Some(session), payload)
    }

    pub fn delete_report(&self, session: &Session, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/inspection-reports/{id}"), session)
    }

    pub fn report_pdf(&self, session: &Session, id: i64) -> Result<Vec<u8>, ClientError> {
        self.get_bytes(&format!("/api/inspection-reports/{id}/pdf"), session)
    }

    pub fn submit_inspection(
        &self,
        session: &Session,
        payload: &SubmitInspectionPayload,
    ) -> Result<InspectionOutcome, ClientError> {
        self.send("POST", "/api/inspections", Some(session), payload)
    }

    pub fn analyze_safety(&self, session: &Session, records: &[AnalysisRecord]) -> Result<SafetyVerdict, ClientError> {
        let payload = SafetyAnalysisPayload {
            items: records.to_vec(),
        };
        self.send("POST", "/api/safety-analysis", Some(session), &payload)
    }

    // =========================================================================
    //  DOWNTIME
    // =========================================================================

    pub fn list_downtime_logs(
        &self,
        session: &Session,
        filter: &DowntimeFilter,
    ) -> Result<Vec<DowntimeLog>, ClientError> {
        self.list("/api/downtime-logs", session, filter)
    }

    pub fn get_downtime_log(&self, session: &Session, id: i64) -> Result<DowntimeLogDetail, ClientError> {
        self.get_json(&format!("/api/downtime-logs/{id}"), session)
    }

    pub fn create_downtime_log(
        &self,
        session: &Session,
        payload: &CreateDowntimeLogPayload,
    ) -> Result<DowntimeLogDetail, ClientError> {
        self.send("POST", "/api/downtime-logs", Some(session), payload)
    }

    pub fn update_downtime_log(
        &self,
        session: &Session,
        id: i64,
        payload: &UpdateDowntimeLogPayload,
    ) -> Result<DowntimeLogDetail, ClientError> {
        self.send("PUT", &format!("/api/downtime-logs/{id}"), Some(session), payload)
    }

    pub fn delete_downtime_log(&self, session: &Session, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/downtime-logs/{id}"), session)
    }

    // =========================================================================
    //  PMS
    // =========================================================================

    pub fn list_pms_tasks(&self, session: &Session) -> Result<Vec<PmsTaskMaster>, ClientError> {
        self.get_json("/api/pms-task-masters", session)
    }

    pub fn create_pms_task(&self, session: &Session, payload: &PmsTaskMasterPayload) -> Result<PmsTaskMaster, ClientError> {
        self.send("POST", "/api/pms-task-masters", Some(session), payload)
    }

    pub fn update_pms_task(
        &self,
        session: &Session,
        id: i64,
        payload: &PmsTaskMasterPayload,
    ) -> Result<PmsTaskMaster, ClientError> {
        self.send("PUT", &format!("/api/pms-task-masters/{id}"), Some(session), payload)
    }

    pub fn delete_pms_task(&self, session: &Session, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/pms-task-masters/{id}"), session)
    }

    pub fn list_pms_entries(
        &self,
        session: &Session,
        filter: &PmsEntryFilter,
    ) -> Result<Vec<PmsScheduleEntry>, ClientError> {
        self.list("/api/pms-schedule-entries", session, filter)
    }

    pub fn create_pms_entry(
        &self,
        session: &Session,
        payload: &CreatePmsEntryPayload,
    ) -> Result<PmsScheduleEntry, ClientError> {
        self.send("POST", "/api/pms-schedule-entries", Some(session), payload)
    }

    pub fn update_pms_entry(
        &self,
        session: &Session,
        id: i64,
        payload: &UpdatePmsEntryPayload,
    ) -> Result<PmsScheduleEntry, ClientError> {
        self.send("PUT", &format!("/api/pms-schedule-entries/{id}"), Some(session), payload)
    }

    pub fn delete_pms_entry(&self, session: &Session, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/api/pms-schedule-entries/{id}"), session)
    }

    // =========================================================================
    //  DASHBOARD
    // =========================================================================

    pub fn dashboard_summary(
        &self,
        session: &Session,
        filter: &DashboardFilter,
    ) -> Result<DashboardSummary, ClientError> {
        self.list("/api/dashboard/summary", session, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        assert_eq!(ApiClient::new("http://localhost:3000/").base_url(), "http://localhost:3000");
    }

    #[test]
    fn unreachable_server_is_a_network_error() {
        let client = ApiClient::new("http://127.0.0.1:9");
        match client.health() {
            Err(ClientError::Network(_)) => {}
            other => panic!("expected network error, got {other:?}"),
        }
    }
}

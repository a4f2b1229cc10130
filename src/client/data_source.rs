// src/client/data_source.rs

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    client::{ApiClient, ClientError, Session},
    models::{
        dashboard::DashboardFilter,
        dashboard::DashboardSummary,
        fleet::{Department, MheUnit, UnitFilter},
        inspection::{InspectionReport, ReportFilter},
    },
    services::dashboard_service::summarize,
};

/// Cópia local das coleções usadas pelo dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineSnapshot {
    pub departments: Vec<Department>,
    pub units: Vec<MheUnit>,
    pub reports: Vec<InspectionReport>,
}

impl OfflineSnapshot {
    /// Baixa as coleções completas da API.
    pub fn fetch(client: &ApiClient, session: &Session) -> Result<Self, ClientError> {
        Ok(Self {
            departments: client.list_departments(session)?,
            units: client.list_units(session, &UnitFilter::default())?,
            reports: client.list_reports(session, &ReportFilter::default())?,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| ClientError::Decode(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ClientError> {
        let raw = serde_json::to_string_pretty(self).map_err(|e| ClientError::Decode(e.to_string()))?;
        std::fs::write(path.as_ref(), raw).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Origem dos dados do dashboard, escolhida pelo tipo.
pub enum DataSource {
    Online { client: ApiClient, session: Session },
    Offline(OfflineSnapshot),
}

impl DataSource {
    pub fn is_online(&self) -> bool {
        matches!(self, DataSource::Online { .. })
    }

    pub fn units(&self, filter: &UnitFilter) -> Result<Vec<MheUnit>, ClientError> {
        match self {
            DataSource::Online { client, session } => client.list_units(session, filter),
            DataSource::Offline(snapshot) => Ok(snapshot
                .units
                .iter()
                .filter(|u| filter.department_id.is_none() || u.department_id == filter.department_id)
                .filter(|u| filter.status.is_none_or(|status| u.status == status))
                .cloned()
                .collect()),
        }
    }

    pub fn dashboard(&self, filter: &DashboardFilter) -> Result<DashboardSummary, ClientError> {
        match self {
            DataSource::Online { client, session } => client.dashboard_summary(session, filter),
            DataSource::Offline(snapshot) => Ok(summarize(
                &snapshot.departments,
                &snapshot.units,
                &snapshot.reports,
                filter,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fleet::UnitStatus, inspection::ReportStatus};
    use chrono::{NaiveDate, Utc};

    fn snapshot() -> OfflineSnapshot {
        let unit = |id: i64, status| MheUnit {
            id,
            unit_code: format!("FL-{id:03}"),
            name: format!("Forklift {id}"),
            department_id: Some(1),
            unit_type: None,
            status,
            created_at: Utc::now(),
        };
        OfflineSnapshot {
            departments: vec![Department {
                id: 1,
                name: "Stores".into(),
                description: None,
                created_at: Utc::now(),
            }],
            units: vec![unit(1, UnitStatus::Active), unit(2, UnitStatus::Active), unit(3, UnitStatus::Inactive)],
            reports: vec![InspectionReport {
                id: 1,
                unit_id: 1,
                unit_code: "FL-001".into(),
                inspection_date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
                operator_username: "op".into(),
                status: ReportStatus::Unsafe,
                user_id: 1,
                analysis_reason: Some("Unsafe items found: Horn (item #2).".into()),
                created_at: Utc::now(),
            }],
        }
    }

    #[test]
    fn offline_dashboard_is_computed_locally() {
        let source = DataSource::Offline(snapshot());
        assert!(!source.is_online());

        let summary = source
            .dashboard(&DashboardFilter {
                department_id: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(summary.total_units, 2);
        assert_eq!(summary.uninspected_units, 1);
        assert_eq!(summary.unsafe_units, 1);
    }

    #[test]
    fn offline_units_honour_the_filter() {
        let source = DataSource::Offline(snapshot());
        let active = source
            .units(&UnitFilter {
                status: Some(UnitStatus::Active),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(active.len(), 2);
    }

    #[test]
    fn snapshot_survives_a_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        snapshot().save(&path).unwrap();
        let loaded = OfflineSnapshot::load(&path).unwrap();
        assert_eq!(loaded.units.len(), 3);
        assert_eq!(loaded.reports[0].status, ReportStatus::Unsafe);
    }
}

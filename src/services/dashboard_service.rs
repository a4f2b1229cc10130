// src/services/dashboard_service.rs

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    db::{FleetRepository, InspectionRepository},
    models::{
        dashboard::{DashboardFilter, DashboardSummary, MonthlyCount, UnitStatusEntry},
        fleet::{Department, MheUnit, UnitFilter, UnitStatus},
        inspection::{InspectionReport, ReportFilter, ReportStatus},
    },
};

// ---
// Agregações puras: recalculadas do zero a cada chamada
// ---

/// Unidades ativas do departamento (ou de todos, se None).
pub fn active_units(units: &[MheUnit], department_id: Option<i64>) -> Vec<&MheUnit> {
    units
        .iter()
        .filter(|unit| unit.status == UnitStatus::Active)
        .filter(|unit| department_id.is_none() || unit.department_id == department_id)
        .collect()
}

/// Relatórios dentro da janela [from, to], ambos inclusivos e opcionais.
pub fn reports_in_window(
    reports: &[InspectionReport],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<&InspectionReport> {
    reports
        .iter()
        .filter(|r| from.is_none_or(|from| r.inspection_date >= from))
        .filter(|r| to.is_none_or(|to| r.inspection_date <= to))
        .collect()
}

/// Unidades sem nenhum relatório na janela.
pub fn uninspected_units<'a>(units: &[&'a MheUnit], reports: &[&InspectionReport]) -> Vec<&'a MheUnit> {
    let inspected: HashSet<i64> = reports.iter().map(|r| r.unit_id).collect();
    units
        .iter()
        .copied()
        .filter(|unit| !inspected.contains(&unit.id))
        .collect()
}

/// Situação de cada unidade segundo seu relatório mais recente.
pub fn latest_status_by_unit(units: &[&MheUnit], reports: &[&InspectionReport]) -> Vec<UnitStatusEntry> {
    let mut latest: HashMap<i64, &InspectionReport> = HashMap::new();
    for &report in reports {
        latest
            .entry(report.unit_id)
            .and_modify(|current| {
                if (report.inspection_date, report.created_at, report.id)
                    > (current.inspection_date, current.created_at, current.id)
                {
                    *current = report;
                }
            })
            .or_insert(report);
    }

    units
        .iter()
        .map(|unit| {
            let report = latest.get(&unit.id);
            UnitStatusEntry {
                unit_id: unit.id,
                unit_code: unit.unit_code.clone(),
                status: report.map(|r| r.status),
                last_inspection_date: report.map(|r| r.inspection_date),
            }
        })
        .collect()
}

/// Quantidade de relatórios por mês ("YYYY-MM"), em ordem crescente.
pub fn monthly_counts(reports: &[&InspectionReport]) -> Vec<MonthlyCount> {
    let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
    for report in reports {
        *buckets
            .entry(report.inspection_date.format("%Y-%m").to_string())
            .or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(month, count)| MonthlyCount { month, count })
        .collect()
}

pub fn summarize(
    departments: &[Department],
    units: &[MheUnit],
    reports: &[InspectionReport],
    filter: &DashboardFilter,
) -> DashboardSummary {
    let scoped_units = active_units(units, filter.department_id);
    let unit_ids: HashSet<i64> = scoped_units.iter().map(|u| u.id).collect();

    let scoped_reports: Vec<&InspectionReport> = reports_in_window(reports, filter.from, filter.to)
        .into_iter()
        .filter(|r| unit_ids.contains(&r.unit_id))
        .collect();

    let uninspected = uninspected_units(&scoped_units, &scoped_reports);
    let unit_statuses = latest_status_by_unit(&scoped_units, &scoped_reports);

    let count_status = |status: ReportStatus| {
        unit_statuses
            .iter()
            .filter(|entry| entry.status == Some(status))
            .count()
    };
    let safe_units = count_status(ReportStatus::Safe);
    let unsafe_units = count_status(ReportStatus::Unsafe);

    let department_name = filter.department_id.and_then(|id| {
        departments
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.clone())
    });

    DashboardSummary {
        department_id: filter.department_id,
        department_name,
        total_units: scoped_units.len(),
        inspected_units: scoped_units.len() - uninspected.len(),
        uninspected_units: uninspected.len(),
        safe_units,
        unsafe_units,
        unit_statuses,
        monthly: monthly_counts(&scoped_reports),
    }
}

#[derive(Clone)]
pub struct DashboardService {
    fleet_repo: FleetRepository,
    inspection_repo: InspectionRepository,
}

impl DashboardService {
    pub fn new(fleet_repo: FleetRepository, inspection_repo: InspectionRepository) -> Self {
        Self {
            fleet_repo,
            inspection_repo,
        }
    }

    pub async fn get_summary(&self, filter: &DashboardFilter) -> Result<DashboardSummary, AppError> {
        if let Some(department_id) = filter.department_id {
            self.fleet_repo
                .find_department(department_id)
                .await?
                .ok_or_else(|| AppError::not_found("Department", department_id))?;
        }

        let departments = self.fleet_repo.list_departments().await?;
        let units = self.fleet_repo.list_units(&UnitFilter::default()).await?;
        let reports = self.inspection_repo.list_reports(&ReportFilter::default()).await?;

        Ok(summarize(&departments, &units, &reports, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn unit(id: i64, department_id: Option<i64>, status: UnitStatus) -> MheUnit {
        MheUnit {
            id,
            unit_code: format!("FL-{id:03}"),
            name: format!("Forklift {id}"),
            department_id,
            unit_type: None,
            status,
            created_at: Utc::now(),
        }
    }

    fn report(id: i64, unit_id: i64, date: (i32, u32, u32), status: ReportStatus) -> InspectionReport {
        InspectionReport {
            id,
            unit_id,
            unit_code: format!("FL-{unit_id:03}"),
            inspection_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            operator_username: "op".to_string(),
            status,
            user_id: 1,
            analysis_reason: None,
            created_at: Utc.with_ymd_and_hms(date.0, date.1, date.2, 8, 0, 0).unwrap(),
        }
    }

    fn department(id: i64, name: &str) -> Department {
        Department {
            id,
            name: name.to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn uninspected_count_is_active_units_minus_distinct_inspected() {
        let units = vec![
            unit(1, Some(10), UnitStatus::Active),
            unit(2, Some(10), UnitStatus::Active),
            unit(3, Some(10), UnitStatus::Active),
            unit(4, Some(10), UnitStatus::Active),
            unit(5, Some(10), UnitStatus::Maintenance),
            unit(6, Some(20), UnitStatus::Active),
        ];
        let reports = vec![
            report(1, 1, (2025, 3, 2), ReportStatus::Safe),
            report(2, 1, (2025, 3, 5), ReportStatus::Unsafe),
            report(3, 2, (2025, 3, 6), ReportStatus::Safe),
            // fora da janela
            report(4, 3, (2025, 1, 10), ReportStatus::Safe),
            // outro departamento
            report(5, 6, (2025, 3, 6), ReportStatus::Safe),
        ];
        let filter = DashboardFilter {
            department_id: Some(10),
            from: date(2025, 3, 1),
            to: date(2025, 3, 31),
        };

        let summary = summarize(&[department(10, "Stores")], &units, &reports, &filter);
        assert_eq!(summary.total_units, 4);
        assert_eq!(summary.inspected_units, 2);
        assert_eq!(summary.uninspected_units, 2);
        assert_eq!(summary.department_name.as_deref(), Some("Stores"));
    }

    #[test]
    fn latest_report_in_window_decides_unit_status() {
        let units = vec![unit(1, None, UnitStatus::Active), unit(2, None, UnitStatus::Active)];
        let reports = vec![
            report(1, 1, (2025, 3, 2), ReportStatus::Safe),
            report(2, 1, (2025, 3, 5), ReportStatus::Unsafe),
            report(3, 2, (2025, 3, 1), ReportStatus::Unsafe),
            report(4, 2, (2025, 3, 9), ReportStatus::Safe),
        ];

        let summary = summarize(&[], &units, &reports, &DashboardFilter::default());
        assert_eq!(summary.safe_units, 1);
        assert_eq!(summary.unsafe_units, 1);

        let first = &summary.unit_statuses[0];
        assert_eq!(first.unit_id, 1);
        assert_eq!(first.status, Some(ReportStatus::Unsafe));
        assert_eq!(first.last_inspection_date, date(2025, 3, 5));
    }

    #[test]
    fn units_without_reports_have_no_status() {
        let units = vec![unit(1, None, UnitStatus::Active)];
        let summary = summarize(&[], &units, &[], &DashboardFilter::default());
        assert_eq!(summary.uninspected_units, 1);
        assert_eq!(summary.unit_statuses[0].status, None);
        assert!(summary.monthly.is_empty());
    }

    #[test]
    fn reports_are_bucketed_by_month_in_order() {
        let reports = vec![
            report(1, 1, (2025, 3, 2), ReportStatus::Safe),
            report(2, 1, (2025, 1, 5), ReportStatus::Safe),
            report(3, 2, (2025, 3, 20), ReportStatus::Unsafe),
        ];
        let refs: Vec<&InspectionReport> = reports.iter().collect();
        let monthly = monthly_counts(&refs);
        assert_eq!(
            monthly,
            vec![
                MonthlyCount { month: "2025-01".into(), count: 1 },
                MonthlyCount { month: "2025-03".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let reports = vec![
            report(1, 1, (2025, 3, 1), ReportStatus::Safe),
            report(2, 1, (2025, 3, 31), ReportStatus::Safe),
            report(3, 1, (2025, 4, 1), ReportStatus::Safe),
        ];
        let in_window = reports_in_window(&reports, date(2025, 3, 1), date(2025, 3, 31));
        assert_eq!(in_window.len(), 2);
    }
}

// src/services/inspection_service.rs

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{ChecklistRepository, FleetRepository, InspectionRepository},
    models::{
        auth::User,
        checklist::ChecklistFilter,
        inspection::{
            AnalysisRecord, CreateInspectionReportPayload, InspectionOutcome, InspectionReport,
            InspectionReportDetail, ReportFilter, ReportItemPayload, ReportStatus, SafetyVerdict,
            SubmitInspectionPayload, UpdateInspectionReportPayload,
        },
    },
    services::safety_service::SafetyService,
    workflow::InspectionWorkflow,
};

#[derive(Clone)]
pub struct InspectionService {
    pool: SqlitePool,
    inspection_repo: InspectionRepository,
    fleet_repo: FleetRepository,
    checklist_repo: ChecklistRepository,
    safety_service: SafetyService,
}

impl InspectionService {
    pub fn new(
        pool: SqlitePool,
        inspection_repo: InspectionRepository,
        fleet_repo: FleetRepository,
        checklist_repo: ChecklistRepository,
        safety_service: SafetyService,
    ) -> Self {
        Self {
            pool,
            inspection_repo,
            fleet_repo,
            checklist_repo,
            safety_service,
        }
    }

    pub async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<InspectionReport>, AppError> {
        self.inspection_repo.list_reports(filter).await
    }

    pub async fn get_detail(&self, id: i64) -> Result<InspectionReportDetail, AppError> {
        let report = self
            .inspection_repo
            .find_report(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Inspection report", id))?;
        let items = self.inspection_repo.list_items(&self.pool, id).await?;
        Ok(InspectionReportDetail { report, items })
    }

    /// Relatório montado pelo cliente; o status é sempre recalculado aqui.
    pub async fn create_report(
        &self,
        payload: &CreateInspectionReportPayload,
        user: &User,
    ) -> Result<InspectionReportDetail, AppError> {
        self.persist_report(payload.unit_id, payload.inspection_date, &payload.items, user, None)
            .await
    }

    // Só data e observações são editáveis
    pub async fn update_report(
        &self,
        id: i64,
        payload: &UpdateInspectionReportPayload,
    ) -> Result<InspectionReportDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        self.inspection_repo
            .find_report(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Inspection report", id))?;

        if let Some(date) = payload.inspection_date {
            self.inspection_repo.update_report_date(&mut *tx, id, date).await?;
        }

        for entry in &payload.remarks {
            let updated = self
                .inspection_repo
                .update_item_remarks(&mut *tx, id, entry.item_id, entry.remarks.as_deref())
                .await?;
            if !updated {
                return Err(AppError::BadRequest(format!(
                    "Item {} does not belong to inspection report {}.",
                    entry.item_id, id
                )));
            }
        }

        tx.commit().await?;
        self.get_detail(id).await
    }

    pub async fn delete_report(&self, id: i64) -> Result<(), AppError> {
        if !self.inspection_repo.delete_report(id).await? {
            return Err(AppError::not_found("Inspection report", id));
        }
        Ok(())
    }

    pub async fn analyze(&self, records: &[AnalysisRecord]) -> SafetyVerdict {
        self.safety_service.analyze_with_fallback(records).await
    }

    /// Checklist guiado completo: grava as respostas, exige todos os itens
    /// ativos, consulta a análise de segurança e persiste o relatório.
    pub async fn submit_inspection(
        &self,
        payload: &SubmitInspectionPayload,
        user: &User,
    ) -> Result<InspectionOutcome, AppError> {
        // Unidade inválida não chega a consultar a análise
        self.fleet_repo
            .find_unit(&self.pool, payload.unit_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("MHE unit {} does not exist.", payload.unit_id)))?;

        let active = ChecklistFilter { active: Some(true) };
        let items = self.checklist_repo.list_items(&self.pool, &active).await?;
        if items.is_empty() {
            return Err(AppError::BadRequest(
                "No active checklist items are configured.".to_string(),
            ));
        }

        let mut workflow = InspectionWorkflow::new(items);
        for submission in &payload.submissions {
            workflow
                .record_at(
                    submission.checklist_item_id,
                    submission.is_safe,
                    submission.photo.clone(),
                    submission.remarks.clone(),
                    submission.timestamp.unwrap_or_else(Utc::now),
                )
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
        }

        if !workflow.is_complete() {
            return Err(AppError::BadRequest(format!(
                "Inspection is incomplete: {} of {} checklist items are still pending.",
                workflow.pending().len(),
                workflow.items().len()
            )));
        }

        let analysis = self.analyze(&workflow.analysis_records()).await;
        let report = self
            .persist_report(
                payload.unit_id,
                payload.inspection_date,
                &workflow.report_items(),
                user,
                Some(analysis.reason.as_str()),
            )
            .await?;

        tracing::info!(
            "📋 Inspection {} for unit {} recorded as {:?} by '{}'",
            report.report.id,
            report.report.unit_code,
            report.report.status,
            user.username
        );

        Ok(InspectionOutcome { report, analysis })
    }

    // Relatório + itens numa única transação
    async fn persist_report(
        &self,
        unit_id: i64,
        inspection_date: Option<NaiveDate>,
        items: &[ReportItemPayload],
        user: &User,
        analysis_reason: Option<&str>,
    ) -> Result<InspectionReportDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let unit = self
            .fleet_repo
            .find_unit(&mut *tx, unit_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("MHE unit {} does not exist.", unit_id)))?;

        let status = ReportStatus::from_flags(items.iter().map(|item| item.is_safe));
        let date = inspection_date.unwrap_or_else(|| Utc::now().date_naive());

        let report = self
            .inspection_repo
            .create_report(&mut *tx, &unit, date, &user.username, status, user.id, analysis_reason)
            .await?;

        let mut saved_items = Vec::with_capacity(items.len());
        for item in items {
            let inspected_at = item.inspected_at.unwrap_or_else(Utc::now);
            let saved = self
                .inspection_repo
                .insert_item(&mut *tx, report.id, item, inspected_at)
                .await?;
            saved_items.push(saved);
        }

        tx.commit().await?;

        Ok(InspectionReportDetail {
            report,
            items: saved_items,
        })
    }
}

// src/services/downtime_service.rs

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{DowntimeRepository, FleetRepository, InspectionRepository},
    models::{
        auth::User,
        downtime::{CreateDowntimeLogPayload, DowntimeFilter, DowntimeLog, DowntimeLogDetail, UpdateDowntimeLogPayload},
    },
};

#[derive(Clone)]
pub struct DowntimeService {
    pool: SqlitePool,
    downtime_repo: DowntimeRepository,
    fleet_repo: FleetRepository,
    inspection_repo: InspectionRepository,
}

impl DowntimeService {
    pub fn new(
        pool: SqlitePool,
        downtime_repo: DowntimeRepository,
        fleet_repo: FleetRepository,
        inspection_repo: InspectionRepository,
    ) -> Self {
        Self {
            pool,
            downtime_repo,
            fleet_repo,
            inspection_repo,
        }
    }

    pub async fn list_logs(&self, filter: &DowntimeFilter) -> Result<Vec<DowntimeLog>, AppError> {
        self.downtime_repo.list_logs(filter).await
    }

    pub async fn get_detail(&self, id: i64) -> Result<DowntimeLogDetail, AppError> {
        let log = self
            .downtime_repo
            .find_log(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Downtime log", id))?;
        let unsafe_items = self.downtime_repo.list_unsafe_items(&self.pool, id).await?;
        Ok(DowntimeLogDetail { log, unsafe_items })
    }

    /// Abre uma parada. Com `sourceReportId`, os itens inseguros do
    /// relatório são copiados para a parada na mesma transação.
    pub async fn create_log(
        &self,
        payload: &CreateDowntimeLogPayload,
        user: &User,
    ) -> Result<DowntimeLogDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let unit = self
            .fleet_repo
            .find_unit(&mut *tx, payload.unit_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("MHE unit {} does not exist.", payload.unit_id)))?;

        let source_items = match payload.source_report_id {
            Some(report_id) => {
                let report = self
                    .inspection_repo
                    .find_report(&mut *tx, report_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::BadRequest(format!("Inspection report {} does not exist.", report_id))
                    })?;
                if report.unit_id != unit.id {
                    return Err(AppError::BadRequest(format!(
                        "Inspection report {} belongs to a different unit.",
                        report_id
                    )));
                }
                self.inspection_repo.list_unsafe_items(&mut *tx, report_id).await?
            }
            None => Vec::new(),
        };

        let log = self
            .downtime_repo
            .create_log(
                &mut *tx,
                &unit,
                &payload.reason,
                payload.start_time,
                payload.end_time,
                payload.source_report_id,
                user.id,
            )
            .await?;

        let mut unsafe_items = Vec::with_capacity(source_items.len());
        for item in &source_items {
            unsafe_items.push(self.downtime_repo.insert_unsafe_item(&mut *tx, log.id, item).await?);
        }

        tx.commit().await?;

        tracing::info!(
            "🛑 Downtime opened for unit {} ({} unsafe items copied)",
            log.unit_code,
            unsafe_items.len()
        );

        Ok(DowntimeLogDetail { log, unsafe_items })
    }

    pub async fn update_log(
        &self,
        id: i64,
        payload: &UpdateDowntimeLogPayload,
    ) -> Result<DowntimeLogDetail, AppError> {
        self.downtime_repo
            .update_log(id, payload)
            .await?
            .ok_or_else(|| AppError::not_found("Downtime log", id))?;
        self.get_detail(id).await
    }

    pub async fn delete_log(&self, id: i64) -> Result<(), AppError> {
        if !self.downtime_repo.delete_log(id).await? {
            return Err(AppError::not_found("Downtime log", id));
        }
        Ok(())
    }
}

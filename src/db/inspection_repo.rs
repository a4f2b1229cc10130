// src/db/inspection_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::{
        fleet::MheUnit,
        inspection::{InspectionReport, InspectionReportItem, ReportFilter, ReportItemPayload, ReportStatus},
    },
};

#[derive(Clone)]
pub struct InspectionRepository {
    pool: SqlitePool,
}

impl InspectionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<InspectionReport>, AppError> {
        let reports = sqlx::query_as::<_, InspectionReport>(
            r#"
            SELECT * FROM inspection_reports
            WHERE (?1 IS NULL OR unit_id = ?1)
              AND (?2 IS NULL OR status = ?2)
              AND (?3 IS NULL OR inspection_date >= ?3)
              AND (?4 IS NULL OR inspection_date <= ?4)
            ORDER BY inspection_date DESC, id DESC
            "#,
        )
        .bind(filter.unit_id)
        .bind(filter.status)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }

    pub async fn find_report<'e, E>(&self, executor: E, id: i64) -> Result<Option<InspectionReport>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let report = sqlx::query_as::<_, InspectionReport>("SELECT * FROM inspection_reports WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(report)
    }

    pub async fn list_items<'e, E>(&self, executor: E, report_id: i64) -> Result<Vec<InspectionReportItem>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let items = sqlx::query_as::<_, InspectionReportItem>(
            "SELECT * FROM inspection_report_items WHERE report_id = ?1 ORDER BY id ASC",
        )
        .bind(report_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn list_unsafe_items<'e, E>(
        &self,
        executor: E,
        report_id: i64,
    ) -> Result<Vec<InspectionReportItem>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let items = sqlx::query_as::<_, InspectionReportItem>(
            "SELECT * FROM inspection_report_items WHERE report_id = ?1 AND is_safe = 0 ORDER BY id ASC",
        )
        .bind(report_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    // ---
    // Escrita (transacional, via Executor)
    // ---

    pub async fn create_report<'e, E>(
        &self,
        executor: E,
        unit: &MheUnit,
        inspection_date: NaiveDate,
        operator_username: &str,
        status: ReportStatus,
        user_id: i64,
        analysis_reason: Option<&str>,
    ) -> Result<InspectionReport, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let report = sqlx::query_as::<_, InspectionReport>(
            r#"
            INSERT INTO inspection_reports
                (unit_id, unit_code, inspection_date, operator_username, status, user_id, analysis_reason, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING *
            "#,
        )
        .bind(unit.id)
        .bind(&unit.unit_code)
        .bind(inspection_date)
        .bind(operator_username)
        .bind(status)
        .bind(user_id)
        .bind(analysis_reason)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, || "Inspection report already exists.".to_string()))?;
        Ok(report)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        report_id: i64,
        item: &ReportItemPayload,
        inspected_at: DateTime<Utc>,
    ) -> Result<InspectionReportItem, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, InspectionReportItem>(
            r#"
            INSERT INTO inspection_report_items
                (report_id, checklist_item_id, part_name, question, is_safe, photo, inspected_at, remarks)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING *
            "#,
        )
        .bind(report_id)
        .bind(item.checklist_item_id)
        .bind(&item.part_name)
        .bind(&item.question)
        .bind(item.is_safe)
        .bind(&item.photo)
        .bind(inspected_at)
        .bind(&item.remarks)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, || format!("Duplicate item in inspection report {report_id}.")))?;
        Ok(row)
    }

    pub async fn update_report_date<'e, E>(
        &self,
        executor: E,
        id: i64,
        inspection_date: NaiveDate,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("UPDATE inspection_reports SET inspection_date = ?2 WHERE id = ?1")
            .bind(id)
            .bind(inspection_date)
            .execute(executor)
            .await?;
        Ok(())
    }

    // Retorna false se o item não pertence ao relatório.
    pub async fn update_item_remarks<'e, E>(
        &self,
        executor: E,
        report_id: i64,
        item_id: i64,
        remarks: Option<&str>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE inspection_report_items SET remarks = ?3 WHERE id = ?2 AND report_id = ?1")
            .bind(report_id)
            .bind(item_id)
            .bind(remarks)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_report(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM inspection_reports WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

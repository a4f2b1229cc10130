// src/db/downtime_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    common::error::AppError,
    models::{
        downtime::{DowntimeFilter, DowntimeLog, DowntimeUnsafeItem, UpdateDowntimeLogPayload},
        fleet::MheUnit,
        inspection::InspectionReportItem,
    },
};

#[derive(Clone)]
pub struct DowntimeRepository {
    pool: SqlitePool,
}

impl DowntimeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_logs(&self, filter: &DowntimeFilter) -> Result<Vec<DowntimeLog>, AppError> {
        // open = true  -> só paradas em aberto
        // open = false -> só paradas encerradas
        let logs = sqlx::query_as::<_, DowntimeLog>(
            r#"
            SELECT * FROM downtime_logs
            WHERE (?1 IS NULL OR unit_id = ?1)
              AND (?2 IS NULL OR (?2 = 1 AND end_time IS NULL) OR (?2 = 0 AND end_time IS NOT NULL))
            ORDER BY start_time DESC, id DESC
            "#,
        )
        .bind(filter.unit_id)
        .bind(filter.open)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    pub async fn find_log<'e, E>(&self, executor: E, id: i64) -> Result<Option<DowntimeLog>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let log = sqlx::query_as::<_, DowntimeLog>("SELECT * FROM downtime_logs WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(log)
    }

    pub async fn list_unsafe_items<'e, E>(
        &self,
        executor: E,
        downtime_log_id: i64,
    ) -> Result<Vec<DowntimeUnsafeItem>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let items = sqlx::query_as::<_, DowntimeUnsafeItem>(
            "SELECT * FROM downtime_unsafe_items WHERE downtime_log_id = ?1 ORDER BY id ASC",
        )
        .bind(downtime_log_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn create_log<'e, E>(
        &self,
        executor: E,
        unit: &MheUnit,
        reason: &str,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        source_report_id: Option<i64>,
        user_id: i64,
    ) -> Result<DowntimeLog, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let log = sqlx::query_as::<_, DowntimeLog>(
            r#"
            INSERT INTO downtime_logs
                (unit_id, unit_code, reason, start_time, end_time, logged_at, source_report_id, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING *
            "#,
        )
        .bind(unit.id)
        .bind(&unit.unit_code)
        .bind(reason)
        .bind(start_time)
        .bind(end_time)
        .bind(Utc::now())
        .bind(source_report_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;
        Ok(log)
    }

    // Copia um item inseguro do relatório de origem
    pub async fn insert_unsafe_item<'e, E>(
        &self,
        executor: E,
        downtime_log_id: i64,
        item: &InspectionReportItem,
    ) -> Result<DowntimeUnsafeItem, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, DowntimeUnsafeItem>(
            r#"
            INSERT INTO downtime_unsafe_items (downtime_log_id, part_name, question, remarks)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING *
            "#,
        )
        .bind(downtime_log_id)
        .bind(&item.part_name)
        .bind(&item.question)
        .bind(&item.remarks)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn update_log(
        &self,
        id: i64,
        input: &UpdateDowntimeLogPayload,
    ) -> Result<Option<DowntimeLog>, AppError> {
        let log = sqlx::query_as::<_, DowntimeLog>(
            r#"
            UPDATE downtime_logs
            SET reason = ?2, start_time = ?3, end_time = ?4
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.reason)
        .bind(input.start_time)
        .bind(input.end_time)
        .fetch_optional(&self.pool)
        .await?;
        Ok(log)
    }

    pub async fn delete_log(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM downtime_logs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

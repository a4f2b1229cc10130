// src/db/pms_repo.rs

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::pms::{
        CreatePmsEntryPayload, PmsEntryFilter, PmsScheduleEntry, PmsStatus, PmsTaskMaster,
        PmsTaskMasterPayload, UpdatePmsEntryPayload,
    },
};

#[derive(Clone)]
pub struct PmsRepository {
    pool: SqlitePool,
}

impl PmsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  TASK MASTERS
    // =========================================================================

    pub async fn list_task_masters(&self) -> Result<Vec<PmsTaskMaster>, AppError> {
        let tasks = sqlx::query_as::<_, PmsTaskMaster>("SELECT * FROM pms_task_masters ORDER BY task_name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    pub async fn create_task_master(&self, input: &PmsTaskMasterPayload) -> Result<PmsTaskMaster, AppError> {
        sqlx::query_as::<_, PmsTaskMaster>(
            r#"
            INSERT INTO pms_task_masters (task_name, description, frequency_days, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING *
            "#,
        )
        .bind(&input.task_name)
        .bind(&input.description)
        .bind(input.frequency_days)
        .bind(input.is_active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, || format!("PMS task '{}' already exists.", input.task_name)))
    }

    pub async fn update_task_master(
        &self,
        id: i64,
        input: &PmsTaskMasterPayload,
    ) -> Result<Option<PmsTaskMaster>, AppError> {
        sqlx::query_as::<_, PmsTaskMaster>(
            r#"
            UPDATE pms_task_masters
            SET task_name = ?2, description = ?3, frequency_days = ?4, is_active = ?5
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.task_name)
        .bind(&input.description)
        .bind(input.frequency_days)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, || format!("PMS task '{}' already exists.", input.task_name)))
    }

    pub async fn delete_task_master(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM pms_task_masters WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  SCHEDULE ENTRIES
    // =========================================================================

    pub async fn list_entries(&self, filter: &PmsEntryFilter) -> Result<Vec<PmsScheduleEntry>, AppError> {
        let entries = sqlx::query_as::<_, PmsScheduleEntry>(
            r#"
            SELECT * FROM pms_schedule_entries
            WHERE (?1 IS NULL OR unit_id = ?1)
              AND (?2 IS NULL OR status = ?2)
            ORDER BY scheduled_date ASC, id ASC
            "#,
        )
        .bind(filter.unit_id)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn find_entry(&self, id: i64) -> Result<Option<PmsScheduleEntry>, AppError> {
        let entry = sqlx::query_as::<_, PmsScheduleEntry>("SELECT * FROM pms_schedule_entries WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    pub async fn create_entry(
        &self,
        input: &CreatePmsEntryPayload,
        status: PmsStatus,
        completed_at: Option<DateTime<Utc>>,
        created_by: i64,
    ) -> Result<PmsScheduleEntry, AppError> {
        sqlx::query_as::<_, PmsScheduleEntry>(
            r#"
            INSERT INTO pms_schedule_entries
                (task_master_id, unit_id, scheduled_date, completed_at, status, remarks, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING *
            "#,
        )
        .bind(input.task_master_id)
        .bind(input.unit_id)
        .bind(input.scheduled_date)
        .bind(completed_at)
        .bind(status)
        .bind(&input.remarks)
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, || "Duplicate PMS schedule entry.".to_string()))
    }

    pub async fn update_entry(
        &self,
        id: i64,
        input: &UpdatePmsEntryPayload,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<PmsScheduleEntry>, AppError> {
        let entry = sqlx::query_as::<_, PmsScheduleEntry>(
            r#"
            UPDATE pms_schedule_entries
            SET scheduled_date = ?2, status = ?3, remarks = ?4, completed_at = ?5
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.scheduled_date)
        .bind(input.status)
        .bind(&input.remarks)
        .bind(completed_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    pub async fn delete_entry(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM pms_schedule_entries WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// src/db/checklist_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    common::error::AppError,
    models::checklist::{ChecklistFilter, ChecklistItem, ChecklistItemPayload},
};

#[derive(Clone)]
pub struct ChecklistRepository {
    pool: SqlitePool,
}

impl ChecklistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // Ordem do checklist: sort_order, depois id
    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        filter: &ChecklistFilter,
    ) -> Result<Vec<ChecklistItem>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let items = sqlx::query_as::<_, ChecklistItem>(
            r#"
            SELECT * FROM checklist_items
            WHERE (?1 IS NULL OR is_active = ?1)
            ORDER BY sort_order ASC, id ASC
            "#,
        )
        .bind(filter.active)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn find_item(&self, id: i64) -> Result<Option<ChecklistItem>, AppError> {
        let item = sqlx::query_as::<_, ChecklistItem>("SELECT * FROM checklist_items WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    pub async fn create_item(&self, input: &ChecklistItemPayload) -> Result<ChecklistItem, AppError> {
        let item = sqlx::query_as::<_, ChecklistItem>(
            r#"
            INSERT INTO checklist_items (qr_payload, part_name, description, question, is_active, sort_order, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING *
            "#,
        )
        .bind(&input.qr_payload)
        .bind(&input.part_name)
        .bind(&input.description)
        .bind(&input.question)
        .bind(input.is_active)
        .bind(input.sort_order)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    // Não toca nos snapshots já gravados em inspection_report_items.
    pub async fn update_item(
        &self,
        id: i64,
        input: &ChecklistItemPayload,
    ) -> Result<Option<ChecklistItem>, AppError> {
        let item = sqlx::query_as::<_, ChecklistItem>(
            r#"
            UPDATE checklist_items
            SET qr_payload = ?2, part_name = ?3, description = ?4, question = ?5,
                is_active = ?6, sort_order = ?7
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.qr_payload)
        .bind(&input.part_name)
        .bind(&input.description)
        .bind(&input.question)
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    // Itens históricos dos relatórios ficam com checklist_item_id NULL.
    pub async fn delete_item(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM checklist_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

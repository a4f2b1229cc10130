// src/services/checklist_service.rs

use crate::{
    common::error::AppError,
    db::ChecklistRepository,
    models::checklist::{ChecklistFilter, ChecklistItem, ChecklistItemPayload},
};

#[derive(Clone)]
pub struct ChecklistService {
    checklist_repo: ChecklistRepository,
}

impl ChecklistService {
    pub fn new(checklist_repo: ChecklistRepository) -> Self {
        Self { checklist_repo }
    }

    pub async fn list_items(&self, filter: &ChecklistFilter) -> Result<Vec<ChecklistItem>, AppError> {
        self.checklist_repo
            .list_items(self.checklist_repo.pool(), filter)
            .await
    }

    pub async fn get_item(&self, id: i64) -> Result<ChecklistItem, AppError> {
        self.checklist_repo
            .find_item(id)
            .await?
            .ok_or_else(|| AppError::not_found("Checklist item", id))
    }

    pub async fn create_item(&self, payload: &ChecklistItemPayload) -> Result<ChecklistItem, AppError> {
        self.checklist_repo.create_item(payload).await
    }

    pub async fn update_item(&self, id: i64, payload: &ChecklistItemPayload) -> Result<ChecklistItem, AppError> {
        self.checklist_repo
            .update_item(id, payload)
            .await?
            .ok_or_else(|| AppError::not_found("Checklist item", id))
    }

    pub async fn delete_item(&self, id: i64) -> Result<(), AppError> {
        if !self.checklist_repo.delete_item(id).await? {
            return Err(AppError::not_found("Checklist item", id));
        }
        Ok(())
    }
}

// src/services/pms_service.rs

use chrono::{DateTime, Utc};

use crate::{
    common::error::AppError,
    db::PmsRepository,
    models::{
        auth::User,
        pms::{
            CreatePmsEntryPayload, PmsEntryFilter, PmsScheduleEntry, PmsStatus, PmsTaskMaster,
            PmsTaskMasterPayload, UpdatePmsEntryPayload,
        },
    },
};

// Concluído recebe carimbo; se já tinha, mantém o original.
fn completion_stamp(status: PmsStatus, previous: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match status {
        PmsStatus::Completed => previous.or_else(|| Some(Utc::now())),
        _ => None,
    }
}

#[derive(Clone)]
pub struct PmsService {
    pms_repo: PmsRepository,
}

impl PmsService {
    pub fn new(pms_repo: PmsRepository) -> Self {
        Self { pms_repo }
    }

    // --- TASK MASTERS ---

    pub async fn list_task_masters(&self) -> Result<Vec<PmsTaskMaster>, AppError> {
        self.pms_repo.list_task_masters().await
    }

    pub async fn create_task_master(&self, payload: &PmsTaskMasterPayload) -> Result<PmsTaskMaster, AppError> {
        self.pms_repo.create_task_master(payload).await
    }

    pub async fn update_task_master(
        &self,
        id: i64,
        payload: &PmsTaskMasterPayload,
    ) -> Result<PmsTaskMaster, AppError> {
        self.pms_repo
            .update_task_master(id, payload)
            .await?
            .ok_or_else(|| AppError::not_found("PMS task", id))
    }

    pub async fn delete_task_master(&self, id: i64) -> Result<(), AppError> {
        if !self.pms_repo.delete_task_master(id).await? {
            return Err(AppError::not_found("PMS task", id));
        }
        Ok(())
    }

    // --- SCHEDULE ENTRIES ---

    pub async fn list_entries(&self, filter: &PmsEntryFilter) -> Result<Vec<PmsScheduleEntry>, AppError> {
        self.pms_repo.list_entries(filter).await
    }

    pub async fn create_entry(
        &self,
        payload: &CreatePmsEntryPayload,
        user: &User,
    ) -> Result<PmsScheduleEntry, AppError> {
        let status = payload.status.unwrap_or(PmsStatus::Pending);
        self.pms_repo
            .create_entry(payload, status, completion_stamp(status, None), user.id)
            .await
    }

    pub async fn update_entry(
        &self,
        id: i64,
        payload: &UpdatePmsEntryPayload,
    ) -> Result<PmsScheduleEntry, AppError> {
        let current = self
            .pms_repo
            .find_entry(id)
            .await?
            .ok_or_else(|| AppError::not_found("PMS schedule entry", id))?;

        let completed_at = completion_stamp(payload.status, current.completed_at);
        self.pms_repo
            .update_entry(id, payload, completed_at)
            .await?
            .ok_or_else(|| AppError::not_found("PMS schedule entry", id))
    }

    pub async fn delete_entry(&self, id: i64) -> Result<(), AppError> {
        if !self.pms_repo.delete_entry(id).await? {
            return Err(AppError::not_found("PMS schedule entry", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn completing_stamps_once_and_reopening_clears() {
        assert!(completion_stamp(PmsStatus::Completed, None).is_some());

        let earlier = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(completion_stamp(PmsStatus::Completed, Some(earlier)), Some(earlier));

        assert_eq!(completion_stamp(PmsStatus::InProgress, Some(earlier)), None);
        assert_eq!(completion_stamp(PmsStatus::Pending, None), None);
    }
}

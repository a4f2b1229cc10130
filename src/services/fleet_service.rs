// src/services/fleet_service.rs

use crate::{
    common::error::AppError,
    db::FleetRepository,
    models::fleet::{Department, DepartmentPayload, MheUnit, MheUnitPayload, UnitFilter},
};

#[derive(Clone)]
pub struct FleetService {
    fleet_repo: FleetRepository,
}

impl FleetService {
    pub fn new(fleet_repo: FleetRepository) -> Self {
        Self { fleet_repo }
    }

    // --- DEPARTMENTS ---

    pub async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        self.fleet_repo.list_departments().await
    }

    pub async fn get_department(&self, id: i64) -> Result<Department, AppError> {
        self.fleet_repo
            .find_department(id)
            .await?
            .ok_or_else(|| AppError::not_found("Department", id))
    }

    pub async fn create_department(&self, payload: &DepartmentPayload) -> Result<Department, AppError> {
        let department = self.fleet_repo.create_department(payload).await?;
        tracing::info!("🏭 Department '{}' created (id {})", department.name, department.id);
        Ok(department)
    }

    pub async fn update_department(&self, id: i64, payload: &DepartmentPayload) -> Result<Department, AppError> {
        self.fleet_repo
            .update_department(id, payload)
            .await?
            .ok_or_else(|| AppError::not_found("Department", id))
    }

    pub async fn delete_department(&self, id: i64) -> Result<(), AppError> {
        if !self.fleet_repo.delete_department(id).await? {
            return Err(AppError::not_found("Department", id));
        }
        Ok(())
    }

    // --- MHE UNITS ---

    pub async fn list_units(&self, filter: &UnitFilter) -> Result<Vec<MheUnit>, AppError> {
        self.fleet_repo.list_units(filter).await
    }

    pub async fn get_unit(&self, id: i64) -> Result<MheUnit, AppError> {
        self.fleet_repo
            .find_unit(self.fleet_repo.pool(), id)
            .await?
            .ok_or_else(|| AppError::not_found("MHE unit", id))
    }

    pub async fn create_unit(&self, payload: &MheUnitPayload) -> Result<MheUnit, AppError> {
        let unit = self.fleet_repo.create_unit(payload).await?;
        tracing::info!("🚜 MHE unit '{}' registered (id {})", unit.unit_code, unit.id);
        Ok(unit)
    }

    pub async fn update_unit(&self, id: i64, payload: &MheUnitPayload) -> Result<MheUnit, AppError> {
        self.fleet_repo
            .update_unit(id, payload)
            .await?
            .ok_or_else(|| AppError::not_found("MHE unit", id))
    }

    pub async fn delete_unit(&self, id: i64) -> Result<(), AppError> {
        if !self.fleet_repo.delete_unit(id).await? {
            return Err(AppError::not_found("MHE unit", id));
        }
        tracing::info!("🗑️ MHE unit {} deleted with its reports and downtime logs", id);
        Ok(())
    }
}

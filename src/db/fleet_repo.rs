// src/db/fleet_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::fleet::{Department, DepartmentPayload, MheUnit, MheUnitPayload, UnitFilter, UnitStatus},
};

#[derive(Clone)]
pub struct FleetRepository {
    pool: SqlitePool,
}

impl FleetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    //  DEPARTMENTS
    // =========================================================================

    pub async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        let departments = sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(departments)
    }

    pub async fn find_department(&self, id: i64) -> Result<Option<Department>, AppError> {
        let department = sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(department)
    }

    pub async fn create_department(&self, input: &DepartmentPayload) -> Result<Department, AppError> {
        sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (name, description, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, || format!("Department '{}' already exists.", input.name)))
    }

    pub async fn update_department(
        &self,
        id: i64,
        input: &DepartmentPayload,
    ) -> Result<Option<Department>, AppError> {
        sqlx::query_as::<_, Department>(
            r#"
            UPDATE departments
            SET name = ?2, description = ?3
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, || format!("Department '{}' already exists.", input.name)))
    }

    // As unidades do departamento ficam com department_id NULL.
    pub async fn delete_department(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM departments WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  MHE UNITS
    // =========================================================================

    pub async fn list_units(&self, filter: &UnitFilter) -> Result<Vec<MheUnit>, AppError> {
        let units = sqlx::query_as::<_, MheUnit>(
            r#"
            SELECT * FROM mhe_units
            WHERE (?1 IS NULL OR department_id = ?1)
              AND (?2 IS NULL OR status = ?2)
            ORDER BY unit_code ASC
            "#,
        )
        .bind(filter.department_id)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;
        Ok(units)
    }

    pub async fn find_unit<'e, E>(&self, executor: E, id: i64) -> Result<Option<MheUnit>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let unit = sqlx::query_as::<_, MheUnit>("SELECT * FROM mhe_units WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(unit)
    }

    pub async fn create_unit(&self, input: &MheUnitPayload) -> Result<MheUnit, AppError> {
        sqlx::query_as::<_, MheUnit>(
            r#"
            INSERT INTO mhe_units (unit_code, name, department_id, unit_type, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(&input.unit_code)
        .bind(&input.name)
        .bind(input.department_id)
        .bind(&input.unit_type)
        .bind(input.status.unwrap_or(UnitStatus::Active))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, || format!("Unit code '{}' already exists.", input.unit_code)))
    }

    pub async fn update_unit(&self, id: i64, input: &MheUnitPayload) -> Result<Option<MheUnit>, AppError> {
        sqlx::query_as::<_, MheUnit>(
            r#"
            UPDATE mhe_units
            SET unit_code = ?2, name = ?3, department_id = ?4, unit_type = ?5, status = ?6
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.unit_code)
        .bind(&input.name)
        .bind(input.department_id)
        .bind(&input.unit_type)
        .bind(input.status.unwrap_or(UnitStatus::Active))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, || format!("Unit code '{}' already exists.", input.unit_code)))
    }

    // Relatórios, paradas e agendamentos PMS da unidade vão junto (CASCADE).
    pub async fn delete_unit(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM mhe_units WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

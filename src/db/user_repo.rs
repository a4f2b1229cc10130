// src/db/user_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::auth::{User, UserRole},
};

// Repositório de usuários: todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    // Cria um usuário; username duplicado vira 409.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        username: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, || format!("Username '{}' is already taken.", username)))
    }

    // Apaga o usuário; relatórios e paradas dele vão junto (CASCADE).
    pub async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

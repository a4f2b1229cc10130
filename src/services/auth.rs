// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, User, UserRole},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: SqlitePool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: SqlitePool) -> Self {
        Self {
            user_repo,
            jwt_secret,
            pool,
        }
    }

    /// Cria o usuário e devolve (token, usuário).
    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<(String, User), AppError> {
        // Hash em thread separada (bcrypt é caro)
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;

        let new_user = self
            .user_repo
            .create_user(&self.pool, username, &hashed_password, role)
            .await?;

        tracing::info!("👤 User '{}' created with role {}", new_user.username, new_user.role);

        let token = self.create_token(&new_user)?;
        Ok((token, new_user))
    }

    pub async fn login_user(&self, username: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Verificação também fora do executor
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Usuário apagado depois da emissão do token: token inválido
        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_users().await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        if !self.user_repo.delete_user(id).await? {
            return Err(AppError::not_found("User", id));
        }
        Ok(())
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

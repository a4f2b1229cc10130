// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    Operator,
    Supervisor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Operator => "operator",
            UserRole::Supervisor => "supervisor",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "jdoe")]
    pub username: String,

    #[serde(skip_serializing, default)] // nunca sai na resposta
    #[schema(ignore)]
    pub password_hash: String,

    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

// Dados para cadastro de um novo usuário
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SignupPayload {
    #[validate(length(min = 3, max = 50, message = "Username must have between 3 and 50 characters."))]
    #[schema(example = "jdoe")]
    pub username: String,

    #[validate(length(min = 6, message = "Password must have at least 6 characters."))]
    #[schema(example = "s3cret!")]
    pub password: String,

    // Padrão: operator
    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,       // ID do usuário
    pub role: UserRole,
    pub exp: usize,
    pub iat: usize,
}

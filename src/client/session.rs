// src/client/session.rs

use serde::{Deserialize, Serialize};

use crate::models::auth::{AuthResponse, User, UserRole};

/// Sessão autenticada explícita: token + usuário, passada a cada chamada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn is_supervisor(&self) -> bool {
        self.user.role == UserRole::Supervisor
    }
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
        }
    }
}

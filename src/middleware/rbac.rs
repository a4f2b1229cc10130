// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser, models::auth::UserRole};

/// Papel mínimo exigido por uma rota.
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> UserRole;
}

/// Guardião: rejeita com 403 quem não tem o papel `T`.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        let required = T::role();
        if user.0.role != required {
            return Err(AppError::Forbidden(format!(
                "This action requires the '{}' role.",
                required
            )));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// PAPÉIS
// ---

pub struct Supervisor;
impl RoleDef for Supervisor {
    fn role() -> UserRole {
        UserRole::Supervisor
    }
}

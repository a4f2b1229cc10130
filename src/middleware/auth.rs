// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, models::auth::User};

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Exige `Authorization: Bearer <jwt>` e anexa o usuário à requisição.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidToken)?;

    let user = app_state.auth_service.validate_token(token).await?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

// src/handlers/auth.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, Supervisor},
    },
    models::auth::{AuthResponse, LoginPayload, SignupPayload, User, UserRole},
};

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupPayload,
    responses(
        (status = 201, description = "User created and logged in", body = AuthResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn signup(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<SignupPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (token, user) = app_state
        .auth_service
        .register_user(&payload.username, &payload.password, payload.role.unwrap_or(UserRole::Operator))
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid username or password")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let (token, user) = app_state
        .auth_service
        .login_user(&payload.username, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token, user }))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses((status = 200, description = "Authenticated user", body = User)),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "All users", body = Vec<User>)),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(app_state.auth_service.list_users().await?))
}

// Cadastro feito por um supervisor: devolve só o usuário, sem token
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = SignupPayload,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 403, description = "Supervisor role required"),
        (status = 409, description = "Username already taken")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppJson(payload): AppJson<SignupPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (_, user) = app_state
        .auth_service
        .register_user(&payload.username, &payload.password, payload.role.unwrap_or(UserRole::Operator))
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted with their reports and downtime logs"),
        (status = 404, description = "User not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    _guard: RequireRole<Supervisor>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    app_state.auth_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

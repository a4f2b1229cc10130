// src/common/extract.rs

use axum::extract::{FromRequest, FromRequestParts};

use crate::common::error::AppError;

// ---
// Extratores da aplicação: rejeições do axum viram `AppError` (400 em JSON)
// ---

/// Corpo JSON. Campo ausente ou tipo errado responde `{ "message": ... }`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

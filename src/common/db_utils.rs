use crate::common::error::AppError;

// ---
// Helper: tradução de violações de constraint do SQLite
// ---
/// Converte erros de UNIQUE em `Conflict` (mensagem fornecida pelo chamador)
/// e erros de FOREIGN KEY em `BadRequest`. O resto segue como erro de banco.
pub(crate) fn map_constraint_error(e: sqlx::Error, conflict_message: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(conflict_message());
        }
        if db_err.is_foreign_key_violation() {
            return AppError::BadRequest("A referenced record does not exist.".to_string());
        }
        if db_err.is_check_violation() {
            return AppError::BadRequest(format!("Invalid value: {}", db_err.message()));
        }
    }
    e.into()
}

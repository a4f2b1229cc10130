pub mod user_repo;
pub use user_repo::UserRepository;
pub mod fleet_repo;
pub use fleet_repo::FleetRepository;
pub mod checklist_repo;
pub use checklist_repo::ChecklistRepository;
pub mod inspection_repo;
pub use inspection_repo::InspectionRepository;
pub mod downtime_repo;
pub use downtime_repo::DowntimeRepository;
pub mod pms_repo;
pub use pms_repo::PmsRepository;

use sqlx::SqlitePool;

/// Roda as migrações embutidas (pasta `migrations/`).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}

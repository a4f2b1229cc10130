// src/config.rs

use std::{path::PathBuf, str::FromStr, time::Duration};

use anyhow::{bail, Context};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::{
    db::{ChecklistRepository, DowntimeRepository, FleetRepository, InspectionRepository, PmsRepository, UserRepository},
    services::{
        auth::AuthService, checklist_service::ChecklistService, dashboard_service::DashboardService,
        document_service::DocumentService, downtime_service::DowntimeService, fleet_service::FleetService,
        inspection_service::InspectionService, pms_service::PmsService, safety_service::SafetyService,
    },
};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://mhe_inspection.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

/// De onde vem o veredito de segurança.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Política aplicada no próprio servidor.
    Local,
    /// Serviço de visão/IA compatível com chat completions.
    Remote {
        api_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub analysis_mode: AnalysisMode,
    pub fonts_dir: PathBuf,
}

impl Config {
    /// Lê `.env` + variáveis de ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Mesma lógica de `from_env`, com uma fonte de variáveis qualquer.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET must be set")?;

        let analysis_mode = match lookup("ANALYSIS_MODE").as_deref().unwrap_or("local") {
            "local" => AnalysisMode::Local,
            "remote" => {
                let timeout_secs = match lookup("AI_TIMEOUT_SECS") {
                    Some(raw) => u64::from_str(&raw)
                        .with_context(|| format!("AI_TIMEOUT_SECS must be a number of seconds, got '{raw}'"))?,
                    None => DEFAULT_AI_TIMEOUT_SECS,
                };
                AnalysisMode::Remote {
                    api_url: lookup("AI_API_URL").context("AI_API_URL must be set when ANALYSIS_MODE=remote")?,
                    api_key: lookup("AI_API_KEY").context("AI_API_KEY must be set when ANALYSIS_MODE=remote")?,
                    model: lookup("AI_MODEL").context("AI_MODEL must be set when ANALYSIS_MODE=remote")?,
                    timeout: Duration::from_secs(timeout_secs),
                }
            }
            other => bail!("ANALYSIS_MODE must be 'local' or 'remote', got '{other}'"),
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            analysis_mode,
            fonts_dir: lookup("FONTS_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./fonts")),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub auth_service: AuthService,
    pub fleet_service: FleetService,
    pub checklist_service: ChecklistService,
    pub inspection_service: InspectionService,
    pub downtime_service: DowntimeService,
    pub pms_service: PmsService,
    pub dashboard_service: DashboardService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Arquivo criado se não existir; FKs ligadas em toda conexão
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .with_context(|| format!("invalid DATABASE_URL '{}'", config.database_url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        tracing::info!("✅ Database connection established ({})", config.database_url);

        Ok(Self::from_pool(db_pool, config))
    }

    /// Monta o gráfico de dependências sobre um pool já aberto.
    pub fn from_pool(db_pool: SqlitePool, config: &Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let fleet_repo = FleetRepository::new(db_pool.clone());
        let checklist_repo = ChecklistRepository::new(db_pool.clone());
        let inspection_repo = InspectionRepository::new(db_pool.clone());
        let downtime_repo = DowntimeRepository::new(db_pool.clone());
        let pms_repo = PmsRepository::new(db_pool.clone());

        let safety_service = SafetyService::from_mode(&config.analysis_mode);
        match &config.analysis_mode {
            AnalysisMode::Local => tracing::info!("🛡️ Safety analysis mode: local"),
            AnalysisMode::Remote { api_url, model, .. } => {
                tracing::info!("🛡️ Safety analysis mode: remote ({} @ {})", model, api_url)
            }
        }

        Self {
            auth_service: AuthService::new(user_repo, config.jwt_secret.clone(), db_pool.clone()),
            fleet_service: FleetService::new(fleet_repo.clone()),
            checklist_service: ChecklistService::new(checklist_repo.clone()),
            inspection_service: InspectionService::new(
                db_pool.clone(),
                inspection_repo.clone(),
                fleet_repo.clone(),
                checklist_repo.clone(),
                safety_service,
            ),
            downtime_service: DowntimeService::new(
                db_pool.clone(),
                downtime_repo,
                fleet_repo.clone(),
                inspection_repo.clone(),
            ),
            pms_service: PmsService::new(pms_repo),
            dashboard_service: DashboardService::new(fleet_repo, inspection_repo.clone()),
            document_service: DocumentService::new(
                db_pool.clone(),
                inspection_repo,
                checklist_repo,
                config.fonts_dir.clone(),
            ),
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_secret_is_set() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.analysis_mode, AnalysisMode::Local);
        assert_eq!(config.fonts_dir, PathBuf::from("./fonts"));
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn remote_mode_requires_its_settings() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", "x"), ("ANALYSIS_MODE", "remote")]));
        assert!(err.is_err());

        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "x"),
            ("ANALYSIS_MODE", "remote"),
            ("AI_API_URL", "https://ai.example.com/v1/chat/completions"),
            ("AI_API_KEY", "key"),
            ("AI_MODEL", "vision-1"),
            ("AI_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        match config.analysis_mode {
            AnalysisMode::Remote { model, timeout, .. } => {
                assert_eq!(model, "vision-1");
                assert_eq!(timeout, Duration::from_secs(15));
            }
            AnalysisMode::Local => panic!("expected remote mode"),
        }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[("JWT_SECRET", "x"), ("ANALYSIS_MODE", "cloud")]));
        assert!(result.is_err());
    }
}

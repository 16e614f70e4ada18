// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::{dates::YearRange, db_utils::RetryPolicy},
    db::{
        CustomerRepository, DashboardRepository, FileRepository, NoteRepository, ReportRepository,
        SessionRepository, TenantRepository, UserRepository,
    },
    services::{
        auth::AuthService, customer_service::CustomerService, dashboard_service::DashboardService,
        export_service::ExportService, file_service::FileService, note_service::NoteService,
        report_service::ReportService, tenancy_service::TenantService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub app_addr: String,
    pub database_max_connections: u32,
    pub cookie_secure: bool,
    pub session_ttl_hours: i64,
    pub date_range: YearRange,
    pub retry: RetryPolicy,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("DATABASE_URL deve ser definida"))?;

        let production = lookup("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"));

        let session_ttl_hours: i64 = parse_or(&lookup, "SESSION_TTL_HOURS", 12)?;
        if session_ttl_hours <= 0 {
            return Err(anyhow!("SESSION_TTL_HOURS deve ser positivo"));
        }

        let date_range = YearRange {
            min_year: parse_or(&lookup, "DATE_MIN_YEAR", 1900)?,
            max_year: parse_or(&lookup, "DATE_MAX_YEAR", 2100)?,
        };
        if date_range.min_year > date_range.max_year {
            return Err(anyhow!("DATE_MIN_YEAR maior que DATE_MAX_YEAR"));
        }

        let retry = RetryPolicy {
            max_attempts: parse_or::<u32, _>(&lookup, "DB_RETRY_ATTEMPTS", 3)?.max(1),
            base_delay: Duration::from_millis(parse_or(&lookup, "DB_RETRY_BASE_MS", 500)?),
        };

        Ok(Self {
            database_url,
            app_addr: lookup("APP_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", production)?,
            session_ttl_hours,
            date_range,
            retry,
        })
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: String::new(),
            app_addr: "127.0.0.1:0".to_string(),
            database_max_connections: 5,
            cookie_secure: false,
            session_ttl_hours: 12,
            date_range: YearRange::default(),
            retry: RetryPolicy { max_attempts: 3, base_delay: Duration::from_millis(1) },
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Valor inválido para {key}: {raw:?}")),
        _ => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Arc<Settings>,
    pub auth_service: AuthService,
    pub tenant_service: TenantService,
    pub customer_service: CustomerService,
    pub report_service: ReportService,
    pub note_service: NoteService,
    pub file_service: FileService,
    pub dashboard_service: DashboardService,
    pub export_service: ExportService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, settings))
    }

    /// Monta o gráfico de dependências em cima de uma pool já aberta.
    pub fn from_pool(db_pool: PgPool, settings: Settings) -> Self {
        let retry = settings.retry;

        let user_repo = UserRepository::new(db_pool.clone());
        let session_repo = SessionRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());
        let note_repo = NoteRepository::new(db_pool.clone());
        let file_repo = FileRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            session_repo,
            tenant_repo.clone(),
            db_pool.clone(),
            settings.session_ttl(),
        );
        let tenant_service = TenantService::new(tenant_repo, user_repo, retry);
        let customer_service = CustomerService::new(
            customer_repo.clone(),
            report_repo.clone(),
            note_repo.clone(),
            file_repo.clone(),
            db_pool.clone(),
            retry,
        );
        let report_service = ReportService::new(report_repo, db_pool.clone(), retry);
        let note_service = NoteService::new(note_repo, customer_repo.clone(), db_pool.clone(), retry);
        let file_service = FileService::new(file_repo, customer_repo.clone(), db_pool.clone(), retry);
        let dashboard_service = DashboardService::new(dashboard_repo, retry);
        let export_service = ExportService::new(customer_repo, retry);

        Self {
            db_pool,
            settings: Arc::new(settings),
            auth_service,
            tenant_service,
            customer_service,
            report_service,
            note_service,
            file_service,
            dashboard_service,
            export_service,
        }
    }
}

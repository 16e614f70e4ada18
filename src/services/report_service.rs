// src/services/report_service.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        dates::is_within_days,
        db_utils::{with_read_retry, RetryPolicy},
        error::AppError,
    },
    db::ReportRepository,
    models::report::{Report, ReportNote, ReportStatus},
};

/// Notas só podem ser lançadas quando o relatório vence em até 15 dias (ou já venceu).
pub const NOTE_WINDOW_DAYS: u64 = 15;

pub fn note_window_open(due_date: NaiveDate, today: NaiveDate) -> bool {
    due_date <= today || is_within_days(due_date, today, NOTE_WINDOW_DAYS)
}

#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    pool: PgPool,
    retry: RetryPolicy,
}

impl ReportService {
    pub fn new(report_repo: ReportRepository, pool: PgPool, retry: RetryPolicy) -> Self {
        Self { report_repo, pool, retry }
    }

    pub async fn get_report(&self, company_id: Uuid, report_id: Uuid) -> Result<Report, AppError> {
        with_read_retry(&self.retry, || self.report_repo.find_report(company_id, report_id))
            .await?
            .ok_or(AppError::NotFound)
    }

    /// O status chega como texto; qualquer coisa fora dos três valores é `InvalidStatus`.
    pub async fn update_report_status(
        &self,
        company_id: Uuid,
        report_id: Uuid,
        status: &str,
        note: Option<&str>,
    ) -> Result<Report, AppError> {
        let status: ReportStatus = status.parse()?;
        let note = note.map(str::trim).filter(|n| !n.is_empty());

        let report = self
            .report_repo
            .update_status(&self.pool, company_id, report_id, status, note)
            .await?
            .ok_or(AppError::NotFound)?;

        tracing::info!("📋 Relatório {} agora está {}", report.id, report.status);
        Ok(report)
    }

    /// Clicar no status que já está ativo devolve o relatório para `pending`.
    pub async fn toggle_report_status(
        &self,
        company_id: Uuid,
        report_id: Uuid,
        clicked: &str,
    ) -> Result<Report, AppError> {
        let clicked: ReportStatus = clicked.parse()?;

        let mut tx = self.pool.begin().await?;
        let current = self
            .report_repo
            .lock_report(&mut *tx, company_id, report_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let next = current.status.toggled(clicked);
        let report = self
            .report_repo
            .update_status(&mut *tx, company_id, report_id, next, None)
            .await?
            .ok_or(AppError::NotFound)?;
        tx.commit().await?;

        Ok(report)
    }

    // =========================================================================
    //  HISTÓRICO DE NOTAS
    // =========================================================================

    pub async fn add_report_note(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        report_id: Uuid,
        content: &str,
        today: NaiveDate,
    ) -> Result<ReportNote, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::field("content", "required"));
        }

        let report = self.get_report(company_id, report_id).await?;
        if !note_window_open(report.due_date, today) {
            return Err(AppError::NoteWindowClosed);
        }

        let note = self
            .report_repo
            .create_note(&self.pool, report.id, user_id, content)
            .await?;
        Ok(note)
    }

    pub async fn list_report_notes(
        &self,
        company_id: Uuid,
        report_id: Uuid,
    ) -> Result<Vec<ReportNote>, AppError> {
        // Garante 404 para relatório de outra empresa em vez de lista vazia
        self.get_report(company_id, report_id).await?;
        with_read_retry(&self.retry, || self.report_repo.list_notes(company_id, report_id)).await
    }

    pub async fn delete_report_note(&self, company_id: Uuid, note_id: Uuid) -> Result<(), AppError> {
        let deleted = self
            .report_repo
            .delete_note(&self.pool, company_id, note_id)
            .await?;
        if deleted == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn window_is_open_up_to_fifteen_days_ahead() {
        let today = date("2025-06-01");
        assert!(note_window_open(date("2025-06-01"), today));
        assert!(note_window_open(date("2025-06-16"), today));
        assert!(!note_window_open(date("2025-06-17"), today));
    }

    #[test]
    fn overdue_reports_accept_notes() {
        let today = date("2025-06-01");
        assert!(note_window_open(date("2025-05-01"), today));
        assert!(note_window_open(date("2024-01-01"), today));
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::{
        config::{AppState, Settings},
        models::customer::{CustomerInput, ReportPlan},
    };

    async fn report_due(state: &AppState, due: NaiveDate) -> (Uuid, Uuid, Uuid) {
        let issued = state
            .auth_service
            .register("Vistos A", "a@vistos.com", "segredo123")
            .await
            .unwrap();
        let company_id = issued.user.company_id;
        let input = CustomerInput {
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            ..Default::default()
        };
        let plan = ReportPlan::Required { next_report_date: due, status: None };
        let customer = state
            .customer_service
            .add_customer(company_id, &input, &plan)
            .await
            .unwrap();
        (company_id, issued.user.user_id, customer.active_report_id.unwrap())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn toggling_the_same_status_twice_returns_to_pending(pool: PgPool) {
        let state = AppState::from_pool(pool, Settings::for_tests());
        let (company_id, _, report_id) =
            report_due(&state, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()).await;

        let first = state
            .report_service
            .toggle_report_status(company_id, report_id, "needs_attention")
            .await
            .unwrap();
        assert_eq!(first.status, ReportStatus::NeedsAttention);
        assert!(first.status_updated_at.is_some());

        let second = state
            .report_service
            .toggle_report_status(company_id, report_id, "needs_attention")
            .await
            .unwrap();
        assert_eq!(second.status, ReportStatus::Pending);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn invalid_status_leaves_report_untouched(pool: PgPool) {
        let state = AppState::from_pool(pool, Settings::for_tests());
        let (company_id, _, report_id) =
            report_due(&state, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()).await;

        let result = state
            .report_service
            .update_report_status(company_id, report_id, "archived", None)
            .await;
        assert!(matches!(result, Err(AppError::InvalidStatus(_))));

        let report = state.report_service.get_report(company_id, report_id).await.unwrap();
        assert_eq!(report.status, ReportStatus::Pending);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn notes_outside_the_window_are_rejected(pool: PgPool) {
        let state = AppState::from_pool(pool, Settings::for_tests());
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let due = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let (company_id, user_id, report_id) = report_due(&state, due).await;

        let closed = state
            .report_service
            .add_report_note(company_id, user_id, report_id, "Ligou", today)
            .await;
        assert!(matches!(closed, Err(AppError::NoteWindowClosed)));

        let later = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let note = state
            .report_service
            .add_report_note(company_id, user_id, report_id, "Ligou", later)
            .await
            .unwrap();
        assert_eq!(note.author_email.as_deref(), Some("a@vistos.com"));

        let notes = state.report_service.list_report_notes(company_id, report_id).await.unwrap();
        assert_eq!(notes.len(), 1);
    }
}

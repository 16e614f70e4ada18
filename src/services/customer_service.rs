// src/services/customer_service.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{with_read_retry, RetryPolicy},
        error::AppError,
    },
    db::{CustomerRepository, FileRepository, NoteRepository, ReportRepository},
    models::{
        customer::{Customer, CustomerDetail, CustomerInput, ReportPlan},
        report::{ReportStatus, DEFAULT_REPORT_TITLE},
    },
};

/// O que acontece com o relatório ativo depois de editar o cliente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportAction {
    Keep,
    Delete(Uuid),
    Reschedule {
        report_id: Uuid,
        due_date: NaiveDate,
        status: Option<ReportStatus>,
    },
    Create {
        due_date: NaiveDate,
        status: Option<ReportStatus>,
    },
}

/// Decide a reconciliação mantendo no máximo um relatório ativo por cliente.
pub fn reconcile_report(plan: &ReportPlan, active_report_id: Option<Uuid>) -> ReportAction {
    match (plan, active_report_id) {
        (ReportPlan::NotRequired, None) => ReportAction::Keep,
        (ReportPlan::NotRequired, Some(report_id)) => ReportAction::Delete(report_id),
        (ReportPlan::Required { next_report_date, status }, Some(report_id)) => {
            ReportAction::Reschedule {
                report_id,
                due_date: *next_report_date,
                status: *status,
            }
        }
        (ReportPlan::Required { next_report_date, status }, None) => ReportAction::Create {
            due_date: *next_report_date,
            status: *status,
        },
    }
}

#[derive(Clone)]
pub struct CustomerService {
    customer_repo: CustomerRepository,
    report_repo: ReportRepository,
    note_repo: NoteRepository,
    file_repo: FileRepository,
    pool: PgPool, // Usamos a pool para iniciar transações
    retry: RetryPolicy,
}

impl CustomerService {
    pub fn new(
        customer_repo: CustomerRepository,
        report_repo: ReportRepository,
        note_repo: NoteRepository,
        file_repo: FileRepository,
        pool: PgPool,
        retry: RetryPolicy,
    ) -> Self {
        Self { customer_repo, report_repo, note_repo, file_repo, pool, retry }
    }

    // =========================================================================
    //  LEITURAS
    // =========================================================================

    pub async fn list_customers(&self, company_id: Uuid) -> Result<Vec<Customer>, AppError> {
        with_read_retry(&self.retry, || self.customer_repo.list_customers(company_id)).await
    }

    /// Cliente de outra empresa é indistinguível de cliente inexistente.
    pub async fn get_customer(&self, company_id: Uuid, customer_id: Uuid) -> Result<Customer, AppError> {
        with_read_retry(&self.retry, || self.customer_repo.find_customer(company_id, customer_id))
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_customer_detail(
        &self,
        company_id: Uuid,
        customer_id: Uuid,
    ) -> Result<CustomerDetail, AppError> {
        let customer = self.get_customer(company_id, customer_id).await?;

        let (active_report, report_notes) = match customer.active_report_id {
            Some(report_id) => {
                let report = with_read_retry(&self.retry, || {
                    self.report_repo.find_report(company_id, report_id)
                })
                .await?;
                let notes = with_read_retry(&self.retry, || {
                    self.report_repo.list_notes(company_id, report_id)
                })
                .await?;
                (report, notes)
            }
            None => (None, Vec::new()),
        };

        let notes =
            with_read_retry(&self.retry, || self.note_repo.list_notes(company_id, customer_id)).await?;
        let files =
            with_read_retry(&self.retry, || self.file_repo.list_files(company_id, customer_id)).await?;

        Ok(CustomerDetail { customer, active_report, report_notes, notes, files })
    }

    // =========================================================================
    //  CICLO DE VIDA
    // =========================================================================

    /// Cria o cliente e, se exigido, o relatório inicial `pending`, na mesma transação.
    pub async fn add_customer(
        &self,
        company_id: Uuid,
        input: &CustomerInput,
        plan: &ReportPlan,
    ) -> Result<Customer, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut customer = self
            .customer_repo
            .create_customer(&mut *tx, company_id, input)
            .await?;

        if let ReportPlan::Required { next_report_date, status } = plan {
            let report = self
                .report_repo
                .create_report(&mut *tx, customer.id, DEFAULT_REPORT_TITLE, *next_report_date)
                .await?;
            if let Some(status) = (*status).filter(|s| *s != ReportStatus::Pending) {
                self.report_repo
                    .reschedule_report(&mut *tx, report.id, *next_report_date, Some(status))
                    .await?;
            }
            self.customer_repo
                .set_active_report(&mut *tx, company_id, customer.id, Some(report.id))
                .await?;
            customer.active_report_id = Some(report.id);
        }

        tx.commit().await?;

        tracing::info!("🧾 Cliente {} criado na empresa {}", customer.id, company_id);
        Ok(customer)
    }

    /// Atualiza o cliente e reconcilia o relatório ativo (criar, remarcar ou apagar).
    pub async fn update_customer(
        &self,
        company_id: Uuid,
        customer_id: Uuid,
        input: &CustomerInput,
        plan: &ReportPlan,
        report_id: Option<Uuid>,
    ) -> Result<Customer, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .customer_repo
            .lock_customer(&mut *tx, company_id, customer_id)
            .await?
            .ok_or(AppError::NotFound)?;

        // O formulário pode mandar o id do relatório; tem que ser o ativo deste cliente.
        if let Some(requested) = report_id {
            if current.active_report_id != Some(requested) {
                return Err(AppError::NotFound);
            }
        }

        let mut customer = self
            .customer_repo
            .update_customer(&mut *tx, company_id, customer_id, input)
            .await?
            .ok_or(AppError::NotFound)?;

        match reconcile_report(plan, current.active_report_id) {
            ReportAction::Keep => {}
            ReportAction::Delete(active_id) => {
                // Limpa o ponteiro antes, por causa da FK
                self.customer_repo
                    .set_active_report(&mut *tx, company_id, customer_id, None)
                    .await?;
                self.report_repo.delete_notes_for_report(&mut *tx, active_id).await?;
                self.report_repo.delete_report(&mut *tx, active_id).await?;
                customer.active_report_id = None;
                tracing::info!("Relatório {} removido do cliente {}", active_id, customer_id);
            }
            ReportAction::Reschedule { report_id, due_date, status } => {
                self.report_repo
                    .reschedule_report(&mut *tx, report_id, due_date, status)
                    .await?;
            }
            ReportAction::Create { due_date, status } => {
                let report = self
                    .report_repo
                    .create_report(&mut *tx, customer_id, DEFAULT_REPORT_TITLE, due_date)
                    .await?;
                if let Some(status) = status.filter(|s| *s != ReportStatus::Pending) {
                    self.report_repo
                        .reschedule_report(&mut *tx, report.id, due_date, Some(status))
                        .await?;
                }
                self.customer_repo
                    .set_active_report(&mut *tx, company_id, customer_id, Some(report.id))
                    .await?;
                customer.active_report_id = Some(report.id);
            }
        }

        tx.commit().await?;

        Ok(customer)
    }

    /// Apaga, nesta ordem: notas dos relatórios, relatórios, notas, arquivos e o cliente.
    pub async fn delete_customer(&self, company_id: Uuid, customer_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.customer_repo
            .lock_customer(&mut *tx, company_id, customer_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.customer_repo
            .set_active_report(&mut *tx, company_id, customer_id, None)
            .await?;
        self.report_repo.delete_notes_for_customer(&mut *tx, customer_id).await?;
        let reports = self.report_repo.delete_reports_for_customer(&mut *tx, customer_id).await?;
        let notes = self
            .note_repo
            .delete_notes_for_customer(&mut *tx, company_id, customer_id)
            .await?;
        let files = self
            .file_repo
            .delete_files_for_customer(&mut *tx, company_id, customer_id)
            .await?;
        self.customer_repo
            .delete_customer(&mut *tx, company_id, customer_id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "🗑️ Cliente {} apagado ({} relatórios, {} notas, {} arquivos)",
            customer_id,
            reports,
            notes,
            files
        );
        Ok(())
    }
}


// Cenários contra um Postgres real: `DATABASE_URL=... cargo test -- --ignored`
#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::{
        config::{AppState, Settings},
        models::auth::UserRole,
    };

    async fn company(state: &AppState, name: &str, email: &str) -> Uuid {
        let issued = state.auth_service.register(name, email, "segredo123").await.unwrap();
        assert_eq!(issued.user.role, UserRole::Admin);
        issued.user.company_id
    }

    fn input(first: &str, last: &str) -> CustomerInput {
        CustomerInput {
            first_name: first.to_string(),
            last_name: last.to_string(),
            date_of_birth: Some(date("1990-05-01")),
            ..Default::default()
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn add_then_drop_report_requirement(pool: PgPool) {
        let state = AppState::from_pool(pool, Settings::for_tests());
        let company_id = company(&state, "Vistos A", "a@vistos.com").await;

        let plan = ReportPlan::Required { next_report_date: date("2025-06-01"), status: None };
        let customer = state
            .customer_service
            .add_customer(company_id, &input("Ana", "Silva"), &plan)
            .await
            .unwrap();

        let detail = state
            .customer_service
            .get_customer_detail(company_id, customer.id)
            .await
            .unwrap();
        let report = detail.active_report.expect("relatório criado");
        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.due_date, date("2025-06-01"));
        assert_eq!(report.title, DEFAULT_REPORT_TITLE);

        let updated = state
            .customer_service
            .update_customer(company_id, customer.id, &input("Ana", "Silva"), &ReportPlan::NotRequired, Some(report.id))
            .await
            .unwrap();
        assert_eq!(updated.active_report_id, None);

        let gone = state.report_service.get_report(company_id, report.id).await;
        assert!(matches!(gone, Err(AppError::NotFound)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn customers_of_another_company_are_not_found(pool: PgPool) {
        let state = AppState::from_pool(pool, Settings::for_tests());
        let company_a = company(&state, "Vistos A", "a@vistos.com").await;
        let company_b = company(&state, "Vistos B", "b@vistos.com").await;

        let customer_b = state
            .customer_service
            .add_customer(company_b, &input("Bruno", "Costa"), &ReportPlan::NotRequired)
            .await
            .unwrap();

        let fetched = state.customer_service.get_customer(company_a, customer_b.id).await;
        assert!(matches!(fetched, Err(AppError::NotFound)));

        let deleted = state.customer_service.delete_customer(company_a, customer_b.id).await;
        assert!(matches!(deleted, Err(AppError::NotFound)));

        // Nada foi apagado do lado da empresa B
        assert!(state.customer_service.get_customer(company_b, customer_b.id).await.is_ok());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn delete_customer_removes_dependents(pool: PgPool) {
        let state = AppState::from_pool(pool, Settings::for_tests());
        let company_id = company(&state, "Vistos A", "a@vistos.com").await;
        let plan = ReportPlan::Required { next_report_date: date("2025-06-01"), status: None };
        let customer = state
            .customer_service
            .add_customer(company_id, &input("Ana", "Silva"), &plan)
            .await
            .unwrap();

        state.customer_service.delete_customer(company_id, customer.id).await.unwrap();

        assert!(matches!(
            state.customer_service.get_customer(company_id, customer.id).await,
            Err(AppError::NotFound)
        ));
        assert!(state.customer_service.list_customers(company_id).await.unwrap().is_empty());
    }
}

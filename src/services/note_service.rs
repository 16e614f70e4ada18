// src/services/note_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{with_read_retry, RetryPolicy},
        error::AppError,
    },
    db::{CustomerRepository, NoteRepository},
    models::customer::CustomerNote,
};

/// Anotações livres na ficha do cliente (independentes do relatório).
#[derive(Clone)]
pub struct NoteService {
    note_repo: NoteRepository,
    customer_repo: CustomerRepository,
    pool: PgPool,
    retry: RetryPolicy,
}

impl NoteService {
    pub fn new(
        note_repo: NoteRepository,
        customer_repo: CustomerRepository,
        pool: PgPool,
        retry: RetryPolicy,
    ) -> Self {
        Self { note_repo, customer_repo, pool, retry }
    }

    pub async fn add_note(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        customer_id: Uuid,
        content: &str,
    ) -> Result<CustomerNote, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::field("content", "required"));
        }

        let mut tx = self.pool.begin().await?;
        // Bloqueia o cliente para a nota não ficar órfã de um delete concorrente
        self.customer_repo
            .lock_customer(&mut *tx, company_id, customer_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let note = self
            .note_repo
            .create_note(&mut *tx, company_id, customer_id, user_id, content)
            .await?;
        tx.commit().await?;

        Ok(note)
    }

    pub async fn list_notes(
        &self,
        company_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Vec<CustomerNote>, AppError> {
        with_read_retry(&self.retry, || self.customer_repo.find_customer(company_id, customer_id))
            .await?
            .ok_or(AppError::NotFound)?;
        with_read_retry(&self.retry, || self.note_repo.list_notes(company_id, customer_id)).await
    }

    pub async fn delete_note(&self, company_id: Uuid, note_id: Uuid) -> Result<(), AppError> {
        let deleted = self.note_repo.delete_note(&self.pool, company_id, note_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::{
        config::{AppState, Settings},
        models::customer::{CustomerInput, ReportPlan},
    };

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer Postgres em DATABASE_URL"]
    async fn notes_are_scoped_to_the_company(pool: PgPool) {
        let state = AppState::from_pool(pool, Settings::for_tests());
        let a = state.auth_service.register("A", "a@vistos.com", "segredo123").await.unwrap();
        let b = state.auth_service.register("B", "b@vistos.com", "segredo123").await.unwrap();

        let input = CustomerInput {
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            ..Default::default()
        };
        let customer = state
            .customer_service
            .add_customer(a.user.company_id, &input, &ReportPlan::NotRequired)
            .await
            .unwrap();

        let note = state
            .note_service
            .add_note(a.user.company_id, a.user.user_id, customer.id, "  Primeira conversa ")
            .await
            .unwrap();
        assert_eq!(note.content, "Primeira conversa");

        let foreign = state
            .note_service
            .add_note(b.user.company_id, b.user.user_id, customer.id, "invasão")
            .await;
        assert!(matches!(foreign, Err(AppError::NotFound)));

        let foreign_delete = state.note_service.delete_note(b.user.company_id, note.id).await;
        assert!(matches!(foreign_delete, Err(AppError::NotFound)));

        state.note_service.delete_note(a.user.company_id, note.id).await.unwrap();
        let left = state.note_service.list_notes(a.user.company_id, customer.id).await.unwrap();
        assert!(left.is_empty());
    }
}

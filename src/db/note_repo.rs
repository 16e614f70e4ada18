// src/db/note_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::customer::CustomerNote};

// Notas livres do cliente (company_id desnormalizado para o filtro de isolamento)
#[derive(Clone)]
pub struct NoteRepository {
    pool: PgPool,
}

impl NoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_note<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        customer_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CustomerNote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let note = sqlx::query_as::<_, CustomerNote>(
            r#"
            WITH inserted AS (
                INSERT INTO customer_notes (customer_id, company_id, user_id, content)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT i.id, i.customer_id, i.company_id, i.user_id,
                   u.email AS author_email, i.content, i.created_at
            FROM inserted i
            LEFT JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(customer_id)
        .bind(company_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(executor)
        .await?;

        Ok(note)
    }

    /// Notas do cliente, mais recentes primeiro.
    pub async fn list_notes(
        &self,
        company_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Vec<CustomerNote>, AppError> {
        let notes = sqlx::query_as::<_, CustomerNote>(
            r#"
            SELECT n.id, n.customer_id, n.company_id, n.user_id,
                   u.email AS author_email, n.content, n.created_at
            FROM customer_notes n
            LEFT JOIN users u ON u.id = n.user_id
            WHERE n.customer_id = $1 AND n.company_id = $2
            ORDER BY n.created_at DESC
            "#,
        )
        .bind(customer_id)
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    pub async fn delete_note<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        note_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customer_notes WHERE id = $1 AND company_id = $2")
            .bind(note_id)
            .bind(company_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_notes_for_customer<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        customer_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result =
            sqlx::query("DELETE FROM customer_notes WHERE customer_id = $1 AND company_id = $2")
                .bind(customer_id)
                .bind(company_id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }
}

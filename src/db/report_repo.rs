// src/db/report_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::report::{Report, ReportNote, ReportStatus},
};

// Relatórios só são alcançáveis via cliente da mesma empresa (report -> customer -> company)
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  RELATÓRIOS
    // =========================================================================

    pub async fn find_report(
        &self,
        company_id: Uuid,
        report_id: Uuid,
    ) -> Result<Option<Report>, AppError> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            SELECT r.*
            FROM reports r
            INNER JOIN customers c ON c.id = r.customer_id
            WHERE r.id = $1 AND c.company_id = $2
            "#,
        )
        .bind(report_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(report)
    }

    /// Mesmo filtro de `find_report`, com `FOR UPDATE` para leitura-e-escrita.
    pub async fn lock_report<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        report_id: Uuid,
    ) -> Result<Option<Report>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report = sqlx::query_as::<_, Report>(
            r#"
            SELECT r.*
            FROM reports r
            INNER JOIN customers c ON c.id = r.customer_id
            WHERE r.id = $1 AND c.company_id = $2
            FOR UPDATE OF r
            "#,
        )
        .bind(report_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;

        Ok(report)
    }

    /// Cria um relatório `pending` para o cliente.
    pub async fn create_report<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        title: &str,
        due_date: NaiveDate,
    ) -> Result<Report, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (customer_id, title, due_date, status, status_updated_at)
            VALUES ($1, $2, $3, 'pending', NOW())
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(title)
        .bind(due_date)
        .fetch_one(executor)
        .await?;

        Ok(report)
    }

    /// Remarca o vencimento; o status só muda (e é carimbado) se vier informado.
    pub async fn reschedule_report<'e, E>(
        &self,
        executor: E,
        report_id: Uuid,
        due_date: NaiveDate,
        status: Option<ReportStatus>,
    ) -> Result<Report, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports SET
                due_date = $2,
                status = COALESCE($3::report_status, status),
                status_updated_at = CASE
                    WHEN $3::report_status IS NULL THEN status_updated_at
                    ELSE NOW()
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(report_id)
        .bind(due_date)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(report)
    }

    /// Troca o status (e a nota legada, se vier). `None` fora da empresa.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        report_id: Uuid,
        status: ReportStatus,
        note: Option<&str>,
    ) -> Result<Option<Report>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports r SET
                status = $3,
                note = COALESCE($4, r.note),
                status_updated_at = NOW(),
                updated_at = NOW()
            FROM customers c
            WHERE r.id = $1
              AND c.id = r.customer_id
              AND c.company_id = $2
            RETURNING r.*
            "#,
        )
        .bind(report_id)
        .bind(company_id)
        .bind(status)
        .bind(note)
        .fetch_optional(executor)
        .await?;

        Ok(report)
    }

    pub async fn delete_report<'e, E>(&self, executor: E, report_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(report_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_reports_for_customer<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM reports WHERE customer_id = $1")
            .bind(customer_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  HISTÓRICO DE NOTAS
    // =========================================================================

    pub async fn create_note<'e, E>(
        &self,
        executor: E,
        report_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<ReportNote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let note = sqlx::query_as::<_, ReportNote>(
            r#"
            WITH inserted AS (
                INSERT INTO report_notes (report_id, user_id, content)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT i.id, i.report_id, i.content, i.user_id, u.email AS author_email, i.created_at
            FROM inserted i
            LEFT JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(report_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(executor)
        .await?;

        Ok(note)
    }

    /// Notas do relatório, mais recentes primeiro.
    pub async fn list_notes(
        &self,
        company_id: Uuid,
        report_id: Uuid,
    ) -> Result<Vec<ReportNote>, AppError> {
        let notes = sqlx::query_as::<_, ReportNote>(
            r#"
            SELECT n.id, n.report_id, n.content, n.user_id, u.email AS author_email, n.created_at
            FROM report_notes n
            INNER JOIN reports r ON r.id = n.report_id
            INNER JOIN customers c ON c.id = r.customer_id
            LEFT JOIN users u ON u.id = n.user_id
            WHERE n.report_id = $1 AND c.company_id = $2
            ORDER BY n.created_at DESC
            "#,
        )
        .bind(report_id)
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
        let result = sqlx::query(
            r#"
            DELETE FROM report_notes n
            USING reports r, customers c
            WHERE n.id = $1
              AND r.id = n.report_id
              AND c.id = r.customer_id
              AND c.company_id = $2
            "#,
        )
        .bind(note_id)
        .bind(company_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_notes_for_report<'e, E>(
        &self,
        executor: E,
        report_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM report_notes WHERE report_id = $1")
            .bind(report_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_notes_for_customer<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM report_notes n
            USING reports r
            WHERE r.id = n.report_id AND r.customer_id = $1
            "#,
        )
        .bind(customer_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}

// src/db/dashboard_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::dashboard::DashboardEntry};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Todos os clientes da empresa, cada um com o relatório ativo
    /// e a nota mais recente desse relatório.
    pub async fn list_entries(&self, company_id: Uuid) -> Result<Vec<DashboardEntry>, AppError> {
        let entries = sqlx::query_as::<_, DashboardEntry>(
            r#"
            SELECT
                c.id, c.first_name, c.last_name, c.email, c.phone,
                c.date_of_birth, c.nationality, c.visa_type,
                c.expiry_date, c.passport_expiry_date,
                r.id AS report_id,
                r.title AS report_title,
                r.due_date AS report_due_date,
                r.status AS report_status,
                r.note AS report_note,
                n.content AS latest_note,
                n.created_at AS latest_note_at
            FROM customers c
            LEFT JOIN reports r
                ON r.id = c.active_report_id AND r.customer_id = c.id
            LEFT JOIN LATERAL (
                SELECT rn.content, rn.created_at
                FROM report_notes rn
                WHERE rn.report_id = r.id
                ORDER BY rn.created_at DESC
                LIMIT 1
            ) n ON TRUE
            WHERE c.company_id = $1
            ORDER BY c.last_name ASC, c.first_name ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

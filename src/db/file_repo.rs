// src/db/file_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::customer::CustomerFile};

#[derive(Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_file<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        customer_id: Uuid,
        filename: &str,
        file_type: Option<&str>,
        file_path: &str,
    ) -> Result<CustomerFile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let file = sqlx::query_as::<_, CustomerFile>(
            r#"
            INSERT INTO customer_files (customer_id, company_id, filename, file_type, file_path)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(company_id)
        .bind(filename)
        .bind(file_type)
        .bind(file_path)
        .fetch_one(executor)
        .await?;

        Ok(file)
    }

    pub async fn list_files(
        &self,
        company_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Vec<CustomerFile>, AppError> {
        let files = sqlx::query_as::<_, CustomerFile>(
            r#"
            SELECT * FROM customer_files
            WHERE customer_id = $1 AND company_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id)
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    pub async fn delete_file<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        file_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customer_files WHERE id = $1 AND company_id = $2")
            .bind(file_id)
            .bind(company_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_files_for_customer<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        customer_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result =
            sqlx::query("DELETE FROM customer_files WHERE customer_id = $1 AND company_id = $2")
                .bind(customer_id)
                .bind(company_id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }
}

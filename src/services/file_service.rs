// src/services/file_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{with_read_retry, RetryPolicy},
        error::AppError,
    },
    db::{CustomerRepository, FileRepository},
    models::customer::CustomerFile,
};

/// Metadados de documento anexado ao cliente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub filename: String,
    pub file_type: Option<String>,
    pub file_path: String,
}

#[derive(Clone)]
pub struct FileService {
    file_repo: FileRepository,
    customer_repo: CustomerRepository,
    pool: PgPool,
    retry: RetryPolicy,
}

impl FileService {
    pub fn new(
        file_repo: FileRepository,
        customer_repo: CustomerRepository,
        pool: PgPool,
        retry: RetryPolicy,
    ) -> Self {
        Self { file_repo, customer_repo, pool, retry }
    }

    pub async fn add_file(
        &self,
        company_id: Uuid,
        customer_id: Uuid,
        file: &NewFile,
    ) -> Result<CustomerFile, AppError> {
        let mut tx = self.pool.begin().await?;
        self.customer_repo
            .lock_customer(&mut *tx, company_id, customer_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let created = self
            .file_repo
            .create_file(
                &mut *tx,
                company_id,
                customer_id,
                file.filename.trim(),
                file.file_type.as_deref(),
                file.file_path.trim(),
            )
            .await?;
        tx.commit().await?;

        tracing::info!("📎 Arquivo {} anexado ao cliente {}", created.id, customer_id);
        Ok(created)
    }

    pub async fn list_files(
        &self,
        company_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Vec<CustomerFile>, AppError> {
        with_read_retry(&self.retry, || self.customer_repo.find_customer(company_id, customer_id))
            .await?
            .ok_or(AppError::NotFound)?;
        with_read_retry(&self.retry, || self.file_repo.list_files(company_id, customer_id)).await
    }

    pub async fn delete_file(&self, company_id: Uuid, file_id: Uuid) -> Result<(), AppError> {
        let deleted = self.file_repo.delete_file(&self.pool, company_id, file_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

// src/services/tenancy_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{with_read_retry, RetryPolicy},
        error::AppError,
    },
    db::{TenantRepository, UserRepository},
    models::{
        auth::{User, UserRole},
        tenancy::Company,
    },
    services::auth::{hash_password, normalize_email},
};

/// Gestão dos usuários dentro da própria empresa.
#[derive(Clone)]
pub struct TenantService {
    tenant_repo: TenantRepository,
    user_repo: UserRepository,
    retry: RetryPolicy,
}

impl TenantService {
    pub fn new(tenant_repo: TenantRepository, user_repo: UserRepository, retry: RetryPolicy) -> Self {
        Self { tenant_repo, user_repo, retry }
    }

    pub async fn get_company(&self, company_id: Uuid) -> Result<Company, AppError> {
        with_read_retry(&self.retry, || self.tenant_repo.find_company(company_id))
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn list_users(&self, company_id: Uuid) -> Result<Vec<User>, AppError> {
        with_read_retry(&self.retry, || self.user_repo.list_by_company(company_id)).await
    }

    /// O novo usuário sempre nasce na empresa de quem o criou.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let password_hash = hash_password(password).await?;
        let user = self
            .user_repo
            .create_user(executor, company_id, &normalize_email(email), &password_hash, role)
            .await?;

        tracing::info!("👤 Usuário {} ({}) criado na empresa {}", user.id, role, company_id);
        Ok(user)
    }
}

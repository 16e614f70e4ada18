// src/db/customer_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::customer::{Customer, CustomerInput},
};

// Todas as consultas filtram por company_id: fora da empresa, o cliente "não existe"
#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEITURAS
    // =========================================================================

    /// Todos os clientes da empresa, por sobrenome e nome.
    pub async fn list_customers(&self, company_id: Uuid) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE company_id = $1
            ORDER BY last_name ASC, first_name ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn find_customer(
        &self,
        company_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE id = $1 AND company_id = $2",
        )
        .bind(customer_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Mesma busca, travando a linha até o fim da transação.
    pub async fn lock_customer<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE id = $1 AND company_id = $2 FOR UPDATE",
        )
        .bind(customer_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;

        Ok(customer)
    }

    // =========================================================================
    //  ESCRITAS
    // =========================================================================

    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        input: &CustomerInput,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (
                company_id, first_name, last_name, email, phone,
                date_of_birth, nationality, passport_number, passport_expiry_date,
                visa_type, expiry_date, application_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.date_of_birth)
        .bind(&input.nationality)
        .bind(&input.passport_number)
        .bind(input.passport_expiry_date)
        .bind(&input.visa_type)
        .bind(input.expiry_date)
        .bind(input.application_date)
        .fetch_one(executor)
        .await?;

        Ok(customer)
    }

    /// Atualiza os campos do cliente; `None` se ele não pertence à empresa.
    pub async fn update_customer<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        customer_id: Uuid,
        input: &CustomerInput,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                first_name = $3,
                last_name = $4,
                email = $5,
                phone = $6,
                date_of_birth = $7,
                nationality = $8,
                passport_number = $9,
                passport_expiry_date = $10,
                visa_type = $11,
                expiry_date = $12,
                application_date = $13,
                updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(company_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.date_of_birth)
        .bind(&input.nationality)
        .bind(&input.passport_number)
        .bind(input.passport_expiry_date)
        .bind(&input.visa_type)
        .bind(input.expiry_date)
        .bind(input.application_date)
        .fetch_optional(executor)
        .await?;

        Ok(customer)
    }

    /// Aponta (ou limpa) o relatório ativo do cliente.
    pub async fn set_active_report<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        customer_id: Uuid,
        report_id: Option<Uuid>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE customers
            SET active_report_id = $3, updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(customer_id)
        .bind(company_id)
        .bind(report_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn delete_customer<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        customer_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND company_id = $2")
            .bind(customer_id)
            .bind(company_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

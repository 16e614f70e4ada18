// src/models/customer.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::report::{Report, ReportNote, ReportStatus};

// --- CLIENTE ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub company_id: Uuid,

    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "1990-05-01")]
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,

    pub passport_number: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub passport_expiry_date: Option<NaiveDate>,

    pub visa_type: Option<String>,
    // Vencimento do visto
    #[schema(value_type = Option<String>, format = Date)]
    pub expiry_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub application_date: Option<NaiveDate>,

    // O relatório "atual" do cliente (no máximo um)
    pub active_report_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Campos editáveis do cliente, já validados e com datas convertidas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub passport_number: Option<String>,
    pub passport_expiry_date: Option<NaiveDate>,
    pub visa_type: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub application_date: Option<NaiveDate>,
}

/// O que fazer com o relatório ativo ao criar/editar um cliente.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportPlan {
    NotRequired,
    Required {
        next_report_date: NaiveDate,
        status: Option<ReportStatus>,
    },
}

// --- NOTAS E ARQUIVOS DO CLIENTE ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerNote {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub user_id: Option<Uuid>,
    pub author_email: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// Só metadados: os bytes ficam no armazenamento externo
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFile {
    pub id: Uuid,
    pub customer_id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub filename: String,
    pub file_type: Option<String>,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

/// Ficha completa do cliente.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    pub customer: Customer,
    pub active_report: Option<Report>,
    pub report_notes: Vec<ReportNote>,
    pub notes: Vec<CustomerNote>,
    pub files: Vec<CustomerFile>,
}

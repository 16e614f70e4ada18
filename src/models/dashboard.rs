// src/models/dashboard.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::report::ReportStatus;

// 1. Uma linha por cliente: o cliente + o relatório ativo + a nota mais recente dele
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardEntry {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub visa_type: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub expiry_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub passport_expiry_date: Option<NaiveDate>,

    pub report_id: Option<Uuid>,
    pub report_title: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub report_due_date: Option<NaiveDate>,
    pub report_status: Option<ReportStatus>,
    pub report_note: Option<String>,

    pub latest_note: Option<String>,
    pub latest_note_at: Option<DateTime<Utc>>,
}

// 2. Os números dos cards do topo
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub total_customers: usize,
    pub reports_due_15_days: usize,
    pub visa_expiring_30_days: usize,
    pub passport_expiring_30_days: usize,
    pub birthdays: usize,
    pub visa_report_not_due: usize,
}

// 3. As listas (os buckets 1-3 podem se sobrepor)
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[schema(value_type = String, format = Date)]
    pub today: NaiveDate,
    pub counts: DashboardCounts,
    pub reports_due_15_days: Vec<DashboardEntry>,
    pub visa_expiring_30_days: Vec<DashboardEntry>,
    pub passport_expiring_30_days: Vec<DashboardEntry>,
    pub birthdays: Vec<DashboardEntry>,
    pub visa_report_not_due: Vec<DashboardEntry>,
    pub all_customers: Vec<DashboardEntry>,
}

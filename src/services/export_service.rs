// src/services/export_service.rs

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{
    common::{
        dates::format_date_for_submission,
        db_utils::{with_read_retry, RetryPolicy},
        error::AppError,
    },
    db::CustomerRepository,
    models::customer::Customer,
};

// Cabeçalho com os nomes crus das colunas
const HEADER: [&str; 16] = [
    "id",
    "company_id",
    "first_name",
    "last_name",
    "email",
    "phone",
    "date_of_birth",
    "nationality",
    "passport_number",
    "passport_expiry_date",
    "visa_type",
    "expiry_date",
    "application_date",
    "active_report_id",
    "created_at",
    "updated_at",
];

#[derive(Clone)]
pub struct ExportService {
    customer_repo: CustomerRepository,
    retry: RetryPolicy,
}

impl ExportService {
    pub fn new(customer_repo: CustomerRepository, retry: RetryPolicy) -> Self {
        Self { customer_repo, retry }
    }

    pub async fn export_customers(&self, company_id: Uuid) -> Result<String, AppError> {
        let customers =
            with_read_retry(&self.retry, || self.customer_repo.list_customers(company_id)).await?;
        tracing::info!("📤 Exportando {} clientes da empresa {}", customers.len(), company_id);
        Ok(customers_to_csv(&customers))
    }
}

pub fn export_filename(today: NaiveDate) -> String {
    format!("customers-export-{}.csv", format_date_for_submission(today))
}

/// Aspas só quando o campo tem vírgula, aspas, CR ou LF.
pub fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(csv_escape).unwrap_or_default()
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(format_date_for_submission).unwrap_or_default()
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn customers_to_csv(customers: &[Customer]) -> String {
    let mut out = HEADER.join(",");
    out.push('\n');

    for c in customers {
        let row = [
            c.id.to_string(),
            c.company_id.to_string(),
            csv_escape(&c.first_name),
            csv_escape(&c.last_name),
            text(&c.email),
            text(&c.phone),
            date(c.date_of_birth),
            text(&c.nationality),
            text(&c.passport_number),
            date(c.passport_expiry_date),
            text(&c.visa_type),
            date(c.expiry_date),
            date(c.application_date),
            c.active_report_id.map(|id| id.to_string()).unwrap_or_default(),
            timestamp(c.created_at),
            timestamp(c.updated_at),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn customer(first: &str, last: &str) -> Customer {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        Customer {
            id: Uuid::nil(),
            company_id: Uuid::nil(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: None,
            phone: None,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 1),
            nationality: None,
            passport_number: None,
            passport_expiry_date: None,
            visa_type: Some("Student".into()),
            expiry_date: None,
            application_date: None,
            active_report_id: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn quotes_and_commas_are_escaped() {
        assert_eq!(csv_escape(r#"O'Brien, "Jr""#), r#""O'Brien, ""Jr""""#);
        assert_eq!(csv_escape("linha\nquebrada"), "\"linha\nquebrada\"");
        assert_eq!(csv_escape("simples"), "simples");
        assert_eq!(csv_escape(""), "");
    }

    #[test]
    fn rows_follow_the_header() {
        let csv = customers_to_csv(&[customer("Ana", r#"O'Brien, "Jr""#)]);
        let mut lines = csv.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("id,company_id,first_name,last_name,"));
        assert_eq!(header.split(',').count(), HEADER.len());

        let row = lines.next().unwrap();
        assert!(row.contains(r#",Ana,"O'Brien, ""Jr""","#));
        assert!(row.contains(",1990-05-01,"));
        assert!(row.contains(",Student,"));
        assert!(row.ends_with(",,2025-01-02T03:04:05Z,2025-01-02T03:04:05Z"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn nulls_become_empty_fields() {
        let csv = customers_to_csv(&[customer("Ana", "Silva")]);
        let row = csv.lines().nth(1).unwrap();
        // email e phone vazios logo após o sobrenome
        assert!(row.contains(",Silva,,,1990-05-01,"));
    }

    #[test]
    fn active_report_pointer_is_exported() {
        let report_id = Uuid::new_v4();
        let mut c = customer("Ana", "Silva");
        c.active_report_id = Some(report_id);

        let csv = customers_to_csv(&[c]);
        let mut lines = csv.lines();
        let header: Vec<&str> = lines.next().unwrap().split(',').collect();
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();

        let column = header.iter().position(|h| *h == "active_report_id").unwrap();
        assert_eq!(header[column + 1], "created_at");
        assert_eq!(row.len(), header.len());
        assert_eq!(row[column], report_id.to_string());
    }

    #[test]
    fn filename_carries_the_date() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(export_filename(today), "customers-export-2025-06-01.csv");
    }

    #[test]
    fn empty_export_is_just_the_header() {
        let csv = customers_to_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
    }
}

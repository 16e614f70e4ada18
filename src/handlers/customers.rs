// src/handlers/customers.rs

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateEmail};

use crate::{
    common::{
        dates::{parse_optional_date, YearRange},
        error::AppError,
        validation::validate_not_blank,
    },
    config::AppState,
    middleware::tenancy::TenantContext,
    models::{
        customer::{Customer, CustomerDetail, CustomerInput, ReportPlan},
        report::ReportStatus,
    },
};

// =============================================================================
//  PAYLOAD DO FORMULÁRIO
// =============================================================================

// Datas chegam como texto "YYYY-MM-DD" e viram NaiveDate aqui, com erro por campo.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Ana")]
    pub first_name: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Silva")]
    pub last_name: String,

    pub email: Option<String>,
    pub phone: Option<String>,
    #[schema(example = "1990-05-01")]
    pub date_of_birth: Option<String>,
    pub nationality: Option<String>,
    pub passport_number: Option<String>,
    pub passport_expiry_date: Option<String>,
    pub visa_type: Option<String>,
    pub expiry_date: Option<String>,
    pub application_date: Option<String>,

    // --- Relatório ---
    #[serde(default)]
    pub no_report_required: bool,
    #[schema(example = "2025-06-01")]
    pub next_report_date: Option<String>,
    #[schema(example = "pending")]
    pub report_status: Option<String>,
    pub report_id: Option<Uuid>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn collect_date(
    errors: &mut HashMap<String, String>,
    field: &str,
    value: Option<&str>,
    range: &YearRange,
) -> Option<NaiveDate> {
    match parse_optional_date(value, range) {
        Ok(date) => date,
        Err(e) => {
            errors.insert(field.to_string(), e.code().to_string());
            None
        }
    }
}

impl CustomerPayload {
    /// Valida e separa o formulário em campos do cliente, plano do relatório e id do relatório.
    pub fn into_parts(
        self,
        range: &YearRange,
    ) -> Result<(CustomerInput, ReportPlan, Option<Uuid>), AppError> {
        self.validate()?;

        let mut errors = HashMap::new();

        let email = clean(self.email).map(|e| e.to_lowercase());
        if email.as_ref().is_some_and(|e| !e.validate_email()) {
            errors.insert("email".to_string(), "email".to_string());
        }

        let input = CustomerInput {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email,
            phone: clean(self.phone),
            date_of_birth: collect_date(&mut errors, "dateOfBirth", self.date_of_birth.as_deref(), range),
            nationality: clean(self.nationality),
            passport_number: clean(self.passport_number),
            passport_expiry_date: collect_date(
                &mut errors,
                "passportExpiryDate",
                self.passport_expiry_date.as_deref(),
                range,
            ),
            visa_type: clean(self.visa_type),
            expiry_date: collect_date(&mut errors, "expiryDate", self.expiry_date.as_deref(), range),
            application_date: collect_date(
                &mut errors,
                "applicationDate",
                self.application_date.as_deref(),
                range,
            ),
        };

        let status = match clean(self.report_status) {
            None => None,
            Some(raw) => match raw.parse::<ReportStatus>() {
                Ok(status) => Some(status),
                Err(_) => {
                    errors.insert("reportStatus".to_string(), "invalid_status".to_string());
                    None
                }
            },
        };

        let plan = if self.no_report_required {
            ReportPlan::NotRequired
        } else {
            match collect_date(&mut errors, "nextReportDate", self.next_report_date.as_deref(), range) {
                Some(next_report_date) => ReportPlan::Required { next_report_date, status },
                None => {
                    // Relatório exigido sem data: erro no próprio campo
                    errors
                        .entry("nextReportDate".to_string())
                        .or_insert_with(|| "required".to_string());
                    ReportPlan::NotRequired
                }
            }
        };

        if !errors.is_empty() {
            return Err(AppError::FieldErrors(errors));
        }

        Ok((input, plan, self.report_id))
    }
}

// =============================================================================
//  ROTAS
// =============================================================================

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    responses(
        (status = 200, description = "Clientes da empresa, por sobrenome e nome", body = Vec<Customer>)
    ),
    security(("session_cookie" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.customer_service.list_customers(tenant.0).await?;
    Ok(Json(json!({ "success": true, "customers": customers })))
}

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CustomerPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Customer),
        (status = 400, description = "Campos inválidos (detalhes por campo)")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (input, plan, _) = payload.into_parts(&app_state.settings.date_range)?;

    let customer = app_state
        .customer_service
        .add_customer(tenant.0, &input, &plan)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "customerId": customer.id, "customer": customer })),
    ))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Ficha completa do cliente", body = CustomerDetail),
        (status = 404, description = "Não encontrado ou de outra empresa")
    ),
    security(("session_cookie" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .customer_service
        .get_customer_detail(tenant.0, customer_id)
        .await?;
    Ok(Json(json!({ "success": true, "detail": detail })))
}

// PUT /api/customers/{id}
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "Customers",
    request_body = CustomerPayload,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente atualizado e relatório reconciliado", body = Customer),
        (status = 400, description = "Campos inválidos"),
        (status = 404, description = "Não encontrado ou de outra empresa")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (input, plan, report_id) = payload.into_parts(&app_state.settings.date_range)?;

    let customer = app_state
        .customer_service
        .update_customer(tenant.0, customer_id, &input, &plan, report_id)
        .await?;

    Ok(Json(json!({ "success": true, "customer": customer })))
}

// DELETE /api/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente e dependentes apagados"),
        (status = 404, description = "Não encontrado ou de outra empresa")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .customer_service
        .delete_customer(tenant.0, customer_id)
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CustomerPayload {
        CustomerPayload {
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            date_of_birth: Some("1990-05-01".into()),
            next_report_date: Some("2025-06-01".into()),
            ..Default::default()
        }
    }

    fn field_errors(result: Result<(CustomerInput, ReportPlan, Option<Uuid>), AppError>) -> HashMap<String, String> {
        match result {
            Err(AppError::FieldErrors(errors)) => errors,
            other => panic!("esperava FieldErrors, veio {other:?}"),
        }
    }

    #[test]
    fn report_required_by_default() {
        let (input, plan, report_id) = payload().into_parts(&YearRange::default()).unwrap();
        assert_eq!(input.date_of_birth, NaiveDate::from_ymd_opt(1990, 5, 1));
        assert_eq!(
            plan,
            ReportPlan::Required {
                next_report_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                status: None,
            }
        );
        assert_eq!(report_id, None);
    }

    #[test]
    fn missing_next_report_date_is_a_field_error() {
        let mut p = payload();
        p.next_report_date = None;
        let errors = field_errors(p.into_parts(&YearRange::default()));
        assert_eq!(errors["nextReportDate"], "required");
    }

    #[test]
    fn no_report_required_ignores_the_date() {
        let mut p = payload();
        p.no_report_required = true;
        p.next_report_date = None;
        let (_, plan, _) = p.into_parts(&YearRange::default()).unwrap();
        assert_eq!(plan, ReportPlan::NotRequired);
    }

    #[test]
    fn bad_dates_are_reported_per_field() {
        let mut p = payload();
        p.expiry_date = Some("31/12/2025".into());
        p.passport_expiry_date = Some("1800-01-01".into());
        let errors = field_errors(p.into_parts(&YearRange::default()));
        assert_eq!(errors["expiryDate"], "invalid_date");
        assert_eq!(errors["passportExpiryDate"], "date_out_of_range");
        assert!(!errors.contains_key("dateOfBirth"));
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let mut p = payload();
        p.email = Some("  ".into());
        p.phone = Some("".into());
        p.application_date = Some(" ".into());
        let (input, _, _) = p.into_parts(&YearRange::default()).unwrap();
        assert_eq!(input.email, None);
        assert_eq!(input.phone, None);
        assert_eq!(input.application_date, None);
    }

    #[test]
    fn report_status_must_be_known() {
        let mut p = payload();
        p.report_status = Some("done".into());
        let errors = field_errors(p.into_parts(&YearRange::default()));
        assert_eq!(errors["reportStatus"], "invalid_status");

        let mut p = payload();
        p.report_status = Some("completed".into());
        let (_, plan, _) = p.into_parts(&YearRange::default()).unwrap();
        assert!(matches!(
            plan,
            ReportPlan::Required { status: Some(ReportStatus::Completed), .. }
        ));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let mut p = payload();
        p.email = Some("sem-arroba".into());
        let errors = field_errors(p.into_parts(&YearRange::default()));
        assert_eq!(errors["email"], "email");
    }

    #[test]
    fn blank_names_fail_validation() {
        let mut p = payload();
        p.first_name = "   ".into();
        p.last_name = "\t".into();
        p.no_report_required = true;
        match p.into_parts(&YearRange::default()) {
            Err(AppError::ValidationError(errors)) => {
                let fields = errors.field_errors();
                assert_eq!(fields["first_name"][0].code, "required");
                assert_eq!(fields["last_name"][0].code, "required");
            }
            other => panic!("esperava ValidationError, veio {other:?}"),
        }
    }

    #[test]
    fn empty_name_fails_validation() {
        let mut p = payload();
        p.first_name = String::new();
        assert!(matches!(
            p.into_parts(&YearRange::default()),
            Err(AppError::ValidationError(_))
        ));
    }
}

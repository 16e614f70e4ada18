// src/handlers/export.rs

use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
};

use crate::{
    common::{dates::today_utc, error::AppError},
    config::AppState,
    middleware::tenancy::TenantContext,
    services::export_service::export_filename,
};

// GET /api/export/customers
#[utoipa::path(
    get,
    path = "/api/export/customers",
    tag = "Export",
    responses(
        (status = 200, description = "CSV com todos os clientes da empresa", content_type = "text/csv", body = String)
    ),
    security(("session_cookie" = []))
)]
pub async fn export_customers(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let csv = app_state.export_service.export_customers(tenant.0).await?;
    let disposition = format!("attachment; filename=\"{}\"", export_filename(today_utc()));

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

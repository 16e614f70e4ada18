// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    common::{dates::today_utc, error::AppError},
    config::AppState,
    middleware::tenancy::TenantContext,
    models::dashboard::Dashboard,
};

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cards e listas do painel (data de referência em UTC)", body = Dashboard)
    ),
    security(("session_cookie" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = app_state
        .dashboard_service
        .get_dashboard(tenant.0, today_utc())
        .await?;

    Ok(Json(json!({ "success": true, "dashboard": dashboard })))
}

// src/handlers/tenancy.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        rbac::{AdminOnly, AdminOrManager, RequireRole},
        tenancy::TenantContext,
    },
    models::auth::{CreateUserPayload, User},
};

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Usuários da empresa", body = Vec<User>),
        (status = 403, description = "Requer papel admin ou manager")
    ),
    security(("session_cookie" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminOrManager>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.tenant_service.list_users(tenant.0).await?;
    Ok(Json(json!({ "success": true, "users": users })))
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado na empresa", body = User),
        (status = 403, description = "Requer papel admin"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminOnly>,
    tenant: TenantContext,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state
        .tenant_service
        .create_user(&app_state.db_pool, tenant.0, &payload.email, &payload.password, payload.role)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "user": user }))))
}

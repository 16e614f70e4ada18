// src/handlers/notes.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, validation::validate_not_blank},
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::TenantContext},
    models::customer::{CustomerFile, CustomerNote},
    services::file_service::NewFile,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NotePayload {
    #[validate(length(min = 1, max = 5000, message = "required"))]
    #[schema(example = "Cliente enviou o comprovante de matrícula.")]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilePayload {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "passaporte.pdf")]
    pub filename: String,
    #[schema(example = "application/pdf")]
    pub file_type: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "customers/2f1c/passaporte.pdf")]
    pub file_path: String,
}

// =============================================================================
//  NOTAS DO CLIENTE
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/customers/{id}/notes",
    tag = "Customer Notes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Notas, mais recentes primeiro", body = Vec<CustomerNote>),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn list_customer_notes(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let notes = app_state.note_service.list_notes(tenant.0, customer_id).await?;
    Ok(Json(json!({ "success": true, "notes": notes })))
}

#[utoipa::path(
    post,
    path = "/api/customers/{id}/notes",
    tag = "Customer Notes",
    request_body = NotePayload,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 201, description = "Nota criada", body = CustomerNote),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_customer_note(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<NotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let note = app_state
        .note_service
        .add_note(user.company_id, user.user_id, customer_id, &payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "note": note }))))
}

#[utoipa::path(
    delete,
    path = "/api/customer-notes/{id}",
    tag = "Customer Notes",
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota apagada"),
        (status = 404, description = "Nota não encontrada")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_customer_note(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(note_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.note_service.delete_note(tenant.0, note_id).await?;
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
//  ARQUIVOS DO CLIENTE
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/customers/{id}/files",
    tag = "Customer Files",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Metadados dos arquivos", body = Vec<CustomerFile>),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn list_customer_files(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let files = app_state.file_service.list_files(tenant.0, customer_id).await?;
    Ok(Json(json!({ "success": true, "files": files })))
}

#[utoipa::path(
    post,
    path = "/api/customers/{id}/files",
    tag = "Customer Files",
    request_body = FilePayload,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 201, description = "Arquivo registrado", body = CustomerFile),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_customer_file(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<FilePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let file = NewFile {
        filename: payload.filename,
        file_type: payload.file_type.filter(|t| !t.trim().is_empty()),
        file_path: payload.file_path,
    };
    let created = app_state
        .file_service
        .add_file(tenant.0, customer_id, &file)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "file": created }))))
}

#[utoipa::path(
    delete,
    path = "/api/customer-files/{id}",
    tag = "Customer Files",
    params(("id" = Uuid, Path, description = "ID do arquivo")),
    responses(
        (status = 200, description = "Arquivo removido"),
        (status = 404, description = "Arquivo não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_customer_file(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(file_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.file_service.delete_file(tenant.0, file_id).await?;
    Ok(Json(json!({ "success": true })))
}

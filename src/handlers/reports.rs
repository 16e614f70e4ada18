// src/handlers/reports.rs

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
    common::{dates::today_utc, error::AppError},
    config::AppState,
    handlers::notes::NotePayload,
    middleware::{auth::AuthenticatedUser, tenancy::TenantContext},
    models::report::{Report, ReportNote},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusPayload {
    #[schema(example = "needs_attention")]
    pub status: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleStatusPayload {
    /// O botão clicado
    #[schema(example = "completed")]
    pub status: String,
}

// PUT /api/reports/{id}/status
#[utoipa::path(
    put,
    path = "/api/reports/{id}/status",
    tag = "Reports",
    request_body = UpdateStatusPayload,
    params(("id" = Uuid, Path, description = "ID do relatório")),
    responses(
        (status = 200, description = "Status atualizado", body = Report),
        (status = 400, description = "Status inválido"),
        (status = 404, description = "Relatório não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(report_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .report_service
        .update_report_status(tenant.0, report_id, &payload.status, payload.note.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "report": report })))
}

// POST /api/reports/{id}/toggle
#[utoipa::path(
    post,
    path = "/api/reports/{id}/toggle",
    tag = "Reports",
    request_body = ToggleStatusPayload,
    params(("id" = Uuid, Path, description = "ID do relatório")),
    responses(
        (status = 200, description = "Novo status (clicar no ativo volta para pending)", body = Report),
        (status = 400, description = "Status inválido"),
        (status = 404, description = "Relatório não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn toggle_status(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(report_id): Path<Uuid>,
    Json(payload): Json<ToggleStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .report_service
        .toggle_report_status(tenant.0, report_id, &payload.status)
        .await?;
    Ok(Json(json!({ "success": true, "report": report })))
}

// GET /api/reports/{id}/notes
#[utoipa::path(
    get,
    path = "/api/reports/{id}/notes",
    tag = "Reports",
    params(("id" = Uuid, Path, description = "ID do relatório")),
    responses(
        (status = 200, description = "Histórico, mais recentes primeiro", body = Vec<ReportNote>),
        (status = 404, description = "Relatório não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn list_notes(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(report_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let notes = app_state
        .report_service
        .list_report_notes(tenant.0, report_id)
        .await?;
    Ok(Json(json!({ "success": true, "notes": notes })))
}

// POST /api/reports/{id}/notes
#[utoipa::path(
    post,
    path = "/api/reports/{id}/notes",
    tag = "Reports",
    request_body = NotePayload,
    params(("id" = Uuid, Path, description = "ID do relatório")),
    responses(
        (status = 201, description = "Nota adicionada ao histórico", body = ReportNote),
        (status = 404, description = "Relatório não encontrado"),
        (status = 422, description = "Relatório vence em mais de 15 dias")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_note(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(report_id): Path<Uuid>,
    Json(payload): Json<NotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let note = app_state
        .report_service
        .add_report_note(user.company_id, user.user_id, report_id, &payload.content, today_utc())
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "note": note }))))
}

// DELETE /api/report-notes/{id}
#[utoipa::path(
    delete,
    path = "/api/report-notes/{id}",
    tag = "Reports",
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota removida; o status não muda"),
        (status = 404, description = "Nota não encontrada")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_note(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(note_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.report_service.delete_report_note(tenant.0, note_id).await?;
    Ok(Json(json!({ "success": true })))
}

// src/handlers/auth.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{
        removal_session_cookie, session_cookie, session_token, AuthenticatedUser,
    },
    models::auth::{AuthResponse, LoginPayload, RegisterPayload},
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Empresa e administrador criados; cookie de sessão emitido", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let issued = app_state
        .auth_service
        .register(&payload.company_name, &payload.email, &payload.password)
        .await?;

    let cookie = session_cookie(
        issued.token,
        app_state.settings.session_ttl(),
        app_state.settings.cookie_secure,
    );

    Ok((
        StatusCode::CREATED,
        jar.add(cookie),
        Json(AuthResponse { success: true, user: issued.user }),
    ))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login efetuado; cookie de sessão emitido", body = AuthResponse),
        (status = 401, description = "E-mail ou senha inválidos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let issued = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    let cookie = session_cookie(
        issued.token,
        app_state.settings.session_ttl(),
        app_state.settings.cookie_secure,
    );

    Ok((jar.add(cookie), Json(AuthResponse { success: true, user: issued.user })))
}

// POST /api/auth/logout
// Pública: funciona mesmo com a sessão já expirada, e sempre limpa o cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Sessão encerrada")
    )
)]
pub async fn logout(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = session_token(&jar) {
        app_state.auth_service.destroy_session(&token).await?;
    }

    let jar = jar.remove(removal_session_cookie(app_state.settings.cookie_secure));
    Ok((jar, Json(json!({ "success": true }))))
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário da sessão e sua empresa"),
        (status = 401, description = "Sem sessão")
    ),
    security(("session_cookie" = []))
)]
pub async fn me(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.tenant_service.get_company(user.company_id).await?;

    Ok(Json(json!({
        "success": true,
        "user": user,
        "company": company,
    })))
}

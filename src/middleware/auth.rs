// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};

use crate::{common::error::AppError, config::AppState, models::auth::SessionUser};

/// Nome único do cookie de sessão; só este módulo o lê.
pub const SESSION_COOKIE: &str = "session";

pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|token| !token.is_empty())
}

// Guard das rotas /api protegidas
pub async fn session_guard(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(&jar).ok_or(AppError::Unauthorized)?;

    let user = app_state
        .auth_service
        .resolve_session(&token)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Guard das páginas: nunca responde erro, só redireciona
pub async fn page_guard(
    State(app_state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let has_session = match session_token(&jar) {
        Some(token) => match app_state.auth_service.resolve_session(&token).await {
            Ok(user) => user.is_some(),
            Err(e) => {
                tracing::warn!("Falha ao resolver sessão da página: {}", e);
                false
            }
        },
        None => false,
    };

    match page_redirect(request.uri().path(), has_session) {
        Some(target) => Redirect::to(target).into_response(),
        None => next.run(request).await,
    }
}

/// Para onde mandar o navegador, se for o caso.
pub fn page_redirect(path: &str, has_session: bool) -> Option<&'static str> {
    match path {
        "/login" | "/register" if has_session => Some("/dashboard"),
        "/" | "/dashboard" | "/customers" if !has_session => Some("/login"),
        _ => None,
    }
}

pub fn session_cookie(token: String, ttl: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Mesmo nome e path do cookie emitido, senão o navegador não o apaga.
pub fn removal_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub SessionUser);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::Unauthorized)
    }
}

// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{SessionUser, UserRole},
};

/// 1. O Trait que define quais papéis podem passar
pub trait RoleDef: Send + Sync + 'static {
    fn allowed() -> &'static [UserRole];
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<SessionUser>()
            .ok_or(AppError::Unauthorized)?;

        if !T::allowed().contains(&user.role) {
            tracing::warn!("Usuário {} ({}) barrado pelo papel", user.user_id, user.role);
            return Err(AppError::Forbidden);
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn allowed() -> &'static [UserRole] { &[UserRole::Admin] }
}

pub struct AdminOrManager;
impl RoleDef for AdminOrManager {
    fn allowed() -> &'static [UserRole] { &[UserRole::Admin, UserRole::Manager] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use uuid::Uuid;

    fn parts_for(role: UserRole) -> Parts {
        let user = SessionUser {
            user_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            role,
            email: "x@vistos.com".into(),
        };
        Request::builder().extension(user).body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn admin_passes_every_guard() {
        let mut parts = parts_for(UserRole::Admin);
        assert!(RequireRole::<AdminOnly>::from_request_parts(&mut parts, &()).await.is_ok());
        assert!(RequireRole::<AdminOrManager>::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn manager_cannot_create_users() {
        let mut parts = parts_for(UserRole::Manager);
        let result = RequireRole::<AdminOnly>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
        assert!(RequireRole::<AdminOrManager>::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn plain_user_is_forbidden() {
        let mut parts = parts_for(UserRole::User);
        let result = RequireRole::<AdminOrManager>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn missing_session_is_unauthorized() {
        let mut parts = Request::builder().body(()).unwrap().into_parts().0;
        let result = RequireRole::<AdminOnly>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}

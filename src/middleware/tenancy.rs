// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::SessionUser};

// A empresa vem sempre da sessão, nunca de cabeçalho ou corpo da requisição.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .map(|user| TenantContext(user.company_id))
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use axum::http::Request;

    #[tokio::test]
    async fn tenant_comes_from_the_session() {
        let company_id = Uuid::new_v4();
        let (mut parts, _) = Request::builder()
            .header("x-tenant-id", Uuid::new_v4().to_string())
            .extension(SessionUser {
                user_id: Uuid::new_v4(),
                company_id,
                role: UserRole::User,
                email: "a@vistos.com".into(),
            })
            .body(())
            .unwrap()
            .into_parts();

        let TenantContext(found) = TenantContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found, company_id);
    }
}

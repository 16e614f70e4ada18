use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::db_utils::is_rate_limited;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Erros por campo (chave do campo -> código do erro), ex: datas inválidas
    #[error("Campos inválidos")]
    FieldErrors(HashMap<String, String>),

    #[error("Status inválido: {0}")]
    InvalidStatus(String),

    #[error("Notas só podem ser adicionadas a relatórios que vencem em até 15 dias")]
    NoteWindowClosed,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Sessão inválida ou ausente")]
    Unauthorized,

    #[error("Permissão insuficiente")]
    Forbidden,

    // Propositalmente igual para "não existe" e "pertence a outra empresa"
    #[error("Registro não encontrado")]
    NotFound,

    #[error("Banco de dados sobrecarregado")]
    RateLimited,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),
}

impl AppError {
    /// Erros transitórios de sobrecarga do banco, os únicos que as leituras repetem.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            AppError::RateLimited => true,
            AppError::DatabaseError(e) => is_rate_limited(e),
            _ => false,
        }
    }

    /// Atalho para erro de um único campo.
    pub fn field(field: &str, code: &str) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.to_string(), code.to_string());
        AppError::FieldErrors(errors)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::FieldErrors(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            AppError::NoteWindowClosed => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            e if e.is_rate_limited() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error_message, details) = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                ("Um ou mais campos são inválidos.", Some(details))
            }
            AppError::FieldErrors(errors) => {
                let details: HashMap<String, serde_json::Value> = errors
                    .iter()
                    .map(|(field, code)| (field.clone(), json!([code])))
                    .collect();
                ("Um ou mais campos são inválidos.", Some(details))
            }
            AppError::InvalidStatus(_) => ("Status de relatório inválido.", None),
            AppError::NoteWindowClosed => (
                "Notas só podem ser adicionadas a relatórios vencidos ou que vencem em até 15 dias.",
                None,
            ),
            AppError::EmailAlreadyExists => ("Este e-mail já está em uso.", None),
            AppError::InvalidCredentials => ("E-mail ou senha inválidos.", None),
            AppError::Unauthorized => ("Sessão inválida ou expirada. Faça login novamente.", None),
            AppError::Forbidden => ("Você não tem permissão para realizar esta ação.", None),
            AppError::NotFound => ("Registro não encontrado ou acesso negado.", None),
            e if e.is_rate_limited() => {
                tracing::warn!("Banco de dados sobrecarregado: {}", e);
                (
                    "Estamos com muito tráfego no momento. Tente novamente em alguns instantes.",
                    None,
                )
            }
            // Todos os outros erros viram 500; o detalhe vai só para o log.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ("Ocorreu um erro inesperado.", None)
            }
        };

        let body = match details {
            Some(details) => json!({
                "success": false,
                "error": error_message,
                "details": details,
            }),
            None => json!({ "success": false, "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_hides_cross_tenant_existence() {
        let response = AppError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn field_errors_are_bad_request() {
        let err = AppError::field("expiryDate", "invalid_date");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        match err {
            AppError::FieldErrors(map) => assert_eq!(map["expiryDate"], "invalid_date"),
            other => panic!("esperava FieldErrors, veio {other:?}"),
        }
    }

    #[test]
    fn rate_limited_maps_to_service_unavailable() {
        assert!(AppError::RateLimited.is_rate_limited());
        assert_eq!(AppError::RateLimited.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let pool_timeout = AppError::DatabaseError(sqlx::Error::PoolTimedOut);
        assert!(pool_timeout.is_rate_limited());
        assert_eq!(pool_timeout.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn credentials_and_session_errors_are_unauthorized() {
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert!(!AppError::Unauthorized.is_rate_limited());
    }

    #[test]
    fn unexpected_errors_are_internal() {
        let err = AppError::InternalServerError(anyhow::anyhow!("boom"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = AppError::DatabaseError(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

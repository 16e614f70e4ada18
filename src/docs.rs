// src/docs.rs

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::middleware::auth::SESSION_COOKIE;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,

        // --- Users ---
        handlers::tenancy::list_users,
        handlers::tenancy::create_user,

        // --- Customers ---
        handlers::customers::list_customers,
        handlers::customers::create_customer,
        handlers::customers::get_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,

        // --- Customer Notes & Files ---
        handlers::notes::list_customer_notes,
        handlers::notes::create_customer_note,
        handlers::notes::delete_customer_note,
        handlers::notes::list_customer_files,
        handlers::notes::create_customer_file,
        handlers::notes::delete_customer_file,

        // --- Reports ---
        handlers::reports::update_status,
        handlers::reports::toggle_status,
        handlers::reports::list_notes,
        handlers::reports::create_note,
        handlers::reports::delete_note,

        // --- Dashboard & Export ---
        handlers::dashboard::get_dashboard,
        handlers::export::export_customers,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::SessionUser,
            models::auth::RegisterPayload,
            models::auth::LoginPayload,
            models::auth::CreateUserPayload,
            models::auth::AuthResponse,

            // --- Tenancy ---
            models::tenancy::Company,

            // --- Customers ---
            models::customer::Customer,
            models::customer::CustomerNote,
            models::customer::CustomerFile,
            models::customer::CustomerDetail,
            handlers::customers::CustomerPayload,
            handlers::notes::NotePayload,
            handlers::notes::FilePayload,

            // --- Reports ---
            models::report::ReportStatus,
            models::report::Report,
            models::report::ReportNote,
            handlers::reports::UpdateStatusPayload,
            handlers::reports::ToggleStatusPayload,

            // --- Dashboard ---
            models::dashboard::DashboardEntry,
            models::dashboard::DashboardCounts,
            models::dashboard::Dashboard,
        )
    ),
    tags(
        (name = "Auth", description = "Registro, login e sessão por cookie"),
        (name = "Users", description = "Usuários da empresa"),
        (name = "Customers", description = "Cadastro de clientes e relatório ativo"),
        (name = "Customer Notes", description = "Anotações na ficha do cliente"),
        (name = "Customer Files", description = "Metadados de documentos do cliente"),
        (name = "Reports", description = "Status e histórico de notas dos relatórios"),
        (name = "Dashboard", description = "Cards de vencimentos e aniversários"),
        (name = "Export", description = "Exportação CSV")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_api_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/customers/{id}",
            "/api/reports/{id}/toggle",
            "/api/export/customers",
        ] {
            assert!(doc.paths.paths.contains_key(path), "faltou {path}");
        }
        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("session_cookie"));
    }
}

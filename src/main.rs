//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;
use crate::middleware::auth::{page_guard, session_guard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let addr = settings.app_addr.clone();

    let app_state = AppState::new(settings).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = router(app_state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout));

    // Tudo daqui para baixo exige sessão
    let protected_api = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/users",
            get(handlers::tenancy::list_users).post(handlers::tenancy::create_user),
        )
        // Clientes
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/customers/{id}",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        .route(
            "/customers/{id}/notes",
            get(handlers::notes::list_customer_notes).post(handlers::notes::create_customer_note),
        )
        .route("/customer-notes/{id}", delete(handlers::notes::delete_customer_note))
        .route(
            "/customers/{id}/files",
            get(handlers::notes::list_customer_files).post(handlers::notes::create_customer_file),
        )
        .route("/customer-files/{id}", delete(handlers::notes::delete_customer_file))
        // Relatórios
        .route("/reports/{id}/status", put(handlers::reports::update_status))
        .route("/reports/{id}/toggle", post(handlers::reports::toggle_status))
        .route(
            "/reports/{id}/notes",
            get(handlers::reports::list_notes).post(handlers::reports::create_note),
        )
        .route("/report-notes/{id}", delete(handlers::reports::delete_note))
        // Painel e exportação
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/export/customers", get(handlers::export::export_customers))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            session_guard,
        ));

    let pages = Router::new()
        .route("/", get(handlers::pages::index))
        .route("/login", get(handlers::pages::login_page))
        .route("/register", get(handlers::pages::register_page))
        .route("/dashboard", get(handlers::pages::dashboard_page))
        .route("/customers", get(handlers::pages::customers_page))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            page_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_api)
        .merge(pages)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}

// src/handlers/pages.rs
// Cascas HTML mínimas; o conteúdo vem da API via fetch. O redirecionamento por sessão fica no page_guard.

use axum::response::{Html, IntoResponse, Redirect};

fn shell(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} | VisaDesk</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    ))
}

// "/" com sessão vai direto para o painel
pub async fn index() -> impl IntoResponse {
    Redirect::to("/dashboard")
}

pub async fn login_page() -> impl IntoResponse {
    shell(
        "Entrar",
        r#"<form id="login" data-endpoint="/api/auth/login">
<input name="email" type="email" required>
<input name="password" type="password" required>
<button type="submit">Entrar</button>
</form>
<a href="/register">Criar conta</a>"#,
    )
}

pub async fn register_page() -> impl IntoResponse {
    shell(
        "Criar conta",
        r#"<form id="register" data-endpoint="/api/auth/register">
<input name="companyName" required>
<input name="email" type="email" required>
<input name="password" type="password" minlength="6" required>
<button type="submit">Registrar</button>
</form>
<a href="/login">Já tenho conta</a>"#,
    )
}

pub async fn dashboard_page() -> impl IntoResponse {
    shell(
        "Painel",
        r#"<main id="dashboard" data-endpoint="/api/dashboard"></main>"#,
    )
}

pub async fn customers_page() -> impl IntoResponse {
    shell(
        "Clientes",
        r#"<main id="customers" data-endpoint="/api/customers"></main>
<a href="/api/export/customers">Exportar CSV</a>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_wraps_title_and_body() {
        let Html(page) = shell("Painel", "<main></main>");
        assert!(page.contains("<title>Painel | VisaDesk</title>"));
        assert!(page.contains("<main></main>"));
        assert!(page.starts_with("<!doctype html>"));
    }
}

// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{SessionRepository, TenantRepository, UserRepository},
    models::auth::{SessionUser, UserRole},
};

/// Sessão recém-emitida: o token vai para o cookie, o usuário para a resposta.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    session_repo: SessionRepository,
    tenant_repo: TenantRepository,
    pool: PgPool,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        session_repo: SessionRepository,
        tenant_repo: TenantRepository,
        pool: PgPool,
        session_ttl: Duration,
    ) -> Self {
        Self { user_repo, session_repo, tenant_repo, pool, session_ttl }
    }

    /// Cria a empresa e o primeiro usuário (admin) atomicamente e já abre a sessão.
    pub async fn register(
        &self,
        company_name: &str,
        email: &str,
        password: &str,
    ) -> Result<IssuedSession, AppError> {
        let email = normalize_email(email);
        // Hashing fora da transação, pois não toca no banco
        let password_hash = hash_password(password).await?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        let company = self
            .tenant_repo
            .create_company(&mut *tx, company_name.trim())
            .await?;

        // Se falhar aqui, o tx sofre rollback ao sair do escopo e a empresa não fica órfã
        let user = self
            .user_repo
            .create_user(&mut *tx, company.id, &email, &password_hash, UserRole::Admin)
            .await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!("🏢 Empresa {} registrada com o usuário {}", company.id, user.id);

        let session_user = SessionUser {
            user_id: user.id,
            company_id: user.company_id,
            role: user.role,
            email: user.email,
        };
        let token = self.create_session(session_user.user_id, session_user.company_id).await?;

        Ok(IssuedSession { token, user: session_user })
    }

    /// E-mail desconhecido e senha errada dão exatamente o mesmo erro.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<SessionUser, AppError> {
        let user = self
            .user_repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        Ok(SessionUser {
            user_id: user.id,
            company_id: user.company_id,
            role: user.role,
            email: user.email,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, AppError> {
        let user = self.authenticate(email, password).await?;

        let purged = self.session_repo.delete_expired().await?;
        if purged > 0 {
            tracing::debug!("{} sessões expiradas removidas", purged);
        }

        let token = self.create_session(user.user_id, user.company_id).await?;
        tracing::info!("🔑 Login do usuário {}", user.user_id);

        Ok(IssuedSession { token, user })
    }

    /// Substitui qualquer sessão anterior do usuário e devolve o token novo.
    pub async fn create_session(&self, user_id: Uuid, company_id: Uuid) -> Result<String, AppError> {
        let token = generate_token();
        let expires_at = Utc::now() + self.session_ttl;

        let mut tx = self.pool.begin().await?;
        self.session_repo.delete_for_user(&mut *tx, user_id).await?;
        self.session_repo
            .insert(&mut *tx, &session_id_for(&token), user_id, company_id, expires_at)
            .await?;
        tx.commit().await?;

        Ok(token)
    }

    /// `None` para token vazio, desconhecido ou expirado.
    pub async fn resolve_session(&self, token: &str) -> Result<Option<SessionUser>, AppError> {
        if token.is_empty() {
            return Ok(None);
        }
        self.session_repo.find_user(&session_id_for(token)).await
    }

    /// Idempotente: apagar uma sessão que já não existe não é erro.
    pub async fn destroy_session(&self, token: &str) -> Result<(), AppError> {
        if token.is_empty() {
            return Ok(());
        }
        self.session_repo.delete(&session_id_for(token)).await?;
        Ok(())
    }
}

pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Token opaco: 32 bytes aleatórios em hex.
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// O banco guarda só o SHA-256 do token.
fn session_id_for(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

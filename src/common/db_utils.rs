// src/common/db_utils.rs

use std::future::Future;
use std::time::Duration;

use crate::common::error::AppError;

// SQLSTATE de sobrecarga: too_many_connections / configuration_limit_exceeded
const RATE_LIMIT_SQLSTATES: [&str; 2] = ["53300", "53400"];

/// Política de repetição das leituras: tentativas e atraso base (dobra a cada tentativa).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Atraso antes da próxima tentativa, depois de `attempt` falhas (1, 2, ...).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor)
    }
}

/// O banco sinalizou sobrecarga transitória (não é uma falha permanente)?
pub fn is_rate_limited(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                if RATE_LIMIT_SQLSTATES.contains(&code.as_ref()) {
                    return true;
                }
            }
            message_signals_rate_limit(db_err.message())
        }
        _ => false,
    }
}

fn message_signals_rate_limit(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("rate limit") || message.contains("too many requests")
}

// ---
// Helper de repetição: só para leituras
// ---
/// Executa `op` repetindo com backoff exponencial enquanto o erro for de sobrecarga.
/// Qualquer outro erro volta imediatamente. Esgotadas as tentativas, vira `RateLimited`.
pub async fn with_read_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_rate_limited() => {
                if attempt >= policy.max_attempts {
                    tracing::warn!("Leitura desistiu após {} tentativas: {}", attempt, e);
                    return Err(AppError::RateLimited);
                }
                let delay = policy.delay_for_attempt(attempt);
                tracing::info!(
                    "Banco sobrecarregado (tentativa {}), repetindo em {:?}",
                    attempt,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

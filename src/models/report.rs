// src/models/report.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

pub const DEFAULT_REPORT_TITLE: &str = "Regular Check-in";

// Mapeia o CREATE TYPE report_status do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Completed,
    NeedsAttention,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Completed => "completed",
            ReportStatus::NeedsAttention => "needs_attention",
        }
    }

    /// Semântica do botão de status: clicar no status ativo volta para `pending`.
    pub fn toggled(self, clicked: ReportStatus) -> ReportStatus {
        if self == clicked {
            ReportStatus::Pending
        } else {
            clicked
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(ReportStatus::Pending),
            "completed" => Ok(ReportStatus::Completed),
            "needs_attention" => Ok(ReportStatus::NeedsAttention),
            other => Err(AppError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = String, format = Date, example = "2025-06-01")]
    pub due_date: NaiveDate,
    pub status: ReportStatus,
    // Campo legado de nota única; o histórico fica em report_notes
    pub note: Option<String>,
    pub status_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportNote {
    pub id: Uuid,
    pub report_id: Uuid,
    pub content: String,
    pub user_id: Option<Uuid>,
    pub author_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_three_statuses() {
        assert_eq!("pending".parse::<ReportStatus>().unwrap(), ReportStatus::Pending);
        assert_eq!("completed".parse::<ReportStatus>().unwrap(), ReportStatus::Completed);
        assert_eq!(
            "needs_attention".parse::<ReportStatus>().unwrap(),
            ReportStatus::NeedsAttention
        );
    }

    #[test]
    fn rejects_unknown_status() {
        let err = "archived".parse::<ReportStatus>().unwrap_err();
        assert!(matches!(err, AppError::InvalidStatus(s) if s == "archived"));
        assert!("Completed".parse::<ReportStatus>().is_err());
    }

    #[test]
    fn clicking_the_active_status_twice_returns_to_pending() {
        let first = ReportStatus::Pending.toggled(ReportStatus::NeedsAttention);
        assert_eq!(first, ReportStatus::NeedsAttention);
        let second = first.toggled(ReportStatus::NeedsAttention);
        assert_eq!(second, ReportStatus::Pending);
    }

    #[test]
    fn any_state_reaches_any_other() {
        assert_eq!(
            ReportStatus::Completed.toggled(ReportStatus::NeedsAttention),
            ReportStatus::NeedsAttention
        );
        assert_eq!(
            ReportStatus::NeedsAttention.toggled(ReportStatus::Completed),
            ReportStatus::Completed
        );
        assert_eq!(ReportStatus::Pending.toggled(ReportStatus::Pending), ReportStatus::Pending);
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&ReportStatus::NeedsAttention).unwrap();
        assert_eq!(json, "\"needs_attention\"");
        assert_eq!(ReportStatus::NeedsAttention.to_string(), "needs_attention");
    }
}

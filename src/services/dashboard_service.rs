// src/services/dashboard_service.rs

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::{
        dates::{is_birthday_soon, is_within_days},
        db_utils::{with_read_retry, RetryPolicy},
        error::AppError,
    },
    db::DashboardRepository,
    models::dashboard::{Dashboard, DashboardCounts, DashboardEntry},
};

pub const REPORT_WINDOW_DAYS: u64 = 15;
pub const EXPIRY_WINDOW_DAYS: u64 = 30;

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    retry: RetryPolicy,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, retry: RetryPolicy) -> Self {
        Self { repo, retry }
    }

    pub async fn get_dashboard(&self, company_id: Uuid, today: NaiveDate) -> Result<Dashboard, AppError> {
        let entries = with_read_retry(&self.retry, || self.repo.list_entries(company_id)).await?;
        Ok(categorize(entries, today))
    }
}

fn report_due_soon(entry: &DashboardEntry, today: NaiveDate) -> bool {
    entry.report_id.is_some()
        && entry
            .report_due_date
            .is_some_and(|due| is_within_days(due, today, REPORT_WINDOW_DAYS))
}

fn visa_expiring(entry: &DashboardEntry, today: NaiveDate) -> bool {
    entry
        .expiry_date
        .is_some_and(|d| is_within_days(d, today, EXPIRY_WINDOW_DAYS))
}

fn passport_expiring(entry: &DashboardEntry, today: NaiveDate) -> bool {
    entry
        .passport_expiry_date
        .is_some_and(|d| is_within_days(d, today, EXPIRY_WINDOW_DAYS))
}

/// Distribui os clientes nos cards do painel. As três primeiras listas podem
/// se sobrepor; `visa_report_not_due` fica com quem não caiu em nenhuma delas.
pub fn categorize(entries: Vec<DashboardEntry>, today: NaiveDate) -> Dashboard {
    let mut dashboard = Dashboard { today, ..Default::default() };

    for entry in &entries {
        let due = report_due_soon(entry, today);
        let visa = visa_expiring(entry, today);
        let passport = passport_expiring(entry, today);

        if due {
            dashboard.reports_due_15_days.push(entry.clone());
        }
        if visa {
            dashboard.visa_expiring_30_days.push(entry.clone());
        }
        if passport {
            dashboard.passport_expiring_30_days.push(entry.clone());
        }
        if entry.date_of_birth.is_some_and(|dob| is_birthday_soon(dob, today)) {
            dashboard.birthdays.push(entry.clone());
        }
        if !(due || visa || passport) {
            dashboard.visa_report_not_due.push(entry.clone());
        }
    }

    dashboard.counts = DashboardCounts {
        total_customers: entries.len(),
        reports_due_15_days: dashboard.reports_due_15_days.len(),
        visa_expiring_30_days: dashboard.visa_expiring_30_days.len(),
        passport_expiring_30_days: dashboard.passport_expiring_30_days.len(),
        birthdays: dashboard.birthdays.len(),
        visa_report_not_due: dashboard.visa_report_not_due.len(),
    };
    dashboard.all_customers = entries;
    dashboard
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::ReportStatus;
    use chrono::Days;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(name: &str) -> DashboardEntry {
        DashboardEntry {
            id: Uuid::new_v4(),
            first_name: name.to_string(),
            last_name: "Teste".to_string(),
            email: None,
            phone: None,
            date_of_birth: None,
            nationality: None,
            visa_type: None,
            expiry_date: None,
            passport_expiry_date: None,
            report_id: None,
            report_title: None,
            report_due_date: None,
            report_status: None,
            report_note: None,
            latest_note: None,
            latest_note_at: None,
        }
    }

    fn with_report(mut e: DashboardEntry, due: NaiveDate, status: ReportStatus) -> DashboardEntry {
        e.report_id = Some(Uuid::new_v4());
        e.report_title = Some("Regular Check-in".into());
        e.report_due_date = Some(due);
        e.report_status = Some(status);
        e
    }

    fn names(list: &[DashboardEntry]) -> Vec<&str> {
        list.iter().map(|e| e.first_name.as_str()).collect()
    }

    #[test]
    fn visa_window_boundaries_are_inclusive() {
        let today = date("2025-06-01");
        let mut at_today = entry("hoje");
        at_today.expiry_date = Some(today);
        let mut at_limit = entry("limite");
        at_limit.expiry_date = today.checked_add_days(Days::new(30));
        let mut past_limit = entry("depois");
        past_limit.expiry_date = today.checked_add_days(Days::new(31));
        let mut expired = entry("vencido");
        expired.expiry_date = Some(date("2025-05-31"));

        let dashboard = categorize(vec![at_today, at_limit, past_limit, expired], today);

        assert_eq!(names(&dashboard.visa_expiring_30_days), vec!["hoje", "limite"]);
        assert_eq!(names(&dashboard.visa_report_not_due), vec!["depois", "vencido"]);
        assert_eq!(dashboard.counts.visa_expiring_30_days, 2);
        assert_eq!(dashboard.counts.total_customers, 4);
    }

    #[test]
    fn report_bucket_ignores_status_and_overdue() {
        let today = date("2025-06-01");
        let done = with_report(entry("feito"), date("2025-06-16"), ReportStatus::Completed);
        let late = with_report(entry("atrasado"), date("2025-05-20"), ReportStatus::Pending);
        let far = with_report(entry("longe"), date("2025-06-17"), ReportStatus::Pending);

        let dashboard = categorize(vec![done, late, far], today);

        assert_eq!(names(&dashboard.reports_due_15_days), vec!["feito"]);
        assert_eq!(dashboard.counts.reports_due_15_days, 1);
    }

    #[test]
    fn buckets_overlap_but_not_due_is_the_complement() {
        let today = date("2025-06-01");
        let mut busy = with_report(entry("ocupado"), date("2025-06-05"), ReportStatus::Pending);
        busy.expiry_date = Some(date("2025-06-10"));
        busy.passport_expiry_date = Some(date("2025-06-20"));
        let quiet = entry("tranquilo");

        let dashboard = categorize(vec![busy, quiet], today);

        assert_eq!(names(&dashboard.reports_due_15_days), vec!["ocupado"]);
        assert_eq!(names(&dashboard.visa_expiring_30_days), vec!["ocupado"]);
        assert_eq!(names(&dashboard.passport_expiring_30_days), vec!["ocupado"]);
        assert_eq!(names(&dashboard.visa_report_not_due), vec!["tranquilo"]);

        for customer in &dashboard.all_customers {
            let in_some = dashboard.reports_due_15_days.iter().any(|e| e.id == customer.id)
                || dashboard.visa_expiring_30_days.iter().any(|e| e.id == customer.id)
                || dashboard.passport_expiring_30_days.iter().any(|e| e.id == customer.id);
            let in_not_due = dashboard.visa_report_not_due.iter().any(|e| e.id == customer.id);
            assert_ne!(in_some, in_not_due);
        }
    }

    #[test]
    fn birthdays_today_and_tomorrow() {
        let today = date("2025-12-31");
        let mut eve = entry("reveillon");
        eve.date_of_birth = Some(date("1980-12-31"));
        let mut new_year = entry("ano_novo");
        new_year.date_of_birth = Some(date("1992-01-01"));
        let mut other = entry("outro");
        other.date_of_birth = Some(date("1992-01-02"));

        let dashboard = categorize(vec![eve, new_year, other], today);

        assert_eq!(names(&dashboard.birthdays), vec!["reveillon", "ano_novo"]);
        // Aniversário não tira ninguém do complemento
        assert_eq!(dashboard.counts.visa_report_not_due, 3);
    }

    #[test]
    fn empty_company_has_zero_counts() {
        let dashboard = categorize(Vec::new(), date("2025-06-01"));
        assert_eq!(dashboard.counts, DashboardCounts::default());
        assert!(dashboard.all_customers.is_empty());
    }
}

// src/common/dates.rs

use chrono::{Datelike, Days, NaiveDate, Utc};
use thiserror::Error;

/// Formato único de data em toda a fronteira do sistema.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Faixa de anos aceita nos formulários.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for YearRange {
    fn default() -> Self {
        Self { min_year: 1900, max_year: 2100 }
    }
}

impl YearRange {
    pub fn contains(&self, year: i32) -> bool {
        year >= self.min_year && year <= self.max_year
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("data vazia")]
    Empty,
    #[error("data inválida: {0}")]
    Invalid(String),
    #[error("ano {year} fora da faixa {min}-{max}")]
    OutOfRange { year: i32, min: i32, max: i32 },
}

impl DateError {
    /// Código curto usado nos detalhes de erro por campo.
    pub fn code(&self) -> &'static str {
        match self {
            DateError::Empty => "required",
            DateError::Invalid(_) => "invalid_date",
            DateError::OutOfRange { .. } => "date_out_of_range",
        }
    }
}

/// Lê uma data `YYYY-MM-DD` (sem hora, sem fuso) e valida a faixa de anos.
pub fn parse_date(input: &str, range: &YearRange) -> Result<NaiveDate, DateError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DateError::Empty);
    }

    // O chrono aceita anos sem zero à esquerda; exigimos o formato completo.
    let well_formed = s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(DateError::Invalid(s.to_string()));
    }

    let date = NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| DateError::Invalid(s.to_string()))?;

    if !range.contains(date.year()) {
        return Err(DateError::OutOfRange {
            year: date.year(),
            min: range.min_year,
            max: range.max_year,
        });
    }

    Ok(date)
}

/// Campo opcional de formulário: vazio vira `None`.
pub fn parse_optional_date(
    input: Option<&str>,
    range: &YearRange,
) -> Result<Option<NaiveDate>, DateError> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s, range).map(Some),
    }
}

/// "Hoje" do servidor, sempre no calendário UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn format_date_for_submission(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `today <= date <= today + days`, ambos os limites inclusivos.
pub fn is_within_days(date: NaiveDate, today: NaiveDate, days: u64) -> bool {
    match today.checked_add_days(Days::new(days)) {
        Some(limit) => date >= today && date <= limit,
        None => date >= today,
    }
}

/// Aniversário hoje ou amanhã (o ano é ignorado).
pub fn is_birthday_soon(date_of_birth: NaiveDate, today: NaiveDate) -> bool {
    if falls_on(date_of_birth, today) {
        return true;
    }
    today.succ_opt().is_some_and(|tomorrow| falls_on(date_of_birth, tomorrow))
}

// 29/02 é comemorado em 28/02 nos anos não bissextos.
fn falls_on(date_of_birth: NaiveDate, day: NaiveDate) -> bool {
    if date_of_birth.month() == day.month() && date_of_birth.day() == day.day() {
        return true;
    }
    date_of_birth.month() == 2
        && date_of_birth.day() == 29
        && day.month() == 2
        && day.day() == 28
        && !is_leap_year(day.year())
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date() {
        let range = YearRange::default();
        assert_eq!(parse_date("2025-06-01", &range), Ok(d(2025, 6, 1)));
        assert_eq!(parse_date(" 1990-05-01 ", &range), Ok(d(1990, 5, 1)));
        assert_eq!(parse_date("", &range), Err(DateError::Empty));
        assert!(matches!(parse_date("2025-6-1", &range), Err(DateError::Invalid(_))));
        assert!(matches!(parse_date("01/06/2025", &range), Err(DateError::Invalid(_))));
        assert!(matches!(parse_date("2025-02-30", &range), Err(DateError::Invalid(_))));
        assert!(matches!(parse_date("2025-06-01T00:00:00Z", &range), Err(DateError::Invalid(_))));
    }

    #[test]
    fn test_year_range() {
        let range = YearRange { min_year: 1900, max_year: 2100 };
        assert_eq!(
            parse_date("1899-12-31", &range),
            Err(DateError::OutOfRange { year: 1899, min: 1900, max: 2100 })
        );
        assert!(parse_date("1900-01-01", &range).is_ok());
        assert!(parse_date("2100-12-31", &range).is_ok());
        assert!(parse_date("2101-01-01", &range).is_err());
    }

    #[test]
    fn test_round_trip() {
        let range = YearRange::default();
        for s in ["1900-01-01", "1990-05-01", "2024-02-29", "2025-12-31", "2100-12-31"] {
            let parsed = parse_date(s, &range).unwrap();
            assert_eq!(format_date_for_submission(parsed), s);
        }
    }

    #[test]
    fn test_optional_dates() {
        let range = YearRange::default();
        assert_eq!(parse_optional_date(None, &range), Ok(None));
        assert_eq!(parse_optional_date(Some("  "), &range), Ok(None));
        assert_eq!(parse_optional_date(Some("2025-01-02"), &range), Ok(Some(d(2025, 1, 2))));
        assert_eq!(parse_optional_date(Some("x"), &range).unwrap_err().code(), "invalid_date");
    }

    #[test]
    fn test_within_days_inclusive() {
        let today = d(2025, 6, 1);
        assert!(is_within_days(today, today, 30));
        assert!(is_within_days(d(2025, 7, 1), today, 30));
        assert!(!is_within_days(d(2025, 7, 2), today, 30));
        assert!(!is_within_days(d(2025, 5, 31), today, 30));
    }

    #[test]
    fn test_birthdays() {
        let dob = d(1990, 5, 1);
        assert!(is_birthday_soon(dob, d(2025, 5, 1)));
        assert!(is_birthday_soon(dob, d(2025, 4, 30)));
        assert!(!is_birthday_soon(dob, d(2025, 5, 2)));

        // virada de ano
        assert!(is_birthday_soon(d(1985, 1, 1), d(2025, 12, 31)));
    }

    #[test]
    fn test_leap_day_birthdays() {
        let leap = d(1992, 2, 29);
        // ano não bissexto: comemora em 28/02 (e aparece na véspera)
        assert!(is_birthday_soon(leap, d(2025, 2, 28)));
        assert!(is_birthday_soon(leap, d(2025, 2, 27)));
        assert!(!is_birthday_soon(leap, d(2025, 3, 1)));
        // ano bissexto: só em 29/02
        assert!(is_birthday_soon(leap, d(2024, 2, 29)));
        assert!(is_birthday_soon(leap, d(2024, 2, 28)));
        assert!(!is_birthday_soon(leap, d(2024, 2, 27)));
    }
}

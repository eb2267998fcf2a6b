//! Payroll Model (monthly payslips)

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar month, written `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// Month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    /// Number of calendar days
    pub fn days(&self) -> u32 {
        self.last_day().day()
    }

    /// Compact form used in voucher numbers (`202610`)
    pub fn compact(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month '{0}', expected YYYY-MM")]
pub struct InvalidMonth(pub String);

impl FromStr for Month {
    type Err = InvalidMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidMonth(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(err)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(err());
        }
        let year = y.parse().map_err(|_| err())?;
        let month = m.parse().map_err(|_| err())?;
        Month::new(year, month).ok_or_else(err)
    }
}

impl Serialize for Month {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum PayslipStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payslip {
    pub id: i64,
    pub restaurant_id: i64,
    pub user_id: i64,
    /// `YYYY-MM`
    pub month: String,
    pub monthly_salary: Decimal,
    pub days_in_month: i32,
    pub paid_days: Decimal,
    pub gross: Decimal,
    pub advance_deduction: Decimal,
    pub bonus: Decimal,
    pub other_deduction: Decimal,
    pub net: Decimal,
    pub status: PayslipStatus,
    pub method: Option<String>,
    pub note: Option<String>,
    pub paid_at: Option<i64>,
    pub voucher_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRunRequest {
    pub month: Month,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRunResult {
    pub month: Month,
    pub created: usize,
    pub skipped: usize,
    pub payslips: Vec<Payslip>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayslipUpdate {
    pub bonus: Option<Decimal>,
    pub other_deduction: Option<Decimal>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipPay {
    pub method: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayrollQuery {
    pub month: Option<Month>,
    pub user_id: Option<i64>,
    pub status: Option<PayslipStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayrollSummaryQuery {
    pub month: Month,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PayrollSummary {
    pub payslips: i64,
    pub gross: Decimal,
    pub advance_deduction: Decimal,
    pub bonus: Decimal,
    pub other_deduction: Decimal,
    pub net: Decimal,
    pub paid: Decimal,
    pub pending: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let m: Month = "2026-02".parse().unwrap();
        assert_eq!(m, Month { year: 2026, month: 2 });
        assert_eq!(m.to_string(), "2026-02");
        assert_eq!(m.compact(), "202602");
    }

    #[test]
    fn parse_rejects_garbage() {
        for s in ["2026-13", "2026-00", "26-01", "2026-1", "2026/01", "", "abcd-ef"] {
            assert!(s.parse::<Month>().is_err(), "{s} should not parse");
        }
    }

    #[test]
    fn days_in_month() {
        assert_eq!("2026-02".parse::<Month>().unwrap().days(), 28);
        assert_eq!("2028-02".parse::<Month>().unwrap().days(), 29);
        assert_eq!("2026-12".parse::<Month>().unwrap().days(), 31);
        assert_eq!("2026-04".parse::<Month>().unwrap().days(), 30);
    }

    #[test]
    fn range_bounds() {
        let m: Month = "2026-12".parse().unwrap();
        assert_eq!(m.first_day(), NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        assert_eq!(m.last_day(), NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
        assert_eq!(m.next().to_string(), "2027-01");
    }

    #[test]
    fn serde_as_string() {
        let req: PayrollRunRequest = serde_json::from_str(r#"{"month":"2026-10"}"#).unwrap();
        assert_eq!(req.month.month, 10);
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"month":"2026-10"}"#);
        assert!(serde_json::from_str::<PayrollRunRequest>(r#"{"month":"oct"}"#).is_err());
    }
}

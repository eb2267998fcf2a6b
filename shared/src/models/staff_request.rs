//! Staff Request Model (leave, shift swap, equipment, other)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Most attendance rows one approved leave writes
pub const MAX_LEAVE_DAYS: i64 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum RequestKind {
    Leave,
    ShiftSwap,
    Equipment,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StaffRequest {
    pub id: i64,
    pub restaurant_id: i64,
    pub user_id: i64,
    pub kind: RequestKind,
    pub status: RequestStatus,
    pub subject: String,
    pub details: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub decided_by: Option<i64>,
    pub decision_note: Option<String>,
    pub decided_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl StaffRequest {
    /// Days covered by an approved leave, at most [`MAX_LEAVE_DAYS`]
    pub fn leave_days(&self) -> Vec<NaiveDate> {
        match (self.kind, self.start_date, self.end_date) {
            (RequestKind::Leave, Some(start), Some(end)) => leave_days(start, end),
            _ => Vec::new(),
        }
    }
}

/// Inclusive date range from `start` to `end`, capped at [`MAX_LEAVE_DAYS`]
pub fn leave_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .take(MAX_LEAVE_DAYS as usize)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRequestCreate {
    pub kind: RequestKind,
    pub subject: String,
    pub details: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl StaffRequestCreate {
    /// Leave requests need a date range; other kinds may carry one
    pub fn validate(&self) -> AppResult<()> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => {
                if end < start {
                    return Err(AppError::validation("end_date must not be before start_date"));
                }
                Ok(())
            }
            (None, None) if self.kind != RequestKind::Leave => Ok(()),
            _ if self.kind == RequestKind::Leave => {
                Err(AppError::validation("leave requests need start_date and end_date"))
            }
            _ => Err(AppError::validation(
                "start_date and end_date must be given together",
            )),
        }
    }

    /// New pending request owned by `user_id`
    pub fn into_pending(self, id: i64, restaurant_id: i64, user_id: i64, now: i64) -> StaffRequest {
        StaffRequest {
            id,
            restaurant_id,
            user_id,
            kind: self.kind,
            status: RequestStatus::Pending,
            subject: self.subject.trim().to_string(),
            details: self.details,
            start_date: self.start_date,
            end_date: self.end_date,
            decided_by: None,
            decision_note: None,
            decided_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestDecision {
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffRequestQuery {
    pub status: Option<RequestStatus>,
    pub kind: Option<RequestKind>,
    pub user_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create(kind: RequestKind, start: Option<NaiveDate>, end: Option<NaiveDate>) -> StaffRequestCreate {
        StaffRequestCreate {
            kind,
            subject: "Family visit".into(),
            details: None,
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn leave_requires_dates() {
        assert!(create(RequestKind::Leave, None, None).validate().is_err());
        assert!(create(RequestKind::Leave, Some(date(2026, 3, 1)), None)
            .validate()
            .is_err());
        assert!(create(RequestKind::Leave, Some(date(2026, 3, 1)), Some(date(2026, 3, 3)))
            .validate()
            .is_ok());
    }

    #[test]
    fn end_before_start_rejected() {
        let req = create(RequestKind::Leave, Some(date(2026, 3, 5)), Some(date(2026, 3, 1)));
        assert!(req.validate().is_err());
    }

    #[test]
    fn long_leave_accepted_and_capped_when_applied() {
        // 40 days: 2026-01-01 ..= 2026-02-09
        let req = create(RequestKind::Leave, Some(date(2026, 1, 1)), Some(date(2026, 2, 9)));
        assert!(req.validate().is_ok());

        let request = req.into_pending(1, 2, 3, 0);
        assert_eq!(request.status, RequestStatus::Pending);
        let days = request.leave_days();
        assert_eq!(days.len(), 31);
        assert_eq!(days[0], date(2026, 1, 1));
        assert_eq!(days[30], date(2026, 1, 31));
    }

    #[test]
    fn other_kinds_without_dates() {
        assert!(create(RequestKind::Equipment, None, None).validate().is_ok());
        assert!(create(RequestKind::ShiftSwap, Some(date(2026, 3, 1)), None)
            .validate()
            .is_err());
    }

    #[test]
    fn leave_days_inclusive_and_capped() {
        let days = leave_days(date(2026, 2, 27), date(2026, 3, 2));
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], date(2026, 2, 27));
        assert_eq!(days[3], date(2026, 3, 2));

        let days = leave_days(date(2026, 1, 1), date(2026, 12, 31));
        assert_eq!(days.len(), MAX_LEAVE_DAYS as usize);
    }
}

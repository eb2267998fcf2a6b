//! Attendance Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Leave,
}

/// One row per employee per work day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Attendance {
    pub id: i64,
    pub restaurant_id: i64,
    pub user_id: i64,
    pub work_date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in_at: Option<i64>,
    pub check_out_at: Option<i64>,
    pub worked_minutes: Option<i32>,
    pub check_in_lat: Option<f64>,
    pub check_in_lng: Option<f64>,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Whole minutes between check-in and check-out; `None` if out precedes in
pub fn worked_minutes(check_in_at: i64, check_out_at: i64) -> Option<i32> {
    if check_out_at < check_in_at {
        return None;
    }
    i32::try_from((check_out_at - check_in_at) / 60_000).ok()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub note: Option<String>,
}

/// Manual correction by a manager
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceUpdate {
    pub status: Option<AttendanceStatus>,
    pub check_in_at: Option<i64>,
    pub check_out_at: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceQuery {
    pub user_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceSummaryQuery {
    /// `YYYY-MM`
    pub month: String,
}

/// Monthly per-employee aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AttendanceSummaryRow {
    pub user_id: i64,
    pub name: String,
    pub present_days: i64,
    pub half_days: i64,
    pub leave_days: i64,
    pub absent_days: i64,
    pub worked_minutes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_minutes_truncates() {
        let start = 1_700_000_000_000;
        assert_eq!(worked_minutes(start, start), Some(0));
        assert_eq!(worked_minutes(start, start + 59_999), Some(0));
        assert_eq!(worked_minutes(start, start + 8 * 3_600_000 + 30_000), Some(480));
    }

    #[test]
    fn worked_minutes_rejects_reversed_times() {
        assert_eq!(worked_minutes(2_000, 1_000), None);
    }
}

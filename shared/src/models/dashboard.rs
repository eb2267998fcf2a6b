//! Dashboard and report aggregates

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Date range in Unix millis (both optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AttendanceToday {
    pub present: i64,
    pub on_leave: i64,
    pub not_checked_in: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AiReviewStats {
    pub total: i64,
    pub passed: i64,
    pub failed: i64,
    pub errors: i64,
}

impl AiReviewStats {
    /// Passed share of answered reviews in percent; errors are not counted
    pub fn pass_rate(&self) -> f64 {
        let answered = self.passed + self.failed;
        if answered == 0 {
            return 0.0;
        }
        (self.passed as f64 * 1000.0 / answered as f64).round() / 10.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub tasks_by_status: Vec<StatusCount>,
    pub overdue_tasks: i64,
    pub attendance_today: AttendanceToday,
    pub pending_requests: i64,
    pub pending_advances: i64,
    pub ai_reviews: AiReviewStats,
    pub ai_pass_rate: f64,
    pub payroll_net_this_month: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TaskReportRow {
    pub user_id: i64,
    pub name: String,
    pub assigned: i64,
    pub completed: i64,
    pub rejected: i64,
    /// Completed no later than `due_at` (or without a deadline)
    pub on_time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_rate_ignores_errors() {
        let stats = AiReviewStats {
            total: 10,
            passed: 6,
            failed: 2,
            errors: 2,
        };
        assert_eq!(stats.pass_rate(), 75.0);
    }

    #[test]
    fn pass_rate_zero_without_answers() {
        let stats = AiReviewStats {
            total: 3,
            passed: 0,
            failed: 0,
            errors: 3,
        };
        assert_eq!(stats.pass_rate(), 0.0);
    }

    #[test]
    fn pass_rate_rounds_to_one_decimal() {
        let stats = AiReviewStats {
            total: 3,
            passed: 1,
            failed: 2,
            errors: 0,
        };
        assert_eq!(stats.pass_rate(), 33.3);
    }
}

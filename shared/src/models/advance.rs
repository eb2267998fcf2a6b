//! Salary Advance Model
//!
//! `pending → approved → paid → settled`, or `pending → rejected`.
//! Payslips recover a paid advance in one or more instalments; it is
//! settled once the payslip recovering its last part has been paid.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum AdvanceStatus {
    Pending,
    Approved,
    Rejected,
    Paid,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceAction {
    Approve,
    Reject,
    Pay,
}

impl AdvanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
            Self::Settled => "settled",
        }
    }

    /// Next status after `action`, or `None` if not allowed
    pub fn apply(self, action: AdvanceAction) -> Option<AdvanceStatus> {
        match (self, action) {
            (Self::Pending, AdvanceAction::Approve) => Some(Self::Approved),
            (Self::Pending, AdvanceAction::Reject) => Some(Self::Rejected),
            (Self::Approved, AdvanceAction::Pay) => Some(Self::Paid),
            _ => None,
        }
    }

    /// Approved or paid but not yet fully recovered
    pub fn is_outstanding(&self) -> bool {
        matches!(self, Self::Approved | Self::Paid)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AdvanceRequest {
    pub id: i64,
    pub restaurant_id: i64,
    pub user_id: i64,
    pub amount: Decimal,
    pub reason: Option<String>,
    pub status: AdvanceStatus,
    pub decided_by: Option<i64>,
    pub decision_note: Option<String>,
    pub decided_at: Option<i64>,
    pub voucher_id: Option<i64>,
    pub paid_at: Option<i64>,
    /// Total reserved by payslips so far, paid or pending
    pub deducted_amount: Decimal,
    /// Payslip whose payment settled the last part of this advance
    pub settled_payment_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AdvanceRequest {
    /// Part of the advance no payslip has reserved yet
    pub fn remaining(&self) -> Decimal {
        (self.amount - self.deducted_amount).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceCreate {
    pub amount: Decimal,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvanceDecision {
    pub note: Option<String>,
    /// Payment method recorded on the voucher when paying
    pub method: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvanceQuery {
    pub status: Option<AdvanceStatus>,
    pub user_id: Option<i64>,
}

/// Whether a new advance of `amount` fits under `monthly_salary`
/// given what is already outstanding
pub fn within_limit(amount: Decimal, outstanding: Decimal, monthly_salary: Decimal) -> bool {
    amount + outstanding <= monthly_salary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions() {
        let s = AdvanceStatus::Pending.apply(AdvanceAction::Approve).unwrap();
        assert_eq!(s, AdvanceStatus::Approved);
        assert_eq!(s.apply(AdvanceAction::Pay), Some(AdvanceStatus::Paid));
        assert_eq!(s.apply(AdvanceAction::Approve), None);
        assert_eq!(AdvanceStatus::Pending.apply(AdvanceAction::Pay), None);
        assert_eq!(AdvanceStatus::Rejected.apply(AdvanceAction::Approve), None);
        assert_eq!(AdvanceStatus::Paid.apply(AdvanceAction::Pay), None);
    }

    #[test]
    fn outstanding_statuses() {
        assert!(AdvanceStatus::Approved.is_outstanding());
        assert!(AdvanceStatus::Paid.is_outstanding());
        assert!(!AdvanceStatus::Pending.is_outstanding());
        assert!(!AdvanceStatus::Settled.is_outstanding());
        assert!(!AdvanceStatus::Rejected.is_outstanding());
    }

    #[test]
    fn remaining_balance() {
        let mut a: AdvanceRequest = serde_json::from_value(serde_json::json!({
            "id": 1, "restaurant_id": 1, "user_id": 2, "amount": 500.0,
            "reason": null, "status": "paid", "decided_by": null,
            "decision_note": null, "decided_at": null, "voucher_id": null,
            "paid_at": 10, "deducted_amount": 300.0, "settled_payment_id": null,
            "created_at": 0, "updated_at": 0
        }))
        .unwrap();
        assert_eq!(a.remaining(), Decimal::new(200, 0));
        a.deducted_amount = a.amount;
        assert!(a.remaining().is_zero());
    }

    #[test]
    fn limit_is_inclusive() {
        let salary = Decimal::new(1500, 0);
        assert!(within_limit(Decimal::new(500, 0), Decimal::new(1000, 0), salary));
        assert!(!within_limit(Decimal::new(50001, 2), Decimal::new(1000, 0), salary));
        assert!(within_limit(salary, Decimal::ZERO, salary));
    }
}

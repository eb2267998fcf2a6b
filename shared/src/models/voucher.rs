//! Voucher Model (numbered payout documents)

use super::Month;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum VoucherKind {
    Salary,
    Advance,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum VoucherStatus {
    Issued,
    Void,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Voucher {
    pub id: i64,
    pub restaurant_id: i64,
    pub kind: VoucherKind,
    /// `V{YYYYMM}-{seq:04}`
    pub number: String,
    pub payee_user_id: Option<i64>,
    pub payee_name: String,
    pub amount: Decimal,
    pub description: Option<String>,
    /// Payslip or advance this voucher pays out
    pub reference_id: Option<i64>,
    pub method: Option<String>,
    pub status: VoucherStatus,
    pub void_reason: Option<String>,
    pub issued_by: i64,
    pub created_at: i64,
    pub voided_at: Option<i64>,
}

/// Manual expense voucher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherCreate {
    pub payee_name: String,
    pub payee_user_id: Option<i64>,
    pub amount: Decimal,
    pub description: Option<String>,
    pub method: Option<String>,
}

/// Voucher fields filled by the issuing workflow
#[derive(Debug, Clone)]
pub struct VoucherDraft {
    pub kind: VoucherKind,
    pub payee_user_id: Option<i64>,
    pub payee_name: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub reference_id: Option<i64>,
    pub method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherVoid {
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoucherQuery {
    pub kind: Option<VoucherKind>,
    pub month: Option<Month>,
    pub status: Option<VoucherStatus>,
}

pub fn format_voucher_number(month: &Month, seq: i64) -> String {
    format!("V{}-{:04}", month.compact(), seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voucher_number_format() {
        let m: Month = "2026-10".parse().unwrap();
        assert_eq!(format_voucher_number(&m, 1), "V202610-0001");
        assert_eq!(format_voucher_number(&m, 42), "V202610-0042");
        assert_eq!(format_voucher_number(&m, 12345), "V202610-12345");
    }
}

//! Payslip arithmetic
//!
//! ```text
//! paid_days = present + leave + 0.5 × half_day
//! gross     = round2(monthly_salary × paid_days / days_in_month)
//! advance   = min(unrecovered balance of paid advances, gross)
//! net       = gross − advance + bonus − other_deduction
//! ```

use rust_decimal::Decimal;
use shared::models::Month;
use shared::util::round_money;

/// Attendance counts for one employee in one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct AttendanceTally {
    pub present: i64,
    pub half_day: i64,
    pub leave: i64,
}

impl AttendanceTally {
    pub fn paid_days(&self) -> Decimal {
        Decimal::from(self.present + self.leave) + Decimal::new(5, 1) * Decimal::from(self.half_day)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayslipFigures {
    pub days_in_month: i32,
    pub paid_days: Decimal,
    pub gross: Decimal,
    pub advance_deduction: Decimal,
    pub bonus: Decimal,
    pub other_deduction: Decimal,
    pub net: Decimal,
}

/// Figures for a fresh payslip (bonus and other deduction start at zero)
pub fn compute(
    monthly_salary: Decimal,
    month: &Month,
    tally: AttendanceTally,
    unsettled_advances: Decimal,
) -> PayslipFigures {
    let days_in_month = month.days();
    let paid_days = tally.paid_days().min(Decimal::from(days_in_month));
    let gross = gross_pay(monthly_salary, month, tally);
    let advance_deduction = unsettled_advances.max(Decimal::ZERO).min(gross);

    PayslipFigures {
        days_in_month: days_in_month as i32,
        paid_days,
        gross,
        advance_deduction,
        bonus: Decimal::ZERO,
        other_deduction: Decimal::ZERO,
        net: net_pay(gross, advance_deduction, Decimal::ZERO, Decimal::ZERO),
    }
}

/// Gross pay before deductions
pub fn gross_pay(monthly_salary: Decimal, month: &Month, tally: AttendanceTally) -> Decimal {
    let days = Decimal::from(month.days());
    let paid_days = tally.paid_days().min(days);
    if days.is_zero() {
        return Decimal::ZERO;
    }
    round_money(monthly_salary * paid_days / days)
}

/// Part of one advance recovered by a payslip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceAllocation {
    pub advance_id: i64,
    pub amount: Decimal,
}

/// Spread `gross` over the remaining balances of paid advances, oldest
/// first. The last advance touched may be recovered only in part; its
/// remainder is left for the next payslip.
pub fn allocate_advances(remaining: &[(i64, Decimal)], gross: Decimal) -> Vec<AdvanceAllocation> {
    let mut left = gross.max(Decimal::ZERO);
    let mut allocations = Vec::new();
    for &(advance_id, balance) in remaining {
        if left.is_zero() {
            break;
        }
        let amount = balance.min(left);
        if amount <= Decimal::ZERO {
            continue;
        }
        left -= amount;
        allocations.push(AdvanceAllocation { advance_id, amount });
    }
    allocations
}

/// Figures for a fresh payslip together with the advance balances it recovers
pub fn plan_payslip(
    monthly_salary: Decimal,
    month: &Month,
    tally: AttendanceTally,
    remaining_advances: &[(i64, Decimal)],
) -> (PayslipFigures, Vec<AdvanceAllocation>) {
    let gross = gross_pay(monthly_salary, month, tally);
    let allocations = allocate_advances(remaining_advances, gross);
    let recovered = allocations.iter().map(|a| a.amount).sum();
    (compute(monthly_salary, month, tally, recovered), allocations)
}

pub fn net_pay(
    gross: Decimal,
    advance_deduction: Decimal,
    bonus: Decimal,
    other_deduction: Decimal,
) -> Decimal {
    round_money(gross - advance_deduction + bonus - other_deduction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn paid_days_counts_half_days() {
        let tally = AttendanceTally {
            present: 20,
            half_day: 3,
            leave: 2,
        };
        assert_eq!(tally.paid_days(), dec("23.5"));
    }

    #[test]
    fn full_month_pays_full_salary() {
        let tally = AttendanceTally {
            present: 28,
            half_day: 0,
            leave: 2,
        };
        let f = compute(dec("3000"), &month("2026-09"), tally, Decimal::ZERO);
        assert_eq!(f.days_in_month, 30);
        assert_eq!(f.gross, dec("3000.00"));
        assert_eq!(f.net, dec("3000.00"));
    }

    #[test]
    fn prorates_and_rounds() {
        let tally = AttendanceTally {
            present: 10,
            half_day: 1,
            leave: 0,
        };
        // 1000 × 10.5 / 31 = 338.709...
        let f = compute(dec("1000"), &month("2026-10"), tally, Decimal::ZERO);
        assert_eq!(f.gross, dec("338.71"));
    }

    #[test]
    fn advance_deduction_capped_at_gross() {
        let tally = AttendanceTally {
            present: 3,
            half_day: 0,
            leave: 0,
        };
        // 3100 × 3 / 31 = 300
        let f = compute(dec("3100"), &month("2026-10"), tally, dec("500"));
        assert_eq!(f.gross, dec("300.00"));
        assert_eq!(f.advance_deduction, dec("300.00"));
        assert_eq!(f.net, Decimal::ZERO);

        let f = compute(dec("3100"), &month("2026-10"), tally, dec("120.50"));
        assert_eq!(f.advance_deduction, dec("120.50"));
        assert_eq!(f.net, dec("179.50"));
    }

    #[test]
    fn no_attendance_no_pay() {
        let f = compute(dec("2500"), &month("2026-02"), AttendanceTally::default(), Decimal::ZERO);
        assert_eq!(f.days_in_month, 28);
        assert_eq!(f.gross, Decimal::ZERO);
        assert_eq!(f.net, Decimal::ZERO);
    }

    #[test]
    fn paid_days_never_exceed_month() {
        let tally = AttendanceTally {
            present: 40,
            half_day: 0,
            leave: 0,
        };
        let f = compute(dec("3000"), &month("2026-09"), tally, Decimal::ZERO);
        assert_eq!(f.paid_days, Decimal::from(30));
        assert_eq!(f.gross, dec("3000.00"));
    }

    fn alloc(advance_id: i64, amount: &str) -> AdvanceAllocation {
        AdvanceAllocation {
            advance_id,
            amount: dec(amount),
        }
    }

    #[test]
    fn advances_recovered_oldest_first_up_to_gross() {
        let advances = [(1, dec("200")), (2, dec("150")), (3, dec("100"))];
        assert_eq!(
            allocate_advances(&advances, dec("320")),
            vec![alloc(1, "200"), alloc(2, "120")]
        );
        assert_eq!(
            allocate_advances(&advances, dec("1000")),
            vec![alloc(1, "200"), alloc(2, "150"), alloc(3, "100")]
        );
        assert!(allocate_advances(&advances, Decimal::ZERO).is_empty());
    }

    #[test]
    fn large_advance_takes_whole_gross() {
        let tally = AttendanceTally {
            present: 3,
            half_day: 0,
            leave: 0,
        };
        let (f, allocations) = plan_payslip(dec("3100"), &month("2026-10"), tally, &[(1, dec("500"))]);
        assert_eq!(f.gross, dec("300.00"));
        assert_eq!(f.advance_deduction, dec("300.00"));
        assert_eq!(f.net, Decimal::ZERO);
        assert_eq!(allocations, vec![alloc(1, "300.00")]);
    }

    #[test]
    fn remainder_carries_to_next_payslip() {
        let tally = AttendanceTally {
            present: 16,
            half_day: 0,
            leave: 0,
        };
        // 3100 × 16 / 31 = 1600, advance balances 200 + 150 + 100 = 450
        let advances = [(1, dec("200")), (2, dec("150")), (3, dec("100"))];
        let (f, _) = plan_payslip(dec("3100"), &month("2026-10"), tally, &advances);
        assert_eq!(f.advance_deduction, dec("450"));
        assert_eq!(f.net, dec("1150.00"));

        // 320 of gross: advance 2 is cut to 120, leaving 30 of it and all of 3
        let tally = AttendanceTally {
            present: 3,
            half_day: 1,
            leave: 0,
        };
        let (f, allocations) = plan_payslip(dec("2893.33"), &month("2026-10"), tally, &advances);
        assert_eq!(f.gross, dec("326.67"));
        assert_eq!(f.advance_deduction, dec("326.67"));
        assert_eq!(allocations, vec![alloc(1, "200"), alloc(2, "126.67")]);
    }

    #[test]
    fn net_with_adjustments() {
        assert_eq!(
            net_pay(dec("1000"), dec("200"), dec("50.25"), dec("10")),
            dec("840.25")
        );
        assert!(net_pay(dec("100"), dec("100"), Decimal::ZERO, dec("1")) < Decimal::ZERO);
    }
}

pub mod transaction;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::loan::{Loan, LoanPatch};
use crate::schedule;
use crate::types::LoanStatus;

pub use transaction::Transaction;

/// loan state after a payment is applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentApplication {
    pub amount: Money,
    pub new_due_amount: Money,
    pub new_paid_count: u32,
    pub new_next_due_date: DateTime<Utc>,
    pub new_status: LoanStatus,
}

impl PaymentApplication {
    pub fn is_settled(&self) -> bool {
        self.new_status == LoanStatus::Completed
    }

    /// the partial update to persist alongside the transaction
    pub fn to_patch(&self) -> LoanPatch {
        LoanPatch {
            current_due_amount: Some(self.new_due_amount),
            paid_installments_count: Some(self.new_paid_count),
            next_due_date: Some(self.new_next_due_date),
            status: Some(self.new_status),
            ..LoanPatch::default()
        }
    }

    /// the loan snapshot after this payment
    pub fn apply_to(&self, loan: &Loan) -> Loan {
        let mut next = loan.clone();
        self.to_patch().apply(&mut next);
        next
    }
}

/// reject non-positive payments and payments above the current due
pub fn validate_payment(loan: &Loan, amount: Money) -> Result<()> {
    if !amount.is_positive() || amount > loan.current_due_amount {
        return Err(LedgerError::InvalidAmount {
            amount,
            current_due: loan.current_due_amount,
        });
    }
    Ok(())
}

/// apply one payment to a loan snapshot
///
/// The due date always moves forward exactly one period, however many
/// installments the amount covers. The loan completes only when nothing
/// remains due.
pub fn apply_payment(loan: &Loan, amount: Money) -> Result<PaymentApplication> {
    validate_payment(loan, amount)?;

    let new_due_amount = loan.current_due_amount.saturating_sub(amount);
    let new_status = if new_due_amount.is_zero() {
        LoanStatus::Completed
    } else {
        loan.status
    };

    Ok(PaymentApplication {
        amount,
        new_due_amount,
        new_paid_count: loan.paid_installments_count.saturating_add(1),
        new_next_due_date: schedule::advance_periods(loan.next_due_date, 1),
        new_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn due_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap()
    }

    fn active_loan(due: i64) -> Loan {
        Loan {
            id: Uuid::new_v4(),
            borrower_id: Uuid::new_v4(),
            total_principal: Money::from_major(10_000),
            current_due_amount: Money::from_major(due),
            installment_amount: Money::from_major(1_000),
            interest_rate: Rate::from_percentage(2),
            next_due_date: due_date(),
            paid_installments_count: 2,
            missed_installments_count: 0,
            status: LoanStatus::Active,
            created_at: due_date() - Duration::days(21),
        }
    }

    #[test]
    fn test_regular_installment() {
        let loan = active_loan(8_000);
        let result = apply_payment(&loan, Money::from_major(1_000)).unwrap();

        assert_eq!(result.new_due_amount, Money::from_major(7_000));
        assert_eq!(result.new_paid_count, 3);
        assert_eq!(result.new_next_due_date, due_date() + Duration::days(7));
        assert_eq!(result.new_status, LoanStatus::Active);
        assert!(!result.is_settled());
    }

    #[test]
    fn test_full_payment_completes() {
        let loan = active_loan(8_000);
        let result = apply_payment(&loan, Money::from_major(8_000)).unwrap();

        assert_eq!(result.new_due_amount, Money::ZERO);
        assert_eq!(result.new_status, LoanStatus::Completed);
        assert!(result.is_settled());
    }

    #[test]
    fn test_large_payment_advances_one_period() {
        let loan = active_loan(8_000);
        let result = apply_payment(&loan, Money::from_major(5_000)).unwrap();

        assert_eq!(result.new_next_due_date, due_date() + Duration::days(7));
        assert_eq!(result.new_paid_count, 3);
    }

    #[test]
    fn test_overpayment_rejected() {
        let loan = active_loan(8_000);
        let err = apply_payment(&loan, Money::from_major(8_001)).unwrap_err();

        assert_eq!(
            err,
            LedgerError::InvalidAmount {
                amount: Money::from_major(8_001),
                current_due: Money::from_major(8_000),
            }
        );
    }

    #[test]
    fn test_non_positive_rejected() {
        let loan = active_loan(8_000);
        assert!(matches!(apply_payment(&loan, Money::ZERO), Err(LedgerError::InvalidAmount { .. })));
        assert!(matches!(
            apply_payment(&loan, Money::from_major(-100)),
            Err(LedgerError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_nothing_due_rejects_everything() {
        let mut loan = active_loan(0);
        loan.status = LoanStatus::Completed;
        assert!(apply_payment(&loan, Money::from_minor(1)).is_err());
    }

    #[test]
    fn test_fractional_payment() {
        let loan = active_loan(1_000);
        let result = apply_payment(&loan, Money::from_str_exact("250.75").unwrap()).unwrap();

        assert_eq!(result.new_due_amount, Money::from_str_exact("749.25").unwrap());
        assert_eq!(result.new_status, LoanStatus::Active);
    }

    #[test]
    fn test_defaulted_loan_keeps_status_until_paid_off() {
        let mut loan = active_loan(3_000);
        loan.status = LoanStatus::Defaulted;

        let partial = apply_payment(&loan, Money::from_major(1_000)).unwrap();
        assert_eq!(partial.new_status, LoanStatus::Defaulted);

        let settled = apply_payment(&partial.apply_to(&loan), Money::from_major(2_000)).unwrap();
        assert_eq!(settled.new_status, LoanStatus::Completed);
    }

    #[test]
    fn test_patch_shape() {
        let loan = active_loan(2_000);
        let patch = apply_payment(&loan, Money::from_major(500)).unwrap().to_patch();

        assert_eq!(patch.current_due_amount, Some(Money::from_major(1_500)));
        assert_eq!(patch.paid_installments_count, Some(3));
        assert_eq!(patch.next_due_date, Some(due_date() + Duration::days(7)));
        assert_eq!(patch.status, Some(LoanStatus::Active));
        assert_eq!(patch.missed_installments_count, None);
    }
}

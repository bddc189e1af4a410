//! serializable views for the presentation layer

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::loan::{Borrower, Loan};
use crate::types::{DueStatus, LoanId, LoanStatus};

/// an active loan joined with its borrower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanWithBorrower {
    pub loan: Loan,
    pub borrower: Borrower,
    pub due_status: DueStatus,
}

/// serializable view of one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub status: LoanStatus,
    pub due_status: DueStatus,
    pub borrower: Borrower,
    pub amounts: AmountsView,
    pub schedule: ScheduleView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountsView {
    pub total_principal: Money,
    pub current_due_amount: Money,
    pub installment_amount: Money,
    pub interest_rate: Rate,
    pub principal_repaid: Money,
    pub suggested_payment: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleView {
    pub created_at: DateTime<Utc>,
    pub next_due_date: DateTime<Utc>,
    pub paid_installments_count: u32,
    pub missed_installments_count: u32,
    pub remaining_installments: u32,
}

impl LoanView {
    pub fn new(loan: Loan, borrower: Borrower, due_status: DueStatus) -> Self {
        LoanView {
            id: loan.id,
            status: loan.status,
            due_status,
            borrower,
            amounts: AmountsView {
                total_principal: loan.total_principal,
                current_due_amount: loan.current_due_amount,
                installment_amount: loan.installment_amount,
                interest_rate: loan.interest_rate,
                principal_repaid: loan.principal_repaid(),
                suggested_payment: loan.suggested_payment(),
            },
            schedule: ScheduleView {
                created_at: loan.created_at,
                next_due_date: loan.next_due_date,
                paid_installments_count: loan.paid_installments_count,
                missed_installments_count: loan.missed_installments_count,
                remaining_installments: loan.remaining_installments(),
            },
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// dashboard figures over active loans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub active_loans: usize,
    /// distinct borrowers holding an active loan
    pub borrowers: usize,
    pub total_outstanding: Money,
    pub overdue_count: usize,
    pub upcoming_count: usize,
}

impl PortfolioSummary {
    /// inactive loans in the input are ignored
    pub fn from_loans(loans: &[LoanWithBorrower]) -> Self {
        let active: Vec<&LoanWithBorrower> = loans.iter().filter(|l| l.loan.is_active()).collect();
        let borrowers: HashSet<_> = active.iter().map(|l| l.loan.borrower_id).collect();

        PortfolioSummary {
            active_loans: active.len(),
            borrowers: borrowers.len(),
            total_outstanding: active.iter().map(|l| l.loan.current_due_amount).sum(),
            overdue_count: active.iter().filter(|l| l.due_status == DueStatus::Overdue).count(),
            upcoming_count: active.iter().filter(|l| l.due_status == DueStatus::Upcoming).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{LoanTerms, NewBorrower};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 8, 30, 0).unwrap()
    }

    fn joined(borrower: &Borrower, due: i64, status: LoanStatus, due_status: DueStatus) -> LoanWithBorrower {
        let terms = LoanTerms::new(Money::from_major(due), Money::from_major(100), Rate::from_percentage(2));
        let mut loan = Loan::originate(borrower.id, &terms, now()).unwrap();
        loan.status = status;
        LoanWithBorrower {
            loan,
            borrower: borrower.clone(),
            due_status,
        }
    }

    #[test]
    fn test_summary_counts_active_only() {
        let ravi = Borrower::register(NewBorrower::new("Ravi", "9000000001"), now()).unwrap();
        let sita = Borrower::register(NewBorrower::new("Sita", "9000000002"), now()).unwrap();

        let loans = vec![
            joined(&ravi, 1_000, LoanStatus::Active, DueStatus::Overdue),
            joined(&ravi, 500, LoanStatus::Active, DueStatus::Upcoming),
            joined(&sita, 2_000, LoanStatus::Completed, DueStatus::Overdue),
            joined(&sita, 700, LoanStatus::Defaulted, DueStatus::Overdue),
        ];

        let summary = PortfolioSummary::from_loans(&loans);
        assert_eq!(summary.active_loans, 2);
        assert_eq!(summary.borrowers, 1);
        assert_eq!(summary.total_outstanding, Money::from_major(1_500));
        assert_eq!(summary.overdue_count, 1);
        assert_eq!(summary.upcoming_count, 1);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(PortfolioSummary::from_loans(&[]), PortfolioSummary::default());
    }

    #[test]
    fn test_loan_view_json() {
        let borrower = Borrower::register(NewBorrower::new("Ravi", "9000000001"), now()).unwrap();
        let terms = LoanTerms::new(Money::from_major(1_000), Money::from_major(300), Rate::from_percentage(2));
        let mut loan = Loan::originate(borrower.id, &terms, now()).unwrap();
        loan.current_due_amount = Money::from_major(700);

        let view = LoanView::new(loan, borrower, DueStatus::Normal);
        assert_eq!(view.amounts.principal_repaid, Money::from_major(300));
        assert_eq!(view.schedule.remaining_installments, 3);

        let json: serde_json::Value = serde_json::from_str(&view.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["due_status"], "normal");
        assert_eq!(json["status"], "active");
        assert_eq!(json["borrower"]["name"], "Ravi");
        assert_eq!(json["amounts"]["current_due_amount"], "700");
    }
}

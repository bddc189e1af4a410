use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::loan::{Loan, LoanPatch};
use crate::schedule;

/// penalty configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyConfig {
    /// rate charged per missed period when the loan carries no positive rate
    pub default_penalty_rate: Rate,
}

impl PenaltyConfig {
    pub fn new(default_penalty_rate: Rate) -> Self {
        Self { default_penalty_rate }
    }

    /// the loan's own rate when positive, otherwise the default
    pub fn effective_penalty_rate(&self, loan_rate: Rate) -> Rate {
        if loan_rate.is_positive() {
            loan_rate
        } else {
            self.default_penalty_rate
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.default_penalty_rate.is_positive() {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("default penalty rate must be positive, got {}", self.default_penalty_rate),
            });
        }
        Ok(())
    }
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self::new(Rate::from_decimal(dec!(0.02)))
    }
}

/// outcome of running the engine against one loan snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualResult {
    pub should_apply: bool,
    pub new_due_amount: Money,
    pub penalty_amount: Money,
    pub new_missed_count: u32,
    pub new_next_due_date: DateTime<Utc>,
    pub missed_periods: u32,
    /// per-period penalties, oldest period first
    pub period_penalties: Vec<Money>,
}

impl AccrualResult {
    fn no_op(loan: &Loan) -> Self {
        Self {
            should_apply: false,
            new_due_amount: loan.current_due_amount,
            penalty_amount: Money::ZERO,
            new_missed_count: loan.missed_installments_count,
            new_next_due_date: loan.next_due_date,
            missed_periods: 0,
            period_penalties: Vec::new(),
        }
    }

    /// the partial update to persist, `None` for a no-op
    pub fn to_patch(&self) -> Option<LoanPatch> {
        if !self.should_apply {
            return None;
        }
        Some(LoanPatch {
            current_due_amount: Some(self.new_due_amount),
            missed_installments_count: Some(self.new_missed_count),
            next_due_date: Some(self.new_next_due_date),
            ..LoanPatch::default()
        })
    }

    /// the loan snapshot after this result is applied
    pub fn apply_to(&self, loan: &Loan) -> Loan {
        let mut next = loan.clone();
        if let Some(patch) = self.to_patch() {
            patch.apply(&mut next);
        }
        next
    }
}

/// engine for overdue penalty accrual on weekly installment loans
#[derive(Debug, Clone, Default)]
pub struct PenaltyEngine {
    pub config: PenaltyConfig,
}

impl PenaltyEngine {
    pub fn new(config: PenaltyConfig) -> Self {
        Self { config }
    }

    /// decide whether the loan is overdue by whole periods and compound the penalty
    ///
    /// Only active loans strictly past their due date by at least one full
    /// period accrue. Each missed period charges `round(due * rate)` on the
    /// running due, rounded to whole units per period. The due date moves
    /// forward by exactly the missed periods, anchored on the old due date,
    /// so calling again with the same `now` is a no-op.
    pub fn accrue(&self, loan: &Loan, now: DateTime<Utc>) -> AccrualResult {
        if !loan.is_active() || now <= loan.next_due_date {
            return AccrualResult::no_op(loan);
        }

        let missed_periods = schedule::whole_periods_between(loan.next_due_date, now);
        if missed_periods == 0 {
            return AccrualResult::no_op(loan);
        }

        let rate = self.config.effective_penalty_rate(loan.interest_rate);
        let (new_due_amount, period_penalties) = compound(loan.current_due_amount, rate, missed_periods);
        let penalty_amount: Money = period_penalties.iter().copied().sum();

        AccrualResult {
            should_apply: true,
            new_due_amount,
            penalty_amount,
            new_missed_count: loan.missed_installments_count.saturating_add(missed_periods),
            new_next_due_date: schedule::advance_periods(loan.next_due_date, missed_periods),
            missed_periods,
            period_penalties,
        }
    }
}

/// compound `periods` times, rounding each period's penalty to whole units
///
/// The due saturates at `Money::MAX`; periods past the cap charge nothing.
fn compound(due: Money, rate: Rate, periods: u32) -> (Money, Vec<Money>) {
    let mut current = due;
    let mut penalties = Vec::with_capacity(periods as usize);

    for _ in 0..periods {
        let next = current.saturating_add(current.apply_rate(rate).round_to_unit());
        penalties.push(next - current);
        current = next;
    }

    (current, penalties)
}

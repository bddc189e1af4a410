use std::sync::Arc;

use chrono::{DateTime, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::interest::{AccrualResult, PenaltyEngine};
use crate::loan::{Borrower, BorrowerEdit, Loan, LoanEdit, LoanPatch, LoanTerms, NewBorrower};
use crate::payments::{self, Transaction};
use crate::status::DueStatusClassifier;
use crate::store::{LoanFilter, LoanStore, Versioned};
use crate::types::{BorrowerId, DueStatus, LoanId, LoanStatus};
use crate::view::{LoanView, LoanWithBorrower, PortfolioSummary};

/// result of a recorded payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub loan: Loan,
    pub transaction: Transaction,
}

impl PaymentReceipt {
    pub fn is_settled(&self) -> bool {
        self.loan.status == LoanStatus::Completed
    }
}

/// ledger service: runs the accrual and payment rules against a store
///
/// Every mutation re-reads the loan, computes from that snapshot and writes
/// back conditioned on the version it read.
pub struct Ledger<S: LoanStore> {
    store: Arc<S>,
    time: SafeTimeProvider,
    config: LedgerConfig,
    engine: PenaltyEngine,
    classifier: DueStatusClassifier,
    events: EventStore,
}

impl<S: LoanStore> Ledger<S> {
    pub fn new(store: Arc<S>, config: LedgerConfig, time: SafeTimeProvider) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            store,
            time,
            engine: PenaltyEngine::new(config.penalty.clone()),
            classifier: config.classifier(),
            config,
            events: EventStore::new(),
        })
    }

    /// ledger on system time
    pub fn with_system_time(store: Arc<S>, config: LedgerConfig) -> Result<Self> {
        Self::new(store, config, SafeTimeProvider::new(TimeSource::System))
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.time.now()
    }

    // borrowers

    pub fn add_borrower(&mut self, new: NewBorrower) -> Result<Borrower> {
        let now = self.now();
        let borrower = Borrower::register(new, now)?;
        self.store.insert_borrower(borrower.clone())?;

        info!("borrower {} registered", borrower.id);
        self.events.emit(Event::BorrowerRegistered {
            borrower_id: borrower.id,
            timestamp: now,
        });

        Ok(borrower)
    }

    pub fn borrower(&self, id: BorrowerId) -> Result<Borrower> {
        self.store.borrower(id)?.ok_or(LedgerError::BorrowerNotFound { id })
    }

    pub fn edit_borrower(&mut self, id: BorrowerId, edit: BorrowerEdit) -> Result<Borrower> {
        let mut borrower = self.borrower(id)?;
        borrower.apply_edit(&edit)?;
        self.store.update_borrower(borrower.clone())?;

        self.events.emit(Event::BorrowerUpdated {
            borrower_id: id,
            timestamp: self.now(),
        });

        Ok(borrower)
    }

    /// delete a borrower with all of their loans and transactions
    pub fn delete_borrower(&mut self, id: BorrowerId) -> Result<usize> {
        // resolve first so an unknown id deletes nothing
        self.borrower(id)?;

        let loans = self.store.loans(LoanFilter::borrower(id))?;
        for loan in &loans {
            self.delete_loan(loan.value.id)?;
        }
        self.store.delete_borrower(id)?;

        info!("borrower {} deleted with {} loan(s)", id, loans.len());
        self.events.emit(Event::BorrowerDeleted {
            borrower_id: id,
            loans_deleted: loans.len(),
            timestamp: self.now(),
        });

        Ok(loans.len())
    }

    // loans

    pub fn originate_loan(&mut self, borrower_id: BorrowerId, terms: LoanTerms) -> Result<Loan> {
        self.borrower(borrower_id)?;

        let now = self.now();
        let loan = Loan::originate(borrower_id, &terms, now)?;
        let stored = self.store.insert_loan(loan)?;
        let loan = stored.value;

        info!(
            "loan {} originated for borrower {}: principal {}, hafta {}",
            loan.id, borrower_id, loan.total_principal, loan.installment_amount
        );
        self.events.emit(Event::LoanOriginated {
            loan_id: loan.id,
            borrower_id,
            principal: loan.total_principal,
            installment_amount: loan.installment_amount,
            first_due_date: loan.next_due_date,
            timestamp: now,
        });

        Ok(loan)
    }

    pub fn loan(&self, id: LoanId) -> Result<Loan> {
        Ok(self.versioned(id)?.value)
    }

    fn versioned(&self, id: LoanId) -> Result<Versioned<Loan>> {
        self.store.loan(id)?.ok_or(LedgerError::LoanNotFound { id })
    }

    pub fn edit_loan(&mut self, id: LoanId, edit: LoanEdit) -> Result<Loan> {
        edit.validate()?;
        let current = self.versioned(id)?;
        if edit.is_empty() {
            return Ok(current.value);
        }

        let updated = self.store.update_loan(id, current.version, &edit.to_patch())?;

        info!("loan {} edited", id);
        self.events.emit(Event::LoanEdited {
            loan_id: id,
            timestamp: self.now(),
        });

        Ok(updated.value)
    }

    /// flip active to completed; anything else goes back to active
    pub fn toggle_status(&mut self, id: LoanId) -> Result<LoanStatus> {
        let current = self.versioned(id)?;
        let new_status = match current.value.status {
            LoanStatus::Active => LoanStatus::Completed,
            LoanStatus::Completed | LoanStatus::Defaulted => LoanStatus::Active,
        };
        self.change_status(current, new_status, "toggled by admin")?;
        Ok(new_status)
    }

    pub fn mark_defaulted(&mut self, id: LoanId) -> Result<Loan> {
        let current = self.versioned(id)?;
        if current.value.status == LoanStatus::Defaulted {
            return Ok(current.value);
        }
        self.change_status(current, LoanStatus::Defaulted, "marked defaulted by admin")
    }

    fn change_status(&mut self, current: Versioned<Loan>, new_status: LoanStatus, reason: &str) -> Result<Loan> {
        let id = current.value.id;
        let old_status = current.value.status;
        let updated = self.store.update_loan(id, current.version, &LoanPatch::status(new_status))?;

        info!("loan {} status {} -> {}", id, old_status, new_status);
        self.events.emit(Event::StatusChanged {
            loan_id: id,
            old_status,
            new_status,
            reason: reason.to_string(),
            timestamp: self.now(),
        });

        Ok(updated.value)
    }

    /// delete a loan and all of its transactions
    pub fn delete_loan(&mut self, id: LoanId) -> Result<usize> {
        let transactions_deleted = self.store.delete_loan(id)?;

        info!("loan {} deleted with {} transaction(s)", id, transactions_deleted);
        self.events.emit(Event::LoanDeleted {
            loan_id: id,
            transactions_deleted,
            timestamp: self.now(),
        });

        Ok(transactions_deleted)
    }

    // penalties

    /// run the penalty engine against the latest snapshot of one loan
    pub fn apply_penalty(&mut self, id: LoanId) -> Result<AccrualResult> {
        let current = self.versioned(id)?;
        let now = self.now();
        let result = self.engine.accrue(&current.value, now);

        let Some(patch) = result.to_patch() else {
            debug!("loan {} not due for penalty at {}", id, now);
            return Ok(result);
        };

        self.store.update_loan(id, current.version, &patch)?;

        info!(
            "penalty {} applied to loan {} for {} missed period(s), due now {}",
            result.penalty_amount, id, result.missed_periods, result.new_due_amount
        );
        self.events.emit(Event::PenaltyApplied {
            loan_id: id,
            missed_periods: result.missed_periods,
            penalty_amount: result.penalty_amount,
            new_due_amount: result.new_due_amount,
            next_due_date: result.new_next_due_date,
            timestamp: now,
        });

        Ok(result)
    }

    /// apply penalties across all active loans, returning those that changed
    ///
    /// A loan that changed underneath us is skipped; the next refresh picks it up.
    pub fn refresh_penalties(&mut self) -> Result<Vec<(LoanId, AccrualResult)>> {
        let mut applied = Vec::new();

        for loan in self.store.loans(LoanFilter::active())? {
            let id = loan.value.id;
            match self.apply_penalty(id) {
                Ok(result) if result.should_apply => applied.push((id, result)),
                Ok(_) => {}
                Err(err @ (LedgerError::StaleSnapshot { .. } | LedgerError::LoanNotFound { .. })) => {
                    warn!("skipping penalty for loan {}: {}", id, err);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(applied)
    }

    // payments

    /// record a payment: the transaction and the loan update commit together
    pub fn record_payment(&mut self, id: LoanId, amount: Money) -> Result<PaymentReceipt> {
        let current = self.versioned(id)?;
        let application = payments::apply_payment(&current.value, amount)?;

        let now = self.now();
        let transaction = Transaction::new(id, amount, now);
        let committed = self
            .store
            .commit_payment(id, current.version, &application.to_patch(), transaction.clone())?;
        let loan = committed.value;

        info!("payment {} recorded for loan {}, remaining due {}", amount, id, loan.current_due_amount);
        self.events.emit(Event::PaymentReceived {
            loan_id: id,
            transaction_id: transaction.id,
            amount,
            remaining_due: loan.current_due_amount,
            next_due_date: loan.next_due_date,
            timestamp: now,
        });

        if application.is_settled() {
            info!("loan {} completed", id);
            self.events.emit(Event::LoanCompleted {
                loan_id: id,
                final_payment: amount,
                timestamp: now,
            });
        }

        Ok(PaymentReceipt { loan, transaction })
    }

    /// default amount to offer for the next payment
    pub fn suggested_payment(&self, id: LoanId) -> Result<Money> {
        Ok(self.loan(id)?.suggested_payment())
    }

    pub fn transactions(&self, id: LoanId) -> Result<Vec<Transaction>> {
        self.versioned(id)?;
        self.store.transactions_for(id)
    }

    // queries

    pub fn due_status(&self, id: LoanId) -> Result<DueStatus> {
        let loan = self.loan(id)?;
        Ok(self.classify(&loan))
    }

    fn classify(&self, loan: &Loan) -> DueStatus {
        self.classifier.classify(self.now(), loan.next_due_date)
    }

    pub fn loan_view(&self, id: LoanId) -> Result<LoanView> {
        let loan = self.loan(id)?;
        let borrower = self.borrower_or_unknown(loan.borrower_id)?;
        let due_status = self.classify(&loan);
        Ok(LoanView::new(loan, borrower, due_status))
    }

    fn borrower_or_unknown(&self, id: BorrowerId) -> Result<Borrower> {
        Ok(self.store.borrower(id)?.unwrap_or_else(|| Borrower::unknown(id)))
    }

    /// active loans joined with their borrower
    pub fn active_loans(&self) -> Result<Vec<LoanWithBorrower>> {
        self.store
            .loans(LoanFilter::active())?
            .into_iter()
            .map(|stored| {
                let loan = stored.into_inner();
                let borrower = self.borrower_or_unknown(loan.borrower_id)?;
                let due_status = self.classify(&loan);
                Ok(LoanWithBorrower {
                    loan,
                    borrower,
                    due_status,
                })
            })
            .collect()
    }

    /// active loans whose borrower name or mobile number matches
    pub fn search_active(&self, query: &str) -> Result<Vec<LoanWithBorrower>> {
        Ok(self
            .active_loans()?
            .into_iter()
            .filter(|l| l.borrower.matches(query))
            .collect())
    }

    /// every loan of one borrower, in origination order
    pub fn borrower_loans(&self, borrower_id: BorrowerId) -> Result<Vec<Loan>> {
        Ok(self
            .store
            .loans(LoanFilter::borrower(borrower_id))?
            .into_iter()
            .map(Versioned::into_inner)
            .collect())
    }

    pub fn portfolio_summary(&self) -> Result<PortfolioSummary> {
        let loans = self.active_loans()?;
        Ok(PortfolioSummary::from_loans(&loans))
    }

    // events

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}

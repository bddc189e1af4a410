pub mod memory;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::loan::{Borrower, Loan, LoanPatch};
use crate::payments::Transaction;
use crate::types::{BorrowerId, LoanId, LoanStatus};

pub use memory::InMemoryStore;

/// a stored value together with the revision it was read at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

impl<T> Versioned<T> {
    pub fn new(value: T, version: u64) -> Self {
        Self { value, version }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// loan query filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoanFilter {
    pub status: Option<LoanStatus>,
    pub borrower_id: Option<BorrowerId>,
}

impl LoanFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn active() -> Self {
        Self {
            status: Some(LoanStatus::Active),
            borrower_id: None,
        }
    }

    pub fn borrower(borrower_id: BorrowerId) -> Self {
        Self {
            status: None,
            borrower_id: Some(borrower_id),
        }
    }

    pub fn matches(&self, loan: &Loan) -> bool {
        self.status.map_or(true, |s| loan.status == s)
            && self.borrower_id.map_or(true, |b| loan.borrower_id == b)
    }
}

/// storage collaborator for borrowers, loans and transactions
///
/// Loan writes are conditioned on the version the caller read. An
/// implementation must reject a write whose `expected_version` is not the
/// current one with `LedgerError::StaleSnapshot` and leave the loan
/// untouched. `commit_payment` must write the patch and the transaction
/// together or not at all.
pub trait LoanStore: Send + Sync {
    fn insert_borrower(&self, borrower: Borrower) -> Result<()>;

    fn borrower(&self, id: BorrowerId) -> Result<Option<Borrower>>;

    fn update_borrower(&self, borrower: Borrower) -> Result<()>;

    fn delete_borrower(&self, id: BorrowerId) -> Result<()>;

    fn insert_loan(&self, loan: Loan) -> Result<Versioned<Loan>>;

    fn loan(&self, id: LoanId) -> Result<Option<Versioned<Loan>>>;

    fn loans(&self, filter: LoanFilter) -> Result<Vec<Versioned<Loan>>>;

    fn update_loan(&self, id: LoanId, expected_version: u64, patch: &LoanPatch) -> Result<Versioned<Loan>>;

    /// delete a loan and its transactions, returning how many transactions went
    fn delete_loan(&self, id: LoanId) -> Result<usize>;

    fn commit_payment(
        &self,
        id: LoanId,
        expected_version: u64,
        patch: &LoanPatch,
        transaction: Transaction,
    ) -> Result<Versioned<Loan>>;

    /// transactions of one loan, newest first
    fn transactions_for(&self, loan_id: LoanId) -> Result<Vec<Transaction>>;
}

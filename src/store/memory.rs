use std::collections::HashMap;

use log::debug;
use parking_lot::RwLock;

use crate::errors::{LedgerError, Result};
use crate::loan::{Borrower, Loan, LoanPatch};
use crate::payments::transaction::{sort_newest_first, Transaction};
use crate::store::{LoanFilter, LoanStore, Versioned};
use crate::types::{BorrowerId, LoanId};

#[derive(Debug, Default)]
struct Tables {
    borrowers: HashMap<BorrowerId, Borrower>,
    loans: HashMap<LoanId, Versioned<Loan>>,
    transactions: Vec<Transaction>,
}

impl Tables {
    fn checked_loan_mut(&mut self, id: LoanId, expected_version: u64) -> Result<&mut Versioned<Loan>> {
        let current = self.loans.get_mut(&id).ok_or(LedgerError::LoanNotFound { id })?;
        if current.version != expected_version {
            return Err(LedgerError::StaleSnapshot {
                loan_id: id,
                expected: expected_version,
                found: current.version,
            });
        }
        Ok(current)
    }
}

/// in-process store; one lock guards all tables so multi-table writes are atomic
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transaction_count(&self) -> usize {
        self.tables.read().transactions.len()
    }
}

impl LoanStore for InMemoryStore {
    fn insert_borrower(&self, borrower: Borrower) -> Result<()> {
        self.tables.write().borrowers.insert(borrower.id, borrower);
        Ok(())
    }

    fn borrower(&self, id: BorrowerId) -> Result<Option<Borrower>> {
        Ok(self.tables.read().borrowers.get(&id).cloned())
    }

    fn update_borrower(&self, borrower: Borrower) -> Result<()> {
        let mut tables = self.tables.write();
        let slot = tables
            .borrowers
            .get_mut(&borrower.id)
            .ok_or(LedgerError::BorrowerNotFound { id: borrower.id })?;
        *slot = borrower;
        Ok(())
    }

    fn delete_borrower(&self, id: BorrowerId) -> Result<()> {
        self.tables
            .write()
            .borrowers
            .remove(&id)
            .map(|_| ())
            .ok_or(LedgerError::BorrowerNotFound { id })
    }

    fn insert_loan(&self, loan: Loan) -> Result<Versioned<Loan>> {
        let stored = Versioned::new(loan, 1);
        self.tables.write().loans.insert(stored.value.id, stored.clone());
        Ok(stored)
    }

    fn loan(&self, id: LoanId) -> Result<Option<Versioned<Loan>>> {
        Ok(self.tables.read().loans.get(&id).cloned())
    }

    fn loans(&self, filter: LoanFilter) -> Result<Vec<Versioned<Loan>>> {
        let tables = self.tables.read();
        let mut loans: Vec<Versioned<Loan>> = tables
            .loans
            .values()
            .filter(|l| filter.matches(&l.value))
            .cloned()
            .collect();
        loans.sort_by(|a, b| a.value.created_at.cmp(&b.value.created_at).then_with(|| a.value.id.cmp(&b.value.id)));
        Ok(loans)
    }

    fn update_loan(&self, id: LoanId, expected_version: u64, patch: &LoanPatch) -> Result<Versioned<Loan>> {
        let mut tables = self.tables.write();
        let current = tables.checked_loan_mut(id, expected_version)?;

        patch.apply(&mut current.value);
        current.version += 1;
        debug!("loan {} updated to version {}", id, current.version);

        Ok(current.clone())
    }

    fn delete_loan(&self, id: LoanId) -> Result<usize> {
        let mut tables = self.tables.write();
        if tables.loans.remove(&id).is_none() {
            return Err(LedgerError::LoanNotFound { id });
        }

        let before = tables.transactions.len();
        tables.transactions.retain(|t| t.loan_id != id);
        Ok(before - tables.transactions.len())
    }

    fn commit_payment(
        &self,
        id: LoanId,
        expected_version: u64,
        patch: &LoanPatch,
        transaction: Transaction,
    ) -> Result<Versioned<Loan>> {
        let mut tables = self.tables.write();
        let current = tables.checked_loan_mut(id, expected_version)?;

        patch.apply(&mut current.value);
        current.version += 1;
        let committed = current.clone();

        debug!("payment {} committed for loan {} at version {}", transaction.id, id, committed.version);
        tables.transactions.push(transaction);

        Ok(committed)
    }

    fn transactions_for(&self, loan_id: LoanId) -> Result<Vec<Transaction>> {
        let mut txs: Vec<Transaction> = self
            .tables
            .read()
            .transactions
            .iter()
            .filter(|t| t.loan_id == loan_id)
            .cloned()
            .collect();
        sort_newest_first(&mut txs);
        Ok(txs)
    }
}

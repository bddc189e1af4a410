use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{LoanId, TransactionId};

/// immutable record of one received payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub loan_id: LoanId,
    pub amount_paid: Money,
    pub date: DateTime<Utc>,
}

impl Transaction {
    pub fn new(loan_id: LoanId, amount_paid: Money, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            amount_paid,
            date,
        }
    }
}

/// newest first, ties broken by id for a stable order
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}

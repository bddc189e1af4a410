use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{BorrowerId, LoanId, LoanStatus, TransactionId};

/// all events that can be emitted by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // borrower events
    BorrowerRegistered {
        borrower_id: BorrowerId,
        timestamp: DateTime<Utc>,
    },
    BorrowerUpdated {
        borrower_id: BorrowerId,
        timestamp: DateTime<Utc>,
    },
    BorrowerDeleted {
        borrower_id: BorrowerId,
        loans_deleted: usize,
        timestamp: DateTime<Utc>,
    },

    // lifecycle events
    LoanOriginated {
        loan_id: LoanId,
        borrower_id: BorrowerId,
        principal: Money,
        installment_amount: Money,
        first_due_date: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    LoanEdited {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    LoanCompleted {
        loan_id: LoanId,
        final_payment: Money,
        timestamp: DateTime<Utc>,
    },
    LoanDeleted {
        loan_id: LoanId,
        transactions_deleted: usize,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentReceived {
        loan_id: LoanId,
        transaction_id: TransactionId,
        amount: Money,
        remaining_due: Money,
        next_due_date: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    // penalty events
    PenaltyApplied {
        loan_id: LoanId,
        missed_periods: u32,
        penalty_amount: Money,
        new_due_amount: Money,
        next_due_date: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    /// loan the event concerns, if any
    pub fn loan_id(&self) -> Option<LoanId> {
        match self {
            Event::LoanOriginated { loan_id, .. }
            | Event::LoanEdited { loan_id, .. }
            | Event::LoanCompleted { loan_id, .. }
            | Event::LoanDeleted { loan_id, .. }
            | Event::StatusChanged { loan_id, .. }
            | Event::PaymentReceived { loan_id, .. }
            | Event::PenaltyApplied { loan_id, .. } => Some(*loan_id),
            Event::BorrowerRegistered { .. }
            | Event::BorrowerUpdated { .. }
            | Event::BorrowerDeleted { .. } => None,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_take_events_drains() {
        let mut store = EventStore::new();
        let loan_id = Uuid::new_v4();

        store.emit(Event::LoanEdited {
            loan_id,
            timestamp: Utc::now(),
        });
        assert_eq!(store.events().len(), 1);
        assert_eq!(store.events()[0].loan_id(), Some(loan_id));

        let taken = store.take_events();
        assert_eq!(taken.len(), 1);
        assert!(store.events().is_empty());
    }

    #[test]
    fn test_event_json_shape() {
        let event = Event::BorrowerRegistered {
            borrower_id: Uuid::nil(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("BorrowerRegistered").is_some());
        assert_eq!(event.loan_id(), None);
    }
}

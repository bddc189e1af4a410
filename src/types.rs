use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a borrower
pub type BorrowerId = Uuid;

/// unique identifier for a payment transaction
pub type TransactionId = Uuid;

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// loan open, installments being collected, penalties accrue
    Active,
    /// due amount fully paid (or closed by an admin)
    Completed,
    /// written off by an admin, never set by accrual
    Defaulted,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Completed => "completed",
            LoanStatus::Defaulted => "defaulted",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// due status of the next installment, consumed by badges and reminders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueStatus {
    Overdue,
    Upcoming,
    Normal,
}

impl DueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DueStatus::Overdue => "overdue",
            DueStatus::Upcoming => "upcoming",
            DueStatus::Normal => "normal",
        }
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&LoanStatus::Active).unwrap(), "\"active\"");
        assert_eq!(serde_json::to_string(&DueStatus::Upcoming).unwrap(), "\"upcoming\"");

        let status: LoanStatus = serde_json::from_str("\"defaulted\"").unwrap();
        assert_eq!(status, LoanStatus::Defaulted);
        assert_eq!(DueStatus::Overdue.to_string(), "overdue");
    }
}

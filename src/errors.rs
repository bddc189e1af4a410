use thiserror::Error;

use crate::decimal::Money;
use crate::types::{BorrowerId, LoanId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("invalid payment amount: {amount} (current due {current_due})")]
    InvalidAmount {
        amount: Money,
        current_due: Money,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("borrower not found: {id}")]
    BorrowerNotFound {
        id: BorrowerId,
    },

    #[error("stale snapshot for loan {loan_id}: expected version {expected}, found {found}")]
    StaleSnapshot {
        loan_id: LoanId,
        expected: u64,
        found: u64,
    },

    #[error("invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("serialization failed: {message}")]
    Serialization {
        message: String,
    },
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Serialization {
            message: e.to_string(),
        }
    }
}

impl LedgerError {
    pub(crate) fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        LedgerError::InvalidInput {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_errors_map_to_serialization() {
        let err: LedgerError = serde_json::from_str::<u8>("not a number").unwrap_err().into();
        assert!(matches!(err, LedgerError::Serialization { .. }));
        assert!(err.to_string().starts_with("serialization failed"));
    }
}

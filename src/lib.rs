pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod ledger;
pub mod loan;
pub mod payments;
pub mod schedule;
pub mod status;
pub mod store;
pub mod types;
pub mod view;

// re-export key types
pub use config::LedgerConfig;
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use interest::{AccrualResult, PenaltyConfig, PenaltyEngine};
pub use ledger::{Ledger, PaymentReceipt};
pub use loan::{Borrower, BorrowerEdit, Loan, LoanEdit, LoanPatch, LoanTerms, NewBorrower};
pub use payments::{apply_payment, PaymentApplication, Transaction};
pub use status::DueStatusClassifier;
pub use store::{InMemoryStore, LoanFilter, LoanStore, Versioned};
pub use types::{BorrowerId, DueStatus, LoanId, LoanStatus, TransactionId};
pub use view::{LoanView, LoanWithBorrower, PortfolioSummary};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;

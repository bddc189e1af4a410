pub mod penalty;

pub use penalty::{AccrualResult, PenaltyConfig, PenaltyEngine};

//! Loan request data structures and offer loading

mod data;
mod payload;
pub mod loader;

pub use data::{LoanRequest, LoanStructure, MAX_TERM_YEARS};
pub use payload::{parse_start_date, LoanPayload, RateList, DATE_FORMAT};
pub use loader::{load_offers, load_offers_from_reader};

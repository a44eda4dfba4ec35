//! Loan Engine - amortization and financial analysis for consumer loans
//!
//! This library provides:
//! - Amortization schedules for fixed, variable, interest-only and balloon loans
//! - True APR solving with upfront fees
//! - Offer comparison, rate sensitivity and prepayment planning
//! - Refinance, affordability and tax estimates

pub mod error;
pub mod config;
pub mod loan;
pub mod schedule;
pub mod analysis;
pub mod calculator;
pub mod api;

// Re-export commonly used types
pub use error::{LoanError, Result};
pub use config::EngineConfig;
pub use loan::{LoanPayload, LoanRequest, LoanStructure};
pub use schedule::{generate, summarize, AprSolver, Schedule, ScheduleRow, Summary};
pub use calculator::LoanCalculator;

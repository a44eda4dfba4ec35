//! Amortization schedules, APR and summary statistics

mod state;
mod rows;
mod engine;
mod apr;
mod summary;
pub mod visualization;

pub use state::{monthly_rate, period_date, AmortizationState, PeriodStep};
pub use rows::{Schedule, ScheduleRow};
pub use engine::{amortizing_payment, balloon_installment, generate};
pub use apr::AprSolver;
pub use summary::{apr_or_nominal, summarize, AprOutcome, Summary};
pub use visualization::Visualization;

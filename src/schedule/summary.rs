//! Aggregate statistics for a generated schedule

use log::warn;
use serde::{Deserialize, Serialize};

use crate::loan::{LoanRequest, LoanStructure};
use super::apr::AprSolver;
use super::rows::Schedule;

/// Summary of a schedule
///
/// Payment fields are filled according to the loan structure; the others are
/// left out of the serialized output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_paid: f64,
    pub total_interest: f64,
    /// Effective annual rate in percent
    pub apr: f64,
    /// Set when the APR fell back to the nominal rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apr_note: Option<String>,
    pub total_months: u32,
    pub principal: f64,
    pub fees: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_payment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_only_payment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amortizing_payment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balloon_payment: Option<f64>,
}

impl Summary {
    /// The payment a borrower would quote for this loan
    ///
    /// Falls back through the structure-specific fields; interest-only loans
    /// quote their opening interest-only payment.
    pub fn headline_payment(&self) -> f64 {
        self.monthly_payment
            .or(self.average_payment)
            .or(self.interest_only_payment)
            .or(self.amortizing_payment)
            .unwrap_or(0.0)
    }
}

/// Effective APR with the nominal-rate fallback applied
#[derive(Debug, Clone, PartialEq)]
pub struct AprOutcome {
    pub apr: f64,
    pub note: Option<String>,
}

/// Solve the APR, reporting the nominal rate if the solver gives up
pub fn apr_or_nominal(solver: &AprSolver, principal: f64, nominal_rate: f64, term_years: f64, fees: f64) -> AprOutcome {
    match solver.solve(principal, nominal_rate, term_years, fees) {
        Ok(apr) => AprOutcome { apr, note: None },
        Err(e) => {
            warn!("APR fallback to nominal rate {}: {}", nominal_rate, e);
            AprOutcome {
                apr: nominal_rate,
                note: Some(format!("{}; reporting the nominal rate instead", e)),
            }
        }
    }
}

/// Mean monthly payment over every row but the last
///
/// Rows may cover several months, so the mean is weighted by months. A
/// single-row schedule falls back to that row.
fn average_monthly_payment(schedule: &Schedule) -> f64 {
    let body = match schedule.rows.split_last() {
        Some((last, rest)) if rest.is_empty() => std::slice::from_ref(last),
        Some((_, rest)) => rest,
        None => return 0.0,
    };
    let paid: f64 = body.iter().map(|r| r.payment).sum();
    let months: u32 = body.iter().map(|r| r.months).sum();
    if months == 0 {
        0.0
    } else {
        paid / months as f64
    }
}

/// Summarize a schedule generated from `request`
pub fn summarize(schedule: &Schedule, request: &LoanRequest, solver: &AprSolver) -> Summary {
    let apr = apr_or_nominal(
        solver,
        request.principal,
        request.apr_base_rate(),
        request.term_years,
        request.fees,
    );
    let first_payment = schedule.first().map(|r| r.payment);

    let mut summary = Summary {
        total_paid: schedule.total_paid(),
        total_interest: schedule.total_interest(),
        apr: apr.apr,
        apr_note: apr.note,
        total_months: schedule.total_months(),
        principal: request.principal,
        fees: request.fees,
        monthly_payment: None,
        average_payment: None,
        interest_only_payment: None,
        amortizing_payment: None,
        balloon_payment: None,
    };

    match &request.structure {
        LoanStructure::Fixed { .. } => {
            summary.monthly_payment = first_payment;
        }
        LoanStructure::Variable { .. } => {
            summary.average_payment = Some(average_monthly_payment(schedule));
        }
        LoanStructure::InterestOnly { interest_only_years, .. } => {
            let io_months = (interest_only_years * 12) as usize;
            if io_months > 0 {
                summary.interest_only_payment = first_payment;
            }
            summary.amortizing_payment = schedule.rows.get(io_months).map(|r| r.payment);
            if io_months >= schedule.len() {
                summary.amortizing_payment = None;
            }
        }
        LoanStructure::Balloon { .. } => {
            summary.monthly_payment = first_payment;
            summary.average_payment = Some(average_monthly_payment(schedule));
            summary.balloon_payment = schedule.last().map(|r| r.balloon_payment);
        }
    }

    summary
}

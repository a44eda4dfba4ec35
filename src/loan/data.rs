//! Loan request data structures and per-structure validation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, LoanError, Result};

/// Longest term accepted, in years
pub const MAX_TERM_YEARS: f64 = 100.0;

/// Tolerance when checking that a term is a whole number of months
const MONTH_EPSILON: f64 = 1e-6;

/// Loan structure with its structure-specific fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoanStructure {
    /// Level payment over the whole term
    Fixed {
        /// Annual nominal rate in percent
        nominal_rate: f64,
    },
    /// One rate per year; the last rate repeats when the sequence is short
    Variable {
        rate_sequence: Vec<f64>,
    },
    /// Interest-only for the first years, then amortizing
    InterestOnly {
        nominal_rate: f64,
        interest_only_years: u32,
    },
    /// Amortizing with a lump sum due with the final payment
    Balloon {
        nominal_rate: f64,
        /// Percent of the original principal due at the end (0-100)
        balloon_percent: f64,
    },
}

impl LoanStructure {
    /// Wire name of the structure
    pub fn type_name(&self) -> &'static str {
        match self {
            LoanStructure::Fixed { .. } => "fixed",
            LoanStructure::Variable { .. } => "variable",
            LoanStructure::InterestOnly { .. } => "interest_only",
            LoanStructure::Balloon { .. } => "balloon",
        }
    }

    /// Whether the schedule has one row per year instead of one per month
    pub fn is_annual(&self) -> bool {
        matches!(self, LoanStructure::Variable { .. })
    }
}

/// Input to schedule generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    #[serde(flatten)]
    pub structure: LoanStructure,
    pub principal: f64,
    pub term_years: f64,
    #[serde(default)]
    pub fees: f64,
    #[serde(default)]
    pub start_date: NaiveDate,
}

impl LoanRequest {
    pub fn new(structure: LoanStructure, principal: f64, term_years: f64) -> Self {
        Self {
            structure,
            principal,
            term_years,
            fees: 0.0,
            start_date: NaiveDate::default(),
        }
    }

    /// Fixed-rate request with no fees, anchored at the default date
    pub fn fixed(principal: f64, nominal_rate: f64, term_years: f64) -> Self {
        Self::new(LoanStructure::Fixed { nominal_rate }, principal, term_years)
    }

    pub fn with_fees(mut self, fees: f64) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self
    }

    /// Rate used for the APR: the nominal rate, or the first-year rate for Variable
    pub fn apr_base_rate(&self) -> f64 {
        match &self.structure {
            LoanStructure::Fixed { nominal_rate }
            | LoanStructure::InterestOnly { nominal_rate, .. }
            | LoanStructure::Balloon { nominal_rate, .. } => *nominal_rate,
            LoanStructure::Variable { rate_sequence } => rate_sequence.first().copied().unwrap_or(0.0),
        }
    }

    /// Number of monthly periods covered by the loan
    ///
    /// Variable terms may be fractional and round to the nearest month; every
    /// other structure needs a whole number of months.
    pub fn total_months(&self) -> Result<u32> {
        let term = require_positive("years", self.term_years)?;
        if term > MAX_TERM_YEARS {
            return Err(LoanError::invalid(
                "years",
                format!("must not exceed {} years (got {})", MAX_TERM_YEARS, term),
            ));
        }

        let exact = term * 12.0;
        let months = exact.round();
        if !self.structure.is_annual() && (exact - months).abs() > MONTH_EPSILON {
            return Err(LoanError::invalid(
                "years",
                format!("must be a whole number of months (got {} years)", term),
            ));
        }
        if months < 1.0 {
            return Err(LoanError::invalid("years", "must cover at least one month"));
        }
        Ok(months as u32)
    }

    /// Validate every field the selected structure uses
    ///
    /// Fields belonging to other structures are not present in the variant and
    /// so are never checked.
    pub fn validate(&self) -> Result<()> {
        require_positive("principal", self.principal)?;
        require_non_negative("fees", self.fees)?;
        let months = self.total_months()?;

        match &self.structure {
            LoanStructure::Fixed { nominal_rate } => {
                require_non_negative("rate", *nominal_rate)?;
            }
            LoanStructure::Variable { rate_sequence } => {
                if rate_sequence.is_empty() {
                    return Err(LoanError::invalid("rates", "at least one rate must be provided"));
                }
                for rate in rate_sequence {
                    require_non_negative("rates", *rate)?;
                }
            }
            LoanStructure::InterestOnly { nominal_rate, interest_only_years } => {
                require_non_negative("rate", *nominal_rate)?;
                if u64::from(*interest_only_years) * 12 > u64::from(months) {
                    return Err(LoanError::invalid(
                        "interest_only_years",
                        format!(
                            "must not exceed the term ({} > {} years)",
                            interest_only_years, self.term_years
                        ),
                    ));
                }
            }
            LoanStructure::Balloon { nominal_rate, balloon_percent } => {
                require_non_negative("rate", *nominal_rate)?;
                let pct = require_non_negative("balloon", *balloon_percent)?;
                if pct > 100.0 {
                    return Err(LoanError::invalid(
                        "balloon",
                        format!("must be between 0 and 100 (got {})", pct),
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_months() {
        let request = LoanRequest::fixed(300_000.0, 6.0, 30.0);
        assert_eq!(request.total_months(), Ok(360));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_fractional_term_rules() {
        let fixed = LoanRequest::fixed(10_000.0, 5.0, 2.5);
        assert_eq!(fixed.total_months(), Ok(30));

        let odd = LoanRequest::fixed(10_000.0, 5.0, 2.51);
        assert!(odd.validate().is_err());

        let variable = LoanRequest::new(
            LoanStructure::Variable { rate_sequence: vec![4.0] },
            10_000.0,
            2.51,
        );
        assert_eq!(variable.total_months(), Ok(30));
    }

    #[test]
    fn test_rejects_bad_principal_and_term() {
        assert!(LoanRequest::fixed(0.0, 5.0, 30.0).validate().is_err());
        assert!(LoanRequest::fixed(-5.0, 5.0, 30.0).validate().is_err());
        assert!(LoanRequest::fixed(1000.0, 5.0, 0.0).validate().is_err());
        assert!(LoanRequest::fixed(1000.0, 5.0, 150.0).validate().is_err());
        assert!(LoanRequest::fixed(1000.0, -1.0, 10.0).validate().is_err());
    }

    #[test]
    fn test_structure_field_ranges() {
        let balloon = |pct| {
            LoanRequest::new(
                LoanStructure::Balloon { nominal_rate: 5.0, balloon_percent: pct },
                100_000.0,
                10.0,
            )
        };
        assert!(balloon(0.0).validate().is_ok());
        assert!(balloon(100.0).validate().is_ok());
        assert!(balloon(100.5).validate().is_err());

        let io = |years| {
            LoanRequest::new(
                LoanStructure::InterestOnly { nominal_rate: 5.0, interest_only_years: years },
                100_000.0,
                10.0,
            )
        };
        assert!(io(10).validate().is_ok());
        assert!(io(11).validate().is_err());

        let empty = LoanRequest::new(LoanStructure::Variable { rate_sequence: vec![] }, 1000.0, 5.0);
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_apr_base_rate() {
        let variable = LoanRequest::new(
            LoanStructure::Variable { rate_sequence: vec![3.5, 4.0] },
            1000.0,
            2.0,
        );
        assert_eq!(variable.apr_base_rate(), 3.5);
        assert_eq!(LoanRequest::fixed(1000.0, 6.0, 1.0).apr_base_rate(), 6.0);
    }
}

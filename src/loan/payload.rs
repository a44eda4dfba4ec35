//! Flat wire shape for loan requests
//!
//! Clients send every structure's fields side by side with a `type` tag. The
//! payload is converted into a [`LoanRequest`] by checking exactly the fields
//! the selected structure needs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::data::{LoanRequest, LoanStructure};
use crate::error::{LoanError, Result};

/// Date format accepted for `start_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Variable rates, either `"4, 4.5, 5"` or `[4, 4.5, 5]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateList {
    Values(Vec<f64>),
    Text(String),
}

impl RateList {
    pub fn parse(&self) -> Result<Vec<f64>> {
        match self {
            RateList::Values(values) => Ok(values.clone()),
            RateList::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<f64>()
                        .map_err(|_| LoanError::invalid("rates", format!("'{}' is not a number", s)))
                })
                .collect(),
        }
    }
}

/// Loan parameters as posted by a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanPayload {
    #[serde(rename = "type", default)]
    pub loan_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub principal: Option<f64>,
    #[serde(default)]
    pub years: Option<f64>,
    #[serde(default)]
    pub fees: Option<f64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub rates: Option<RateList>,
    #[serde(default)]
    pub interest_only_years: Option<f64>,
    #[serde(default)]
    pub balloon: Option<f64>,
}

fn required(field: &str, value: Option<f64>) -> Result<f64> {
    value.ok_or_else(|| LoanError::invalid(field, "is required"))
}

/// Parse `YYYY-MM-DD`; blank or missing dates resolve to `today`
pub fn parse_start_date(value: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match value.map(str::trim) {
        None | Some("") => Ok(today),
        Some(text) => NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| {
            LoanError::invalid("start_date", format!("'{}' is not a {} date: {}", text, DATE_FORMAT, e))
        }),
    }
}

impl LoanPayload {
    /// Structure tag, defaulting to fixed
    pub fn type_name(&self) -> &str {
        self.loan_type.as_deref().map(str::trim).filter(|t| !t.is_empty()).unwrap_or("fixed")
    }

    /// Build and validate a request; `today` anchors requests without a start date
    pub fn into_request(&self, today: NaiveDate) -> Result<LoanRequest> {
        let principal = required("principal", self.principal)?;
        let term_years = required("years", self.years)?;

        let structure = match self.type_name() {
            "fixed" => LoanStructure::Fixed {
                nominal_rate: required("rate", self.rate)?,
            },
            "variable" => {
                let rates = self
                    .rates
                    .as_ref()
                    .ok_or_else(|| LoanError::invalid("rates", "variable rates are required"))?;
                LoanStructure::Variable { rate_sequence: rates.parse()? }
            }
            "interest_only" => {
                let years = self.interest_only_years.unwrap_or_else(|| term_years.floor());
                if !years.is_finite() || years < 0.0 || years.fract() != 0.0 {
                    return Err(LoanError::invalid(
                        "interest_only_years",
                        format!("must be a non-negative whole number (got {})", years),
                    ));
                }
                LoanStructure::InterestOnly {
                    nominal_rate: required("rate", self.rate)?,
                    interest_only_years: years as u32,
                }
            }
            "balloon" => LoanStructure::Balloon {
                nominal_rate: required("rate", self.rate)?,
                balloon_percent: required("balloon", self.balloon)?,
            },
            other => {
                return Err(LoanError::invalid("type", format!("unknown loan type '{}'", other)));
            }
        };

        let request = LoanRequest {
            structure,
            principal,
            term_years,
            fees: self.fees.unwrap_or(0.0),
            start_date: parse_start_date(self.start_date.as_deref(), today)?,
        };
        request.validate()?;
        Ok(request)
    }
}

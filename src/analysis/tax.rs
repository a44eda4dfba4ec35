//! Mortgage interest deduction estimate

use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, LoanError, Result};

/// Deductible interest cap: interest on $750,000 of acquisition debt at 6%
const INTEREST_DEDUCTION_CAP: f64 = 750_000.0 * 0.06;

/// State and local tax deduction cap
const PROPERTY_TAX_CAP: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

impl FilingStatus {
    pub fn standard_deduction(&self) -> f64 {
        match self {
            FilingStatus::Single | FilingStatus::MarriedSeparate => 12_950.0,
            FilingStatus::MarriedJoint => 25_900.0,
            FilingStatus::HeadOfHousehold => 19_400.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxRequest {
    pub annual_interest: f64,
    /// Marginal rate, percent
    pub tax_rate: f64,
    #[serde(default)]
    pub property_tax: f64,
    #[serde(default)]
    pub filing_status: FilingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxResult {
    pub annual_interest: f64,
    pub tax_rate: f64,
    pub tax_savings: f64,
    pub effective_interest: f64,
    pub should_itemize: bool,
    pub itemized_deductions: f64,
    pub standard_deduction: f64,
    pub net_interest_cost: f64,
}

pub fn analyze_tax(request: &TaxRequest) -> Result<TaxResult> {
    let annual_interest = require_non_negative("annual_interest", request.annual_interest)?;
    let property_tax = require_non_negative("property_tax", request.property_tax)?;
    let tax_rate = require_non_negative("tax_rate", request.tax_rate)?;
    if tax_rate > 100.0 {
        return Err(LoanError::invalid("tax_rate", format!("must not exceed 100 (got {})", tax_rate)));
    }

    let standard_deduction = request.filing_status.standard_deduction();
    let interest_deduction = annual_interest.min(INTEREST_DEDUCTION_CAP);
    let itemized_deductions = interest_deduction + property_tax.min(PROPERTY_TAX_CAP);
    let should_itemize = itemized_deductions > standard_deduction;

    let (tax_savings, effective_interest) = if should_itemize {
        (
            itemized_deductions * tax_rate / 100.0,
            annual_interest - interest_deduction * tax_rate / 100.0,
        )
    } else {
        (0.0, annual_interest)
    };

    Ok(TaxResult {
        annual_interest,
        tax_rate,
        tax_savings,
        effective_interest,
        should_itemize,
        itemized_deductions,
        standard_deduction,
        net_interest_cost: effective_interest,
    })
}

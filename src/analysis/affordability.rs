//! Debt-to-income affordability check

use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, Result};

fn default_housing_ratio() -> f64 {
    28.0
}

fn default_total_ratio() -> f64 {
    36.0
}

/// Monthly figures for an affordability check; ratios are percent of income
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityRequest {
    pub income: f64,
    #[serde(default)]
    pub debts: f64,
    pub payment: f64,
    #[serde(default = "default_housing_ratio")]
    pub housing_ratio: f64,
    #[serde(default = "default_total_ratio")]
    pub total_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityResult {
    pub front_end_ratio: f64,
    pub back_end_ratio: f64,
    pub affordable_front: bool,
    pub affordable_back: bool,
    pub max_affordable_payment: f64,
    pub affordable: bool,
    pub recommendation: String,
}

pub fn assess_affordability(request: &AffordabilityRequest) -> Result<AffordabilityResult> {
    let income = require_positive("income", request.income)?;
    let debts = require_non_negative("debts", request.debts)?;
    let payment = require_non_negative("payment", request.payment)?;
    let housing_ratio = require_non_negative("housing_ratio", request.housing_ratio)?;
    let total_ratio = require_non_negative("total_ratio", request.total_ratio)?;

    let front_end_ratio = payment / income * 100.0;
    let back_end_ratio = (debts + payment) / income * 100.0;

    let max_by_front = income * housing_ratio / 100.0;
    let max_by_back = income * total_ratio / 100.0 - debts;

    let affordable_front = front_end_ratio <= housing_ratio;
    let affordable_back = back_end_ratio <= total_ratio;
    let affordable = affordable_front && affordable_back;

    let recommendation = if affordable {
        "Loan is affordable based on standard ratios.".to_string()
    } else {
        let mut advice = Vec::new();
        if !affordable_front {
            advice.push(format!("Reduce housing payment to ${:.2} or less.", max_by_front));
        }
        if !affordable_back {
            advice.push(format!("Reduce total debt payment to ${:.2} or less.", max_by_back));
        }
        advice.join(" ")
    };

    Ok(AffordabilityResult {
        front_end_ratio,
        back_end_ratio,
        affordable_front,
        affordable_back,
        max_affordable_payment: max_by_front.min(max_by_back),
        affordable,
        recommendation,
    })
}

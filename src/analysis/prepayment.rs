//! Extra-payment scenarios and lump-sum recasting

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::PrepaymentSettings;
use crate::error::{require_non_negative, require_positive, LoanError, Result};
use crate::loan::LoanRequest;
use crate::schedule::{amortizing_payment, generate, summarize, AmortizationState, AprSolver, Summary};

/// How often the extra amount is paid once prepayments start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Monthly,
    #[serde(alias = "yearly")]
    Annual,
    Quarterly,
    OneTime,
}

impl Frequency {
    /// Parse a frequency name; `all` expands to every frequency
    pub fn parse_selection(text: &str) -> Result<Vec<Frequency>> {
        let normalized = text.trim().to_ascii_lowercase().replace('-', "_");
        let selection = match normalized.as_str() {
            "monthly" => vec![Frequency::Monthly],
            "annual" | "annually" | "yearly" => vec![Frequency::Annual],
            "quarterly" => vec![Frequency::Quarterly],
            "one_time" | "onetime" | "once" => vec![Frequency::OneTime],
            "all" => vec![Frequency::Monthly, Frequency::Annual, Frequency::Quarterly, Frequency::OneTime],
            _ => {
                return Err(LoanError::invalid(
                    "prepayment_frequency",
                    format!("unknown frequency '{}'", text),
                ))
            }
        };
        Ok(selection)
    }

    /// Whether the extra amount is due in `month` (both 1-based)
    pub fn applies(&self, month: u32, start: u32) -> bool {
        if month < start {
            return false;
        }
        let since = month - start;
        match self {
            Frequency::Monthly => true,
            Frequency::Annual => since % 12 == 0,
            Frequency::Quarterly => since % 3 == 0,
            Frequency::OneTime => since == 0,
        }
    }
}

fn default_start() -> u32 {
    1
}

fn default_frequency() -> String {
    "monthly".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentRequest {
    pub principal: f64,
    pub rate: f64,
    pub years: f64,
    pub prepayment_amount: f64,
    /// First month (1-based) an extra payment is made
    #[serde(default = "default_start")]
    pub prepayment_start: u32,
    #[serde(default = "default_frequency")]
    pub prepayment_frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentScenario {
    pub frequency: Frequency,
    pub interest_savings: f64,
    pub months_saved: u32,
    pub total_months: u32,
    pub total_interest: f64,
    /// Months of average interest savings needed to recoup one prepayment
    pub payback_period: Option<f64>,
    pub final_payment: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalPrepayment {
    pub prepayment_amount: f64,
    pub interest_savings: f64,
    pub months_saved: u32,
    pub roi_percent: f64,
    pub efficiency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub best_scenario: Option<PrepaymentScenario>,
    pub highest_roi: Option<OptimalPrepayment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentPlan {
    pub original: Summary,
    pub scenarios: Vec<PrepaymentScenario>,
    pub optimal_prepayments: Vec<OptimalPrepayment>,
    pub summary: PlanSummary,
}

/// Balance below this is folded into the current payment instead of
/// costing another month
const PAYOFF_TOLERANCE: f64 = 0.01;

/// Outcome of one simulated payoff
#[derive(Debug, Clone, Copy)]
struct Payoff {
    total_interest: f64,
    months: u32,
    final_payment: f64,
}

/// Amortize month by month with `extra` principal on the months `frequency` selects
///
/// Uses the same per-period split as a Fixed schedule, so a zero extra
/// reproduces the baseline exactly.
fn simulate(
    principal: f64,
    rate: f64,
    months: u32,
    base_payment: f64,
    extra: f64,
    start: u32,
    frequency: Frequency,
) -> Payoff {
    let mut state = AmortizationState::new(principal, rate);
    let mut total_interest = 0.0;
    let mut final_payment = 0.0;

    while !state.is_paid_off() && state.period < months {
        let month = state.period + 1;
        let mut step = if month == months {
            state.settle()
        } else {
            let prepay = if frequency.applies(month, start) { extra } else { 0.0 };
            state.step(base_payment, prepay)
        };
        if state.balance < PAYOFF_TOLERANCE {
            step.principal_paid += state.balance;
            step.payment += state.balance;
            state.balance = 0.0;
        }
        total_interest += step.interest;
        final_payment = step.payment;
    }

    Payoff { total_interest, months: state.period, final_payment }
}

fn efficiency_label(roi: f64, settings: &PrepaymentSettings) -> &'static str {
    if roi > settings.high_roi_threshold {
        "High"
    } else if roi > settings.medium_roi_threshold {
        "Medium"
    } else {
        "Low"
    }
}

/// Simulate the requested prepayment frequencies and search candidate amounts
pub fn plan_prepayments(
    request: &PrepaymentRequest,
    settings: &PrepaymentSettings,
    solver: &AprSolver,
) -> Result<PrepaymentPlan> {
    let amount = require_non_negative("prepayment_amount", request.prepayment_amount)?;
    if request.prepayment_start == 0 {
        return Err(LoanError::invalid("prepayment_start", "months are numbered from 1"));
    }
    let frequencies = Frequency::parse_selection(&request.prepayment_frequency)?;

    let loan = LoanRequest::fixed(request.principal, request.rate, request.years);
    let schedule = generate(&loan)?;
    let original = summarize(&schedule, &loan, solver);
    let months = original.total_months;
    let base_payment = original.headline_payment();
    let start = request.prepayment_start;

    let run = |extra: f64, frequency: Frequency| {
        simulate(request.principal, request.rate, months, base_payment, extra, start, frequency)
    };

    let scenarios: Vec<PrepaymentScenario> = frequencies
        .iter()
        .map(|&frequency| {
            let payoff = run(amount, frequency);
            let interest_savings = original.total_interest - payoff.total_interest;
            let payback_period = if interest_savings > 0.0 && payoff.months > 0 {
                Some(amount / (interest_savings / payoff.months as f64))
            } else {
                None
            };
            let recommendation = if interest_savings > settings.good_savings_multiple * amount {
                "Good"
            } else {
                "Moderate"
            };
            PrepaymentScenario {
                frequency,
                interest_savings,
                months_saved: months.saturating_sub(payoff.months),
                total_months: payoff.months,
                total_interest: payoff.total_interest,
                payback_period,
                final_payment: payoff.final_payment,
                recommendation: recommendation.to_string(),
            }
        })
        .collect();

    let optimal_prepayments: Vec<OptimalPrepayment> = settings
        .candidate_payment_multiples
        .iter()
        .map(|multiple| multiple * base_payment)
        .filter(|candidate| *candidate > 0.0)
        .map(|candidate| {
            let payoff = run(candidate, Frequency::Monthly);
            let interest_savings = original.total_interest - payoff.total_interest;
            let roi_percent = interest_savings / candidate * 100.0;
            OptimalPrepayment {
                prepayment_amount: candidate,
                interest_savings,
                months_saved: months.saturating_sub(payoff.months),
                roi_percent,
                efficiency: efficiency_label(roi_percent, settings).to_string(),
            }
        })
        .collect();

    let best_scenario = scenarios
        .iter()
        .max_by(|a, b| a.interest_savings.total_cmp(&b.interest_savings))
        .cloned();
    let highest_roi = optimal_prepayments
        .iter()
        .max_by(|a, b| a.roi_percent.total_cmp(&b.roi_percent))
        .cloned();

    debug!(
        "Prepayment plan: {} scenarios, {} candidates, base payment {:.2}",
        scenarios.len(),
        optimal_prepayments.len(),
        base_payment
    );

    Ok(PrepaymentPlan {
        original,
        scenarios,
        optimal_prepayments,
        summary: PlanSummary { best_scenario, highest_roi },
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpSumRequest {
    pub principal: f64,
    pub rate: f64,
    pub years: f64,
    pub lump_sum_amount: f64,
    /// Month (1-based) the lump sum is paid, before that month's installment
    pub lump_sum_month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpSumResult {
    pub balance_before: f64,
    pub balance_after: f64,
    pub original_monthly_payment: f64,
    /// Payment re-amortized over the remaining term
    pub new_monthly_payment: f64,
    pub interest_savings: f64,
    pub effective_roi: f64,
    pub months_eliminated: u32,
}

/// Apply one lump sum and recast the remaining balance over the remaining term
pub fn analyze_lump_sum(request: &LumpSumRequest) -> Result<LumpSumResult> {
    let amount = require_positive("lump_sum_amount", request.lump_sum_amount)?;

    let loan = LoanRequest::fixed(request.principal, request.rate, request.years);
    let schedule = generate(&loan)?;
    let months = schedule.total_months();
    let month = request.lump_sum_month;
    if month == 0 || month > months {
        return Err(LoanError::invalid(
            "lump_sum_month",
            format!("must be between 1 and {} (got {})", months, month),
        ));
    }

    let idx = (month - 1) as usize;
    let balance_before = if idx == 0 { request.principal } else { schedule.rows[idx - 1].balance };
    let balance_after = (balance_before - amount).max(0.0);
    let remaining = months - month + 1;

    let new_payment = if balance_after > 0.0 {
        amortizing_payment(balance_after, request.rate, remaining)
    } else {
        0.0
    };

    let original_interest: f64 = schedule.rows[idx..].iter().map(|r| r.interest).sum();
    let recast_interest = (new_payment * remaining as f64 - balance_after).max(0.0);
    let interest_savings = original_interest - recast_interest;

    let months_eliminated = if new_payment > 0.0 {
        ((amount / new_payment).floor() as u32).min(remaining)
    } else {
        remaining
    };

    Ok(LumpSumResult {
        balance_before,
        balance_after,
        original_monthly_payment: schedule.rows[0].payment,
        new_monthly_payment: new_payment,
        interest_savings,
        effective_roi: interest_savings / amount * 100.0,
        months_eliminated,
    })
}

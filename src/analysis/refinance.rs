//! Refinance break-even and NPV

use log::debug;
use serde::{Deserialize, Serialize, Serializer};

use crate::config::RefinanceSettings;
use crate::error::{require_non_negative, Result};
use crate::loan::LoanRequest;
use crate::schedule::{generate, monthly_rate};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceRequest {
    pub remaining_balance: f64,
    pub old_rate: f64,
    pub new_rate: f64,
    pub remaining_years: f64,
    pub new_years: f64,
    #[serde(default)]
    pub closing_costs: f64,
    /// Finance the closing costs into the new loan instead of paying them upfront
    #[serde(default)]
    pub roll_costs: bool,
}

/// Months of savings needed to recoup upfront closing costs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakEven {
    Months(u32),
    Never,
}

impl Serialize for BreakEven {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            BreakEven::Months(m) => serializer.serialize_u32(*m),
            BreakEven::Never => serializer.serialize_str("Never"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinanceResult {
    pub old_monthly: f64,
    pub new_monthly: f64,
    pub monthly_savings: f64,
    pub break_even_months: BreakEven,
    pub total_interest_savings: f64,
    pub net_present_value: f64,
    pub recommendation: String,
}

/// Compare the remaining loan with a replacement loan
pub fn evaluate_refinance(request: &RefinanceRequest, settings: &RefinanceSettings) -> Result<RefinanceResult> {
    let closing_costs = require_non_negative("closing_costs", request.closing_costs)?;

    let old = LoanRequest::fixed(request.remaining_balance, request.old_rate, request.remaining_years);
    let new_principal = if request.roll_costs {
        request.remaining_balance + closing_costs
    } else {
        request.remaining_balance
    };
    let new = LoanRequest::fixed(new_principal, request.new_rate, request.new_years);

    let old_schedule = generate(&old)?;
    let new_schedule = generate(&new)?;
    let new_months = new_schedule.total_months();

    let old_monthly = old_schedule.first().map(|r| r.payment).unwrap_or(0.0);
    let new_monthly = new_schedule.first().map(|r| r.payment).unwrap_or(0.0);
    let monthly_savings = old_monthly - new_monthly;

    let break_even_months = if monthly_savings > 0.0 && !request.roll_costs {
        BreakEven::Months((closing_costs / monthly_savings).ceil() as u32)
    } else {
        BreakEven::Never
    };

    let upfront = if request.roll_costs { 0.0 } else { closing_costs };
    let discount = 1.0 + monthly_rate(settings.discount_rate);
    let horizon = settings.npv_horizon_months.min(new_months);
    let net_present_value = -upfront
        + (1..=horizon)
            .map(|t| monthly_savings / discount.powi(t as i32))
            .sum::<f64>();

    let recommended = match break_even_months {
        BreakEven::Months(m) => monthly_savings > 0.0 && m < new_months,
        BreakEven::Never => false,
    };

    debug!(
        "Refinance: saves {:.2}/month, break-even {:?}, NPV {:.2}",
        monthly_savings, break_even_months, net_present_value
    );

    Ok(RefinanceResult {
        old_monthly,
        new_monthly,
        monthly_savings,
        break_even_months,
        total_interest_savings: old_schedule.total_interest() - new_schedule.total_interest(),
        net_present_value,
        recommendation: if recommended { "Recommended" } else { "Not Recommended" }.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::amortizing_payment;
    use approx::assert_abs_diff_eq;

    fn request(new_rate: f64, closing_costs: f64, roll_costs: bool) -> RefinanceRequest {
        RefinanceRequest {
            remaining_balance: 200_000.0,
            old_rate: 7.0,
            new_rate,
            remaining_years: 25.0,
            new_years: 25.0,
            closing_costs,
            roll_costs,
        }
    }

    #[test]
    fn test_lower_rate_breaks_even() {
        let result = evaluate_refinance(&request(5.0, 4_000.0, false), &RefinanceSettings::default()).unwrap();

        let old = amortizing_payment(200_000.0, 7.0, 300);
        let new = amortizing_payment(200_000.0, 5.0, 300);
        assert_abs_diff_eq!(result.monthly_savings, old - new, epsilon = 1e-9);

        let expected = (4_000.0 / (old - new)).ceil() as u32;
        assert_eq!(result.break_even_months, BreakEven::Months(expected));
        assert_eq!(result.recommendation, "Recommended");
        assert!(result.total_interest_savings > 0.0);

        // 60 discounted months of savings less the upfront costs
        let d: f64 = 1.0 + 0.05 / 12.0;
        let annuity = (1.0 - d.powi(-60)) / (d - 1.0);
        assert_abs_diff_eq!(result.net_present_value, (old - new) * annuity - 4_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_higher_rate_never_breaks_even() {
        let result = evaluate_refinance(&request(8.0, 2_000.0, false), &RefinanceSettings::default()).unwrap();
        assert!(result.monthly_savings < 0.0);
        assert_eq!(result.break_even_months, BreakEven::Never);
        assert_eq!(result.recommendation, "Not Recommended");
        assert!(result.net_present_value < 0.0);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["break_even_months"], "Never");
    }

    #[test]
    fn test_rolled_costs_raise_new_payment() {
        let paid = evaluate_refinance(&request(5.0, 4_000.0, false), &RefinanceSettings::default()).unwrap();
        let rolled = evaluate_refinance(&request(5.0, 4_000.0, true), &RefinanceSettings::default()).unwrap();

        assert!(rolled.new_monthly > paid.new_monthly);
        assert_eq!(rolled.break_even_months, BreakEven::Never);
        assert!(rolled.total_interest_savings < paid.total_interest_savings);
        // No upfront outlay when costs are financed
        assert!(rolled.net_present_value > 0.0);
    }

    #[test]
    fn test_zero_costs_break_even_immediately() {
        let result = evaluate_refinance(&request(5.0, 0.0, false), &RefinanceSettings::default()).unwrap();
        assert_eq!(result.break_even_months, BreakEven::Months(0));
        assert_eq!(result.recommendation, "Recommended");
    }

    #[test]
    fn test_short_new_term_limits_npv_horizon() {
        let mut req = request(5.0, 0.0, false);
        req.remaining_years = 3.0;
        req.new_years = 2.0;
        let result = evaluate_refinance(&req, &RefinanceSettings::default()).unwrap();

        // A shorter term costs more each month
        assert!(result.monthly_savings < 0.0);
        let d: f64 = 1.0 + 0.05 / 12.0;
        let annuity = (1.0 - d.powi(-24)) / (d - 1.0);
        assert_abs_diff_eq!(result.net_present_value, result.monthly_savings * annuity, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut req = request(5.0, -1.0, false);
        assert!(evaluate_refinance(&req, &RefinanceSettings::default()).is_err());
        req.closing_costs = 0.0;
        req.remaining_balance = 0.0;
        assert!(evaluate_refinance(&req, &RefinanceSettings::default()).is_err());
    }
}

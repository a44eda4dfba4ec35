//! Payment sensitivity to the nominal rate

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SensitivitySettings;
use crate::error::Result;
use crate::loan::LoanRequest;
use crate::schedule::{generate, summarize, AprSolver, Summary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityRequest {
    pub principal: f64,
    pub rate: f64,
    pub years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub rate: f64,
    pub monthly_payment: f64,
    pub payment_change: f64,
    pub payment_change_pct: f64,
    pub total_interest: f64,
    pub total_cost: f64,
    pub interest_change: f64,
}

fn fixed_summary(principal: f64, rate: f64, years: f64, solver: &AprSolver) -> Result<Summary> {
    let request = LoanRequest::fixed(principal, rate, years);
    let schedule = generate(&request)?;
    Ok(summarize(&schedule, &request, solver))
}

/// Sampled rates, clipped at zero; duplicates from clipping are dropped
fn sweep_rates(base_rate: f64, settings: &SensitivitySettings) -> Vec<f64> {
    let mut rates: Vec<f64> = Vec::new();
    for delta in settings.deltas() {
        let rate = (base_rate + delta).max(0.0);
        if !rates.iter().any(|r| (r - rate).abs() < 1e-12) {
            rates.push(rate);
        }
    }
    rates
}

/// Sweep the rate around `base_rate` and report each point against the base loan
pub fn analyze_sensitivity(
    principal: f64,
    base_rate: f64,
    term_years: f64,
    settings: &SensitivitySettings,
    solver: &AprSolver,
) -> Result<Vec<SensitivityPoint>> {
    let base = fixed_summary(principal, base_rate, term_years, solver)?;
    let base_payment = base.headline_payment();
    let rates = sweep_rates(base_rate, settings);

    let points = rates
        .par_iter()
        .map(|&rate| -> Result<SensitivityPoint> {
            let summary = fixed_summary(principal, rate, term_years, solver)?;
            let payment = summary.headline_payment();
            let payment_change = payment - base_payment;
            Ok(SensitivityPoint {
                rate,
                monthly_payment: payment,
                payment_change,
                payment_change_pct: if base_payment > 0.0 { payment_change / base_payment * 100.0 } else { 0.0 },
                total_interest: summary.total_interest,
                total_cost: summary.total_paid,
                interest_change: summary.total_interest - base.total_interest,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Sensitivity sweep around {}%: {} points", base_rate, points.len());
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_symmetric_sweep() {
        let points = analyze_sensitivity(
            300_000.0,
            6.0,
            30.0,
            &SensitivitySettings::default(),
            &AprSolver::default(),
        )
        .unwrap();

        let rates: Vec<f64> = points.iter().map(|p| p.rate).collect();
        assert_eq!(rates, vec![4.0, 4.5, 5.0, 5.5, 6.0, 6.5, 7.0, 7.5, 8.0]);

        let base = &points[4];
        assert_abs_diff_eq!(base.monthly_payment, 1798.65, epsilon = 0.01);
        assert_eq!(base.payment_change, 0.0);
        assert_eq!(base.interest_change, 0.0);

        assert!(points.windows(2).all(|w| w[1].monthly_payment > w[0].monthly_payment));
        assert!(points[0].payment_change < 0.0 && points[8].payment_change_pct > 0.0);
    }

    #[test]
    fn test_low_rates_clip_at_zero() {
        let points = analyze_sensitivity(
            12_000.0,
            1.0,
            1.0,
            &SensitivitySettings::default(),
            &AprSolver::default(),
        )
        .unwrap();

        let rates: Vec<f64> = points.iter().map(|p| p.rate).collect();
        assert_eq!(rates, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);
        assert_abs_diff_eq!(points[0].monthly_payment, 1000.0, epsilon = 1e-9);
        assert_eq!(points[0].total_interest, 0.0);
    }

    #[test]
    fn test_invalid_base_loan() {
        let result = analyze_sensitivity(
            0.0,
            5.0,
            30.0,
            &SensitivitySettings::default(),
            &AprSolver::default(),
        );
        assert!(result.is_err());
    }
}

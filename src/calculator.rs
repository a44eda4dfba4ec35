//! Loan calculator facade
//!
//! Holds the engine configuration once, then runs any operation against it
//! without re-reading config files.

use std::error::Error;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::{
    self, AffordabilityRequest, AffordabilityResult, ComparisonResult, LumpSumRequest, LumpSumResult, Offer,
    PrepaymentPlan, PrepaymentRequest, RefinanceRequest, RefinanceResult, SensitivityPoint, TaxRequest,
    TaxResult,
};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::loan::LoanRequest;
use crate::schedule::{
    amortizing_payment, apr_or_nominal, generate, summarize, visualization, AprSolver, Schedule, Summary,
    Visualization,
};

/// Full result of a schedule calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub loan_type: String,
    pub schedule: Schedule,
    pub summary: Summary,
    pub visualization: Visualization,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AprRequest {
    pub principal: f64,
    pub rate: f64,
    pub years: f64,
    #[serde(default)]
    pub fees: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AprReport {
    pub apr: f64,
    pub nominal_rate: f64,
    pub monthly_payment: f64,
    /// APR minus nominal rate, percentage points
    pub fees_impact: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apr_note: Option<String>,
}

/// Pre-configured calculator
///
/// # Example
/// ```ignore
/// let calc = LoanCalculator::from_json_path(Path::new("engine.json"))?;
/// let result = calc.calculate(&LoanRequest::fixed(300_000.0, 6.0, 30.0))?;
/// println!("{:.2}", result.summary.headline_payment());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoanCalculator {
    config: EngineConfig,
    solver: AprSolver,
}

impl LoanCalculator {
    /// Calculator with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let solver = AprSolver::from(&config.apr);
        Self { config, solver }
    }

    pub fn from_json_path(path: &Path) -> std::result::Result<Self, Box<dyn Error>> {
        Ok(Self::with_config(EngineConfig::from_json_path(path)?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn solver(&self) -> &AprSolver {
        &self.solver
    }

    /// Schedule, summary and chart data for one loan
    pub fn calculate(&self, request: &LoanRequest) -> Result<Calculation> {
        let schedule = generate(request)?;
        let summary = summarize(&schedule, request, &self.solver);
        let visualization = visualization::build(&schedule, &self.config.visualization);
        debug!(
            "Calculated {} loan: total paid {:.2}, APR {:.4}",
            request.structure.type_name(),
            summary.total_paid,
            summary.apr
        );
        Ok(Calculation {
            loan_type: request.structure.type_name().to_string(),
            schedule,
            summary,
            visualization,
        })
    }

    /// APR of a fixed-rate loan, with the nominal-rate fallback noted
    pub fn calculate_apr(&self, request: &AprRequest) -> Result<AprReport> {
        let loan = LoanRequest::fixed(request.principal, request.rate, request.years).with_fees(request.fees);
        loan.validate()?;
        let months = loan.total_months()?;

        let outcome = apr_or_nominal(&self.solver, request.principal, request.rate, request.years, request.fees);
        Ok(AprReport {
            apr: outcome.apr,
            nominal_rate: request.rate,
            monthly_payment: amortizing_payment(request.principal, request.rate, months),
            fees_impact: outcome.apr - request.rate,
            apr_note: outcome.note,
        })
    }

    pub fn compare(&self, offers: &[Offer]) -> Vec<ComparisonResult> {
        analysis::compare(offers, &self.solver)
    }

    pub fn sensitivity(&self, principal: f64, rate: f64, years: f64) -> Result<Vec<SensitivityPoint>> {
        analysis::analyze_sensitivity(principal, rate, years, &self.config.sensitivity, &self.solver)
    }

    pub fn prepayment(&self, request: &PrepaymentRequest) -> Result<PrepaymentPlan> {
        analysis::plan_prepayments(request, &self.config.prepayment, &self.solver)
    }

    pub fn lump_sum(&self, request: &LumpSumRequest) -> Result<LumpSumResult> {
        analysis::analyze_lump_sum(request)
    }

    pub fn refinance(&self, request: &RefinanceRequest) -> Result<RefinanceResult> {
        analysis::evaluate_refinance(request, &self.config.refinance)
    }

    pub fn affordability(&self, request: &AffordabilityRequest) -> Result<AffordabilityResult> {
        analysis::assess_affordability(request)
    }

    pub fn tax(&self, request: &TaxRequest) -> Result<TaxResult> {
        analysis::analyze_tax(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SensitivitySettings;
    use crate::loan::LoanStructure;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_calculate_bundles_outputs() {
        let calc = LoanCalculator::new();
        let request = LoanRequest::new(
            LoanStructure::Balloon { nominal_rate: 5.0, balloon_percent: 20.0 },
            200_000.0,
            30.0,
        );
        let result = calc.calculate(&request).unwrap();

        assert_eq!(result.loan_type, "balloon");
        assert_eq!(result.schedule.len(), 360);
        assert_abs_diff_eq!(result.summary.balloon_payment.unwrap(), 40_000.0, epsilon = 1e-9);
        assert_eq!(result.visualization.monthly_data.months.len(), 60);
    }

    #[test]
    fn test_apr_report() {
        let calc = LoanCalculator::new();
        let report = calc
            .calculate_apr(&AprRequest { principal: 200_000.0, rate: 5.0, years: 30.0, fees: 4_000.0 })
            .unwrap();

        assert!(report.fees_impact > 0.0);
        assert_abs_diff_eq!(report.apr - report.nominal_rate, report.fees_impact, epsilon = 1e-12);
        assert_abs_diff_eq!(report.monthly_payment, 1073.64, epsilon = 0.01);
        assert!(report.apr_note.is_none());

        let fallback = calc
            .calculate_apr(&AprRequest { principal: 1_000.0, rate: 5.0, years: 1.0, fees: 1_500.0 })
            .unwrap();
        assert_eq!(fallback.apr, 5.0);
        assert_eq!(fallback.fees_impact, 0.0);
        assert!(fallback.apr_note.is_some());
    }

    #[test]
    fn test_config_drives_sensitivity() {
        let mut config = EngineConfig::default();
        config.sensitivity = SensitivitySettings { min_delta: -1.0, max_delta: 1.0, step: 1.0 };
        let calc = LoanCalculator::with_config(config);

        let points = calc.sensitivity(100_000.0, 5.0, 15.0).unwrap();
        let rates: Vec<f64> = points.iter().map(|p| p.rate).collect();
        assert_eq!(rates, vec![4.0, 5.0, 6.0]);
    }
}

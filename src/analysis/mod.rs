//! Analyses built on schedule generation

mod compare;
mod sensitivity;
mod prepayment;
mod refinance;
mod affordability;
mod tax;

pub use compare::{compare, compare_payloads, ComparisonResult, FailedOffer, Offer, RankedOffer};
pub use sensitivity::{analyze_sensitivity, SensitivityPoint, SensitivityRequest};
pub use prepayment::{
    analyze_lump_sum, plan_prepayments, Frequency, LumpSumRequest, LumpSumResult, OptimalPrepayment,
    PlanSummary, PrepaymentPlan, PrepaymentRequest, PrepaymentScenario,
};
pub use refinance::{evaluate_refinance, BreakEven, RefinanceRequest, RefinanceResult};
pub use affordability::{assess_affordability, AffordabilityRequest, AffordabilityResult};
pub use tax::{analyze_tax, FilingStatus, TaxRequest, TaxResult};

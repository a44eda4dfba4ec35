//! Rank loan offers by total cost

use chrono::NaiveDate;
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loan::{LoanPayload, LoanRequest};
use crate::schedule::{generate, summarize, AprSolver};

/// A named offer awaiting evaluation
#[derive(Debug, Clone)]
pub struct Offer {
    pub name: String,
    pub request: Result<LoanRequest>,
}

impl Offer {
    pub fn new(name: impl Into<String>, request: LoanRequest) -> Self {
        Self { name: name.into(), request: Ok(request) }
    }

    /// Convert a wire payload; conversion errors become the offer's error entry
    ///
    /// `index` is 0-based and only names offers that arrive without a name.
    pub fn from_payload(index: usize, payload: &LoanPayload, today: NaiveDate) -> Self {
        let name = payload
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Offer {}", index + 1));
        Self { name, request: payload.into_request(today) }
    }
}

/// A successfully evaluated offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOffer {
    pub name: String,
    pub loan_type: String,
    pub monthly_payment: f64,
    pub total_interest: f64,
    /// Total paid plus upfront fees
    pub total_cost: f64,
    pub apr: f64,
    /// Set when the APR fell back to the nominal rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apr_note: Option<String>,
    pub term_years: f64,
    pub principal: f64,
    pub fees: f64,
    pub rank: usize,
}

/// Offer rejected during validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedOffer {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComparisonResult {
    Ranked(RankedOffer),
    Failed(FailedOffer),
}

impl ComparisonResult {
    pub fn name(&self) -> &str {
        match self {
            ComparisonResult::Ranked(r) => &r.name,
            ComparisonResult::Failed(f) => &f.name,
        }
    }

    pub fn rank(&self) -> Option<usize> {
        match self {
            ComparisonResult::Ranked(r) => Some(r.rank),
            ComparisonResult::Failed(_) => None,
        }
    }
}

fn evaluate(offer: &Offer, solver: &AprSolver) -> std::result::Result<RankedOffer, FailedOffer> {
    let outcome = offer.request.clone().and_then(|request| {
        let schedule = generate(&request)?;
        let summary = summarize(&schedule, &request, solver);
        Ok(RankedOffer {
            name: offer.name.clone(),
            loan_type: request.structure.type_name().to_string(),
            monthly_payment: summary.headline_payment(),
            total_interest: summary.total_interest,
            total_cost: summary.total_paid + request.fees,
            apr: summary.apr,
            apr_note: summary.apr_note,
            term_years: request.term_years,
            principal: request.principal,
            fees: request.fees,
            rank: 0,
        })
    });

    outcome.map_err(|e| {
        warn!("Offer '{}' rejected: {}", offer.name, e);
        FailedOffer { name: offer.name.clone(), error: e.to_string() }
    })
}

/// Evaluate every offer and rank the valid ones by ascending total cost
///
/// Offers are evaluated in parallel. Ties keep input order. Invalid offers
/// follow the ranked ones, unranked, in input order.
pub fn compare(offers: &[Offer], solver: &AprSolver) -> Vec<ComparisonResult> {
    let outcomes: Vec<_> = offers.par_iter().map(|offer| evaluate(offer, solver)).collect();

    let mut ranked = Vec::with_capacity(outcomes.len());
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(r) => ranked.push(r),
            Err(f) => failed.push(f),
        }
    }

    ranked.sort_by(|a, b| a.total_cost.total_cmp(&b.total_cost));
    for (i, offer) in ranked.iter_mut().enumerate() {
        offer.rank = i + 1;
    }

    debug!("Compared {} offers: {} ranked, {} rejected", offers.len(), ranked.len(), failed.len());

    ranked
        .into_iter()
        .map(ComparisonResult::Ranked)
        .chain(failed.into_iter().map(ComparisonResult::Failed))
        .collect()
}

/// Compare offers given in wire form
pub fn compare_payloads(payloads: &[LoanPayload], today: NaiveDate, solver: &AprSolver) -> Vec<ComparisonResult> {
    let offers: Vec<Offer> = payloads
        .iter()
        .enumerate()
        .map(|(i, p)| Offer::from_payload(i, p, today))
        .collect();
    compare(&offers, solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ranked(result: &ComparisonResult) -> &RankedOffer {
        match result {
            ComparisonResult::Ranked(r) => r,
            ComparisonResult::Failed(f) => panic!("offer {} failed: {}", f.name, f.error),
        }
    }

    #[test]
    fn test_lower_rate_with_small_fee_ranks_first() {
        let offers = vec![
            Offer::new("A", LoanRequest::fixed(100_000.0, 5.0, 30.0)),
            Offer::new("B", LoanRequest::fixed(100_000.0, 4.5, 30.0).with_fees(2_000.0)),
        ];
        let results = compare(&offers, &AprSolver::default());

        assert_eq!(results[0].name(), "B");
        assert_eq!(results[1].name(), "A");
        assert_abs_diff_eq!(ranked(&results[1]).total_cost, 193_255.78, epsilon = 0.5);
        assert_abs_diff_eq!(ranked(&results[0]).total_cost, 184_406.0, epsilon = 1.0);
        assert!(ranked(&results[0]).apr > 4.5);
    }

    #[test]
    fn test_fee_can_outweigh_lower_rate() {
        let offers = vec![
            Offer::new("A", LoanRequest::fixed(100_000.0, 5.0, 30.0)),
            Offer::new("B", LoanRequest::fixed(100_000.0, 4.5, 30.0).with_fees(15_000.0)),
        ];
        let results = compare(&offers, &AprSolver::default());

        assert_eq!(results[0].name(), "A");
        assert_eq!(results[0].rank(), Some(1));
        assert_eq!(results[1].name(), "B");
        assert_eq!(results[1].rank(), Some(2));
    }

    #[test]
    fn test_apr_fallback_is_reported() {
        let offers = vec![
            Offer::new("all-fees", LoanRequest::fixed(10_000.0, 5.0, 5.0).with_fees(10_000.0)),
            Offer::new("plain", LoanRequest::fixed(10_000.0, 5.0, 5.0)),
        ];
        let results = compare(&offers, &AprSolver::default());
        let all_fees = results.iter().find(|r| r.name() == "all-fees").map(ranked).unwrap();

        assert_eq!(all_fees.apr, 5.0);
        assert!(all_fees.apr_note.is_some());

        let json = serde_json::to_value(&results).unwrap();
        let entries = json.as_array().unwrap();
        let noted: Vec<&str> = entries
            .iter()
            .filter(|e| e.get("apr_note").is_some())
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(noted, vec!["all-fees"]);
    }

    #[test]
    fn test_invalid_offers_are_isolated() {
        let offers = vec![
            Offer::new("bad-1", LoanRequest::fixed(0.0, 5.0, 30.0)),
            Offer::new("ok-1", LoanRequest::fixed(100_000.0, 6.0, 15.0)),
            Offer::new("bad-2", LoanRequest::fixed(100_000.0, -1.0, 15.0)),
            Offer::new("ok-2", LoanRequest::fixed(100_000.0, 4.0, 15.0)),
        ];
        let results = compare(&offers, &AprSolver::default());

        let names: Vec<&str> = results.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["ok-2", "ok-1", "bad-1", "bad-2"]);
        assert_eq!(results[2].rank(), None);
        assert!(matches!(&results[2], ComparisonResult::Failed(f) if f.error.contains("principal")));
    }

    #[test]
    fn test_ranks_are_a_permutation_in_cost_order() {
        let offers: Vec<Offer> = [6.5, 3.0, 5.0, 3.0, 7.25]
            .iter()
            .enumerate()
            .map(|(i, &rate)| Offer::new(format!("o{}", i), LoanRequest::fixed(50_000.0, rate, 10.0)))
            .collect();
        let results = compare(&offers, &AprSolver::default());

        let ranks: Vec<usize> = results.iter().filter_map(|r| r.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        let costs: Vec<f64> = results.iter().map(|r| ranked(r).total_cost).collect();
        assert!(costs.windows(2).all(|w| w[0] <= w[1]));
        // Equal costs keep input order
        assert_eq!(results[0].name(), "o1");
        assert_eq!(results[1].name(), "o3");
    }

    #[test]
    fn test_payload_names_default_by_position() {
        let payloads: Vec<LoanPayload> = serde_json::from_str(
            r#"[
                {"principal": 100000, "rate": 5, "years": 30},
                {"name": "Credit Union", "principal": 0, "rate": 4, "years": 30}
            ]"#,
        )
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let results = compare_payloads(&payloads, today, &AprSolver::default());

        assert_eq!(results[0].name(), "Offer 1");
        assert_eq!(results[1].name(), "Credit Union");
        assert!(results[1].rank().is_none());

        let json = serde_json::to_value(&results).unwrap();
        assert!(json[1].get("error").is_some());
        assert_eq!(json[0]["rank"], 1);
    }
}

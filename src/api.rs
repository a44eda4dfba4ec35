//! Route dispatch shared by the HTTP handler and the CLI
//!
//! Every route takes a JSON body and answers with a JSON value; failures map
//! to an HTTP status and an `{"error": ...}` body.

use chrono::NaiveDate;
use log::info;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::analysis::{
    compare_payloads, AffordabilityRequest, LumpSumRequest, PrepaymentRequest, RefinanceRequest,
    SensitivityRequest, TaxRequest,
};
use crate::calculator::{AprRequest, LoanCalculator};
use crate::error::LoanError;
use crate::loan::LoanPayload;

/// Routes served by [`dispatch`]
pub const ROUTES: &[&str] = &[
    "/calculate",
    "/calculate/apr",
    "/compare",
    "/sensitivity",
    "/prepayment",
    "/prepayment/lump-sum",
    "/refinance",
    "/affordability",
    "/tax",
];

#[derive(Debug, Error)]
pub enum ApiError {
    /// Body missing or not the expected JSON shape
    #[error("Invalid JSON: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Invalid(#[from] LoanError),

    #[error("Unknown route: {0}")]
    NotFound(String),

    /// Response could not be encoded
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) | ApiError::Invalid(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

#[derive(Debug, Deserialize)]
struct CompareRequest {
    offers: Vec<LoanPayload>,
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::BadRequest("No data provided".to_string()));
    }
    serde_json::from_str(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}

/// Handle one request; `today` anchors loans posted without a start date
pub fn dispatch(calc: &LoanCalculator, route: &str, body: &str, today: NaiveDate) -> Result<Value, ApiError> {
    let route = route.trim_end_matches('/');
    info!("Handling {}", route);

    match route {
        "/calculate" => {
            let payload: LoanPayload = parse(body)?;
            let request = payload.into_request(today)?;
            to_value(&calc.calculate(&request)?)
        }
        "/calculate/apr" => {
            let request: AprRequest = parse(body)?;
            to_value(&calc.calculate_apr(&request)?)
        }
        "/compare" => {
            let request: CompareRequest = parse(body)?;
            to_value(&compare_payloads(&request.offers, today, calc.solver()))
        }
        "/sensitivity" => {
            let request: SensitivityRequest = parse(body)?;
            to_value(&calc.sensitivity(request.principal, request.rate, request.years)?)
        }
        "/prepayment" => {
            let request: PrepaymentRequest = parse(body)?;
            to_value(&calc.prepayment(&request)?)
        }
        "/prepayment/lump-sum" => {
            let request: LumpSumRequest = parse(body)?;
            to_value(&calc.lump_sum(&request)?)
        }
        "/refinance" => {
            let request: RefinanceRequest = parse(body)?;
            to_value(&calc.refinance(&request)?)
        }
        "/affordability" => {
            let request: AffordabilityRequest = parse(body)?;
            to_value(&calc.affordability(&request)?)
        }
        "/tax" => {
            let request: TaxRequest = parse(body)?;
            to_value(&calc.tax(&request)?)
        }
        other => Err(ApiError::NotFound(other.to_string())),
    }
}

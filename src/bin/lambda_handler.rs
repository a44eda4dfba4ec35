//! AWS Lambda handler for the loan engine
//!
//! Serves every engine route over a Lambda Function URL. The request path
//! selects the operation and the JSON body carries its inputs.

use chrono::Local;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use log::{error, info};
use serde_json::Value;

use loan_engine::api::{dispatch, ApiError};
use loan_engine::{EngineConfig, LoanCalculator};

fn with_cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

fn json_response(status: u16, body: &Value) -> Result<Response<Body>, Error> {
    let response = with_cors(Response::builder())
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::Text(serde_json::to_string(body)?))?;
    Ok(response)
}

fn error_response(err: &ApiError) -> Result<Response<Body>, Error> {
    json_response(err.status(), &err.to_json())
}

/// Lambda handler function
async fn handler(calc: &LoanCalculator, event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(with_cors(Response::builder()).status(200).body(Body::Empty)?);
    }

    let body = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => String::new(),
    };
    let route = event.uri().path().to_string();
    let today = Local::now().date_naive();

    match dispatch(calc, &route, &body, today) {
        Ok(value) => {
            info!("{} completed in {} ms", route, start.elapsed().as_millis());
            json_response(200, &value)
        }
        Err(err) => {
            error!("{} failed: {}", route, err);
            error_response(&err)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let config = EngineConfig::from_env().map_err(|e| Error::from(e.to_string()))?;
    let calc = LoanCalculator::with_config(config);
    let calc = &calc;

    run(service_fn(move |event: Request| async move { handler(calc, event).await })).await
}

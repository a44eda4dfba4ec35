//! Loan Engine CLI
//!
//! # Usage
//!
//! ```bash
//! # Amortization schedule for a loan described in JSON
//! echo '{"type": "fixed", "principal": 300000, "rate": 6, "years": 30}' | loan-engine calculate
//!
//! # Rank offers from a CSV file
//! loan-engine --pretty compare --offers offers.csv
//!
//! # Prepayment scenarios with custom thresholds
//! loan-engine --config engine.json prepayment --input prepay.json
//! ```

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use log::info;

use loan_engine::analysis::compare_payloads;
use loan_engine::api::dispatch;
use loan_engine::loan::load_offers;
use loan_engine::LoanCalculator;

/// Loan amortization and financial analysis
#[derive(Parser)]
#[command(name = "loan-engine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON engine configuration; missing fields keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(short, long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Amortization schedule, summary and chart data
    Calculate(InputArgs),
    /// True APR including upfront fees
    Apr(InputArgs),
    /// Rank loan offers by total cost
    Compare(CompareArgs),
    /// Payment sensitivity to the interest rate
    Sensitivity(InputArgs),
    /// Extra-payment scenarios and candidate amounts
    Prepayment(InputArgs),
    /// Single lump-sum prepayment with recast
    LumpSum(InputArgs),
    /// Refinance break-even and NPV
    Refinance(InputArgs),
    /// Debt-to-income affordability check
    Affordability(InputArgs),
    /// Mortgage interest deduction estimate
    Tax(InputArgs),
}

#[derive(Args)]
struct InputArgs {
    /// JSON request file (reads stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Args)]
struct CompareArgs {
    /// CSV of offers: name,type,principal,rate,years,fees,rates,interest_only_years,balloon
    #[arg(long, conflicts_with = "input")]
    offers: Option<PathBuf>,

    /// JSON request file with an `offers` array (reads stdin when neither is given)
    #[arg(short, long)]
    input: Option<PathBuf>,
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read request from stdin")?;
            Ok(body)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let calc = match &cli.config {
        Some(path) => LoanCalculator::from_json_path(path)
            .map_err(|e| anyhow!("Failed to load config {}: {}", path.display(), e))?,
        None => LoanCalculator::new(),
    };
    let today = Local::now().date_naive();

    let (route, input) = match &cli.command {
        Commands::Calculate(args) => ("/calculate", args.input.as_ref()),
        Commands::Apr(args) => ("/calculate/apr", args.input.as_ref()),
        Commands::Compare(args) => ("/compare", args.input.as_ref()),
        Commands::Sensitivity(args) => ("/sensitivity", args.input.as_ref()),
        Commands::Prepayment(args) => ("/prepayment", args.input.as_ref()),
        Commands::LumpSum(args) => ("/prepayment/lump-sum", args.input.as_ref()),
        Commands::Refinance(args) => ("/refinance", args.input.as_ref()),
        Commands::Affordability(args) => ("/affordability", args.input.as_ref()),
        Commands::Tax(args) => ("/tax", args.input.as_ref()),
    };

    let output = match &cli.command {
        Commands::Compare(CompareArgs { offers: Some(path), .. }) => {
            let offers = load_offers(path).map_err(|e| anyhow!("Failed to load offers {}: {}", path.display(), e))?;
            info!("Loaded {} offers from {}", offers.len(), path.display());
            serde_json::to_value(compare_payloads(&offers, today, calc.solver()))?
        }
        _ => {
            let body = read_input(input)?;
            dispatch(&calc, route, &body, today).map_err(|e| anyhow!("{} failed: {}", route, e))?
        }
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    Ok(())
}

//! Engine tunables
//!
//! Every field has a default, so a config file only needs the values it
//! overrides.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Environment variable naming a JSON config file for the HTTP handler
pub const CONFIG_ENV_VAR: &str = "LOAN_ENGINE_CONFIG";

/// Configuration shared by all engine operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub apr: AprSettings,
    pub sensitivity: SensitivitySettings,
    pub prepayment: PrepaymentSettings,
    pub refinance: RefinanceSettings,
    pub visualization: VisualizationSettings,
}

/// Root-finding limits for the APR solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AprSettings {
    /// Residual tolerance, relative to net proceeds
    pub tolerance: f64,
    /// Hard cap on solver iterations
    pub max_iterations: u32,
    /// Upper bound of the monthly-rate search interval (1.0 = 100%/month)
    pub max_monthly_rate: f64,
}

impl Default for AprSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-7,
            max_iterations: 100,
            max_monthly_rate: 1.0,
        }
    }
}

/// Rate sweep around the base rate, in percentage points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivitySettings {
    pub min_delta: f64,
    pub max_delta: f64,
    pub step: f64,
}

impl Default for SensitivitySettings {
    fn default() -> Self {
        Self {
            min_delta: -2.0,
            max_delta: 2.0,
            step: 0.5,
        }
    }
}

impl SensitivitySettings {
    /// Rate offsets from `min_delta` to `max_delta` inclusive
    pub fn deltas(&self) -> Vec<f64> {
        if self.step <= 0.0 || self.max_delta < self.min_delta {
            return vec![0.0];
        }
        let steps = ((self.max_delta - self.min_delta) / self.step + 1e-9).floor() as u32;
        (0..=steps)
            .map(|i| self.min_delta + i as f64 * self.step)
            .collect()
    }
}

/// Thresholds used to label prepayment outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepaymentSettings {
    /// A scenario is "Good" when savings exceed this multiple of the prepayment amount
    pub good_savings_multiple: f64,
    /// Candidate prepayment amounts, as multiples of the base monthly payment
    pub candidate_payment_multiples: Vec<f64>,
    /// ROI (%) above which a candidate is "High" efficiency
    pub high_roi_threshold: f64,
    /// ROI (%) above which a candidate is "Medium" efficiency
    pub medium_roi_threshold: f64,
}

impl Default for PrepaymentSettings {
    fn default() -> Self {
        Self {
            good_savings_multiple: 2.0,
            candidate_payment_multiples: vec![0.1, 0.25, 0.5, 1.0, 2.0],
            high_roi_threshold: 50.0,
            medium_roi_threshold: 20.0,
        }
    }
}

/// Discounting used for the refinance NPV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinanceSettings {
    /// Annual discount rate in percent
    pub discount_rate: f64,
    /// Number of monthly savings discounted
    pub npv_horizon_months: u32,
}

impl Default for RefinanceSettings {
    fn default() -> Self {
        Self {
            discount_rate: 5.0,
            npv_horizon_months: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationSettings {
    /// Maximum points in the monthly chart series
    pub monthly_points: usize,
}

impl Default for VisualizationSettings {
    fn default() -> Self {
        Self { monthly_points: 60 }
    }
}

impl EngineConfig {
    /// Load a config from a JSON file; missing fields keep their defaults
    pub fn from_json_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Load from the file named by `LOAN_ENGINE_CONFIG`, or fall back to defaults
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_json_path(Path::new(path.trim())),
            _ => Ok(Self::default()),
        }
    }
}

//! Chart series derived from a schedule

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::config::VisualizationSettings;
use super::rows::Schedule;

/// Per-row series, truncated to the configured number of points
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyData {
    /// Months elapsed at the end of each row
    pub months: Vec<u32>,
    pub balances: Vec<f64>,
    pub interests: Vec<f64>,
    pub principals: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeData {
    pub months: Vec<u32>,
    pub cumulative_interest: Vec<f64>,
    pub cumulative_principal: Vec<f64>,
}

/// One calendar year of the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyPoint {
    pub year: i32,
    pub interest: f64,
    pub principal: f64,
    /// Balance after the last row of the year
    pub balance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_interest: f64,
    pub total_principal: f64,
    /// Interest as a percent of interest plus principal
    pub interest_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Visualization {
    pub monthly_data: MonthlyData,
    pub cumulative_data: CumulativeData,
    pub yearly_data: Vec<YearlyPoint>,
    pub totals: Totals,
}

/// Bucket a schedule into chart series
pub fn build(schedule: &Schedule, settings: &VisualizationSettings) -> Visualization {
    let cap = settings.monthly_points;
    let mut viz = Visualization::default();

    let mut elapsed = 0u32;
    let mut cum_interest = 0.0;
    let mut cum_principal = 0.0;

    for row in schedule.iter() {
        elapsed += row.months;
        cum_interest += row.interest;
        cum_principal += row.principal_paid;

        if viz.monthly_data.months.len() < cap {
            viz.monthly_data.months.push(elapsed);
            viz.monthly_data.balances.push(row.balance);
            viz.monthly_data.interests.push(row.interest);
            viz.monthly_data.principals.push(row.principal_paid);

            viz.cumulative_data.months.push(elapsed);
            viz.cumulative_data.cumulative_interest.push(cum_interest);
            viz.cumulative_data.cumulative_principal.push(cum_principal);
        }

        let year = row.date.year();
        match viz.yearly_data.last_mut() {
            Some(point) if point.year == year => {
                point.interest += row.interest;
                point.principal += row.principal_paid;
                point.balance = row.balance;
            }
            _ => viz.yearly_data.push(YearlyPoint {
                year,
                interest: row.interest,
                principal: row.principal_paid,
                balance: row.balance,
            }),
        }
    }

    let denominator = cum_interest + cum_principal;
    viz.totals = Totals {
        total_interest: cum_interest,
        total_principal: cum_principal,
        interest_ratio: if denominator > 0.0 { cum_interest / denominator * 100.0 } else { 0.0 },
    };

    viz
}

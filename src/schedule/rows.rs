//! Schedule output structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::state::PeriodStep;

/// One period of an amortization schedule: a month, or a year for Variable loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based period number
    pub period_index: u32,
    /// Calendar date the period starts on
    pub date: NaiveDate,
    /// Months covered by this row
    pub months: u32,
    /// Annual rate in force, percent
    pub rate: f64,

    pub payment: f64,
    pub interest: f64,
    /// Principal retired this period, including any balloon amount
    pub principal_paid: f64,
    /// Lump sum due on top of `payment` (final Balloon row only)
    #[serde(default)]
    pub balloon_payment: f64,
    /// Balance after this period's payment
    pub balance: f64,
}

impl ScheduleRow {
    pub fn from_step(period_index: u32, date: NaiveDate, rate: f64, step: &PeriodStep, balance: f64) -> Self {
        Self {
            period_index,
            date,
            months: 1,
            rate,
            payment: step.payment,
            interest: step.interest,
            principal_paid: step.principal_paid,
            balloon_payment: 0.0,
            balance,
        }
    }

    /// Everything the borrower pays this period
    pub fn total_due(&self) -> f64 {
        self.payment + self.balloon_payment
    }
}

/// Ordered schedule rows; a pure function of the request that produced it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    pub rows: Vec<ScheduleRow>,
}

impl Schedule {
    pub fn new(rows: Vec<ScheduleRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleRow> {
        self.rows.iter()
    }

    pub fn first(&self) -> Option<&ScheduleRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&ScheduleRow> {
        self.rows.last()
    }

    /// Sum of payments, balloon included
    pub fn total_paid(&self) -> f64 {
        self.rows.iter().map(ScheduleRow::total_due).sum()
    }

    pub fn total_interest(&self) -> f64 {
        self.rows.iter().map(|r| r.interest).sum()
    }

    pub fn total_principal(&self) -> f64 {
        self.rows.iter().map(|r| r.principal_paid).sum()
    }

    /// Months covered by the schedule (rows may span several months)
    pub fn total_months(&self) -> u32 {
        self.rows.iter().map(|r| r.months).sum()
    }

    pub fn final_balance(&self) -> f64 {
        self.rows.last().map(|r| r.balance).unwrap_or(0.0)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduleRow;
    type IntoIter = std::slice::Iter<'a, ScheduleRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

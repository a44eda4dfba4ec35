//! Schedule generation for each loan structure

use chrono::NaiveDate;
use log::debug;

use crate::error::Result;
use crate::loan::{LoanRequest, LoanStructure};
use super::rows::{Schedule, ScheduleRow};
use super::state::{monthly_rate, period_date, AmortizationState, PeriodStep};

/// Level payment that retires `principal` over `months`: `P * r / (1 - (1+r)^-n)`
pub fn amortizing_payment(principal: f64, annual_rate_pct: f64, months: u32) -> f64 {
    if months == 0 {
        return principal;
    }
    let r = monthly_rate(annual_rate_pct);
    if r == 0.0 {
        return principal / months as f64;
    }
    principal * r / (1.0 - (1.0 + r).powi(-(months as i32)))
}

/// Level payment that leaves exactly `balloon_amount` outstanding after `months`
pub fn balloon_installment(principal: f64, annual_rate_pct: f64, months: u32, balloon_amount: f64) -> f64 {
    if months == 0 {
        return principal - balloon_amount;
    }
    let r = monthly_rate(annual_rate_pct);
    if r == 0.0 {
        return (principal - balloon_amount) / months as f64;
    }
    let growth = (1.0 + r).powi(months as i32);
    (principal * r * growth - balloon_amount * r) / (growth - 1.0)
}

/// Generate the amortization schedule for a request
///
/// Monthly structures produce one row per month; Variable produces one row
/// per year, each aggregating that year's months.
pub fn generate(request: &LoanRequest) -> Result<Schedule> {
    request.validate()?;
    let months = request.total_months()?;

    let rows = match &request.structure {
        LoanStructure::Fixed { nominal_rate } => {
            fixed_rows(request.principal, *nominal_rate, months, request.start_date)
        }
        LoanStructure::Variable { rate_sequence } => {
            variable_rows(request.principal, rate_sequence, months, request.start_date)
        }
        LoanStructure::InterestOnly { nominal_rate, interest_only_years } => interest_only_rows(
            request.principal,
            *nominal_rate,
            months,
            interest_only_years * 12,
            request.start_date,
        ),
        LoanStructure::Balloon { nominal_rate, balloon_percent } => balloon_rows(
            request.principal,
            *nominal_rate,
            months,
            request.principal * balloon_percent / 100.0,
            request.start_date,
        ),
    };

    debug!(
        "Generated {} schedule: {} rows over {} months, principal {:.2}",
        request.structure.type_name(),
        rows.len(),
        months,
        request.principal
    );

    Ok(Schedule::new(rows))
}

fn fixed_rows(principal: f64, rate: f64, months: u32, start: NaiveDate) -> Vec<ScheduleRow> {
    let payment = amortizing_payment(principal, rate, months);
    let mut state = AmortizationState::new(principal, rate);
    let mut rows = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let step = if month == months {
            state.settle()
        } else {
            state.step(payment, 0.0)
        };
        rows.push(ScheduleRow::from_step(month, period_date(start, month - 1), rate, &step, state.balance));
    }

    rows
}

/// One row per year; each year re-amortizes the remaining balance over the
/// remaining term at that year's rate
fn variable_rows(principal: f64, rate_sequence: &[f64], months: u32, start: NaiveDate) -> Vec<ScheduleRow> {
    let years = months.div_ceil(12);
    let mut state = AmortizationState::new(principal, 0.0);
    let mut rows = Vec::with_capacity(years as usize);

    for year in 1..=years {
        let idx = ((year - 1) as usize).min(rate_sequence.len() - 1);
        let rate = rate_sequence[idx];
        state.set_rate(rate);

        let remaining = months - 12 * (year - 1);
        let months_in_year = remaining.min(12);
        let payment = amortizing_payment(state.balance, rate, remaining);

        let mut year_total = PeriodStep::default();
        for k in 1..=months_in_year {
            let step = if year == years && k == months_in_year {
                state.settle()
            } else {
                state.step(payment, 0.0)
            };
            year_total.accumulate(&step);
        }

        let mut row = ScheduleRow::from_step(
            year,
            period_date(start, 12 * (year - 1)),
            rate,
            &year_total,
            state.balance,
        );
        row.months = months_in_year;
        rows.push(row);
    }

    rows
}

fn interest_only_rows(
    principal: f64,
    rate: f64,
    months: u32,
    interest_only_months: u32,
    start: NaiveDate,
) -> Vec<ScheduleRow> {
    let amortizing = amortizing_payment(principal, rate, months.saturating_sub(interest_only_months));
    let mut state = AmortizationState::new(principal, rate);
    let mut rows = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let step = if month == months {
            // Also repays the principal when the whole term is interest-only
            state.settle()
        } else if month <= interest_only_months {
            let interest = state.interest_due();
            state.step(interest, 0.0)
        } else {
            state.step(amortizing, 0.0)
        };
        rows.push(ScheduleRow::from_step(month, period_date(start, month - 1), rate, &step, state.balance));
    }

    rows
}

fn balloon_rows(principal: f64, rate: f64, months: u32, balloon_amount: f64, start: NaiveDate) -> Vec<ScheduleRow> {
    let installment = balloon_installment(principal, rate, months, balloon_amount);
    let mut state = AmortizationState::new(principal, rate);
    let mut rows = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let date = period_date(start, month - 1);
        if month == months {
            let step = state.settle();
            let mut row = ScheduleRow::from_step(month, date, rate, &step, state.balance);
            row.payment = step.payment - balloon_amount;
            row.balloon_payment = balloon_amount;
            rows.push(row);
        } else {
            let step = state.step(installment, 0.0);
            rows.push(ScheduleRow::from_step(month, date, rate, &step, state.balance));
        }
    }

    rows
}

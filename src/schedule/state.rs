//! Running balance state for month-by-month amortization

use chrono::{Months, NaiveDate};

/// Convert an annual percent rate to a monthly decimal rate
pub fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 1200.0
}

/// Date `offset_months` after `start`, saturating at the calendar limit
pub fn period_date(start: NaiveDate, offset_months: u32) -> NaiveDate {
    start
        .checked_add_months(Months::new(offset_months))
        .unwrap_or(NaiveDate::MAX)
}

/// Amounts for one monthly period
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodStep {
    pub interest: f64,
    pub principal_paid: f64,
    /// Always `interest + principal_paid`
    pub payment: f64,
}

impl PeriodStep {
    /// Fold another month into an aggregate
    pub fn accumulate(&mut self, other: &PeriodStep) {
        self.interest += other.interest;
        self.principal_paid += other.principal_paid;
        self.payment += other.payment;
    }
}

/// State of a loan between periods
#[derive(Debug, Clone)]
pub struct AmortizationState {
    /// Months elapsed (0 before the first payment)
    pub period: u32,

    /// Outstanding principal
    pub balance: f64,

    /// Current monthly rate (decimal)
    pub monthly_rate: f64,
}

impl AmortizationState {
    pub fn new(principal: f64, annual_rate_pct: f64) -> Self {
        Self {
            period: 0,
            balance: principal,
            monthly_rate: monthly_rate(annual_rate_pct),
        }
    }

    /// Reprice the loan (Variable structures change rate each year)
    pub fn set_rate(&mut self, annual_rate_pct: f64) {
        self.monthly_rate = monthly_rate(annual_rate_pct);
    }

    /// Interest accrued over the next month on the current balance
    pub fn interest_due(&self) -> f64 {
        self.balance * self.monthly_rate
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= 0.0
    }

    /// Advance one month paying `installment` plus `extra` principal.
    ///
    /// Principal retired is capped at the outstanding balance, so the last
    /// payment of an early payoff shrinks accordingly.
    pub fn step(&mut self, installment: f64, extra: f64) -> PeriodStep {
        self.period += 1;

        let interest = self.interest_due();
        let principal_paid = (installment - interest + extra).max(0.0).min(self.balance);
        self.balance -= principal_paid;

        PeriodStep {
            interest,
            principal_paid,
            payment: interest + principal_paid,
        }
    }

    /// Final month: retire the whole balance, absorbing any rounding residue
    pub fn settle(&mut self) -> PeriodStep {
        self.period += 1;

        let interest = self.interest_due();
        let principal_paid = self.balance;
        self.balance = 0.0;

        PeriodStep {
            interest,
            principal_paid,
            payment: interest + principal_paid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_splits_payment() {
        let mut state = AmortizationState::new(1200.0, 12.0);
        let step = state.step(112.0, 0.0);

        assert_eq!(state.period, 1);
        assert!((step.interest - 12.0).abs() < 1e-12);
        assert!((step.principal_paid - 100.0).abs() < 1e-12);
        assert!((state.balance - 1100.0).abs() < 1e-12);
    }

    #[test]
    fn test_step_caps_at_balance() {
        let mut state = AmortizationState::new(50.0, 0.0);
        let step = state.step(40.0, 100.0);

        assert_eq!(step.principal_paid, 50.0);
        assert_eq!(step.payment, 50.0);
        assert!(state.is_paid_off());
    }

    #[test]
    fn test_settle_clears_balance() {
        let mut state = AmortizationState::new(1000.0, 6.0);
        let step = state.settle();
        assert_eq!(state.balance, 0.0);
        assert!((step.payment - 1005.0).abs() < 1e-9);
    }

    #[test]
    fn test_period_date_month_end() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(period_date(start, 1), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(period_date(start, 12), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    }
}

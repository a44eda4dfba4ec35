//! True APR calculation
//!
//! Fees reduce the proceeds the borrower actually receives while the payment
//! stream stays the same, so the effective rate is the monthly rate `i` at
//! which the present value of the level payments equals `principal - fees`.

use crate::config::AprSettings;
use crate::error::{require_non_negative, require_positive, LoanError, Result};
use super::engine::amortizing_payment;

/// Safeguarded Newton-Raphson solver with a hard iteration cap
#[derive(Debug, Clone)]
pub struct AprSolver {
    tolerance: f64,
    max_iterations: u32,
    max_monthly_rate: f64,
}

impl Default for AprSolver {
    fn default() -> Self {
        Self::from(&AprSettings::default())
    }
}

impl From<&AprSettings> for AprSolver {
    fn from(settings: &AprSettings) -> Self {
        Self {
            tolerance: settings.tolerance,
            max_iterations: settings.max_iterations,
            max_monthly_rate: settings.max_monthly_rate,
        }
    }
}

/// Present value of an n-period annuity of 1 at monthly rate `i`
fn annuity_factor(i: f64, n: u32) -> f64 {
    if i.abs() < 1e-12 {
        return n as f64;
    }
    (1.0 - (1.0 + i).powi(-(n as i32))) / i
}

/// Present value of the payment stream and its derivative with respect to `i`
fn pv_and_derivative(payment: f64, i: f64, n: u32) -> (f64, f64) {
    let nf = n as f64;
    if i.abs() < 1e-12 {
        // Limit of the derivative as i -> 0
        return (payment * nf, -payment * nf * (nf + 1.0) / 2.0);
    }
    let discount = (1.0 + i).powi(-(n as i32));
    let factor = (1.0 - discount) / i;
    let dfactor = (nf * discount / (1.0 + i) - factor) / i;
    (payment * factor, payment * dfactor)
}

impl AprSolver {
    pub fn new(tolerance: f64, max_iterations: u32, max_monthly_rate: f64) -> Self {
        Self { tolerance, max_iterations, max_monthly_rate }
    }

    /// Effective annual rate in percent (monthly rate x 12 x 100)
    pub fn solve(&self, principal: f64, nominal_rate: f64, term_years: f64, fees: f64) -> Result<f64> {
        require_positive("principal", principal)?;
        require_positive("years", term_years)?;
        require_non_negative("rate", nominal_rate)?;
        require_non_negative("fees", fees)?;

        let months = ((term_years * 12.0).round() as u32).max(1);
        if fees == 0.0 {
            return Ok(nominal_rate);
        }

        let payment = amortizing_payment(principal, nominal_rate, months);
        let monthly = self.solve_monthly_rate(payment, months, principal - fees)?;
        Ok(monthly * 12.0 * 100.0)
    }

    /// Find `i` with `payment * annuity_factor(i, n) = net_proceeds`
    pub fn solve_monthly_rate(&self, payment: f64, months: u32, net_proceeds: f64) -> Result<f64> {
        if net_proceeds <= 0.0 {
            return Err(LoanError::Convergence { iterations: 0, residual: net_proceeds.abs() });
        }

        let residual_at = |i: f64| (payment * annuity_factor(i, months) - net_proceeds) / net_proceeds;

        // The residual decreases in i; a root exists only if it changes sign on the interval
        let mut low = 0.0_f64;
        let mut high = self.max_monthly_rate;
        let high_residual = residual_at(high);
        if residual_at(low) < 0.0 || high_residual > 0.0 {
            return Err(LoanError::Convergence { iterations: 0, residual: high_residual.abs() });
        }

        let mut rate = 0.0;
        let mut residual = f64::INFINITY;

        for _ in 0..self.max_iterations {
            let (pv, dpv) = pv_and_derivative(payment, rate, months);
            residual = (pv - net_proceeds) / net_proceeds;

            if residual.abs() < self.tolerance {
                return Ok(rate);
            }

            // Keep the bracket tight so a bad Newton step can fall back to bisection
            if residual > 0.0 {
                low = rate;
            } else {
                high = rate;
            }

            let newton = if dpv.abs() > 1e-20 { rate - (pv - net_proceeds) / dpv } else { f64::NAN };
            rate = if newton.is_finite() && newton > low && newton < high {
                newton
            } else {
                (low + high) / 2.0
            };
        }

        Err(LoanError::Convergence {
            iterations: self.max_iterations,
            residual: residual.abs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_no_fees_returns_nominal() {
        let solver = AprSolver::default();
        assert_eq!(solver.solve(300_000.0, 6.0, 30.0, 0.0).unwrap(), 6.0);
    }

    #[test]
    fn test_recovers_nominal_rate() {
        let solver = AprSolver::default();
        let payment = amortizing_payment(100_000.0, 7.2, 120);
        let monthly = solver.solve_monthly_rate(payment, 120, 100_000.0).unwrap();
        assert_abs_diff_eq!(monthly * 1200.0, 7.2, epsilon = 1e-4);
    }

    #[test]
    fn test_fees_raise_apr() {
        let solver = AprSolver::default();
        let apr = solver.solve(200_000.0, 5.0, 30.0, 4_000.0).unwrap();
        // 2% points on a 30-year loan add roughly 0.18 percentage points
        assert!(apr > 5.15 && apr < 5.22, "apr = {}", apr);
    }

    #[test]
    fn test_monotonic_in_fees() {
        let solver = AprSolver::default();
        let aprs: Vec<f64> = [0.0, 500.0, 2_000.0, 10_000.0, 40_000.0]
            .iter()
            .map(|&fees| solver.solve(150_000.0, 4.5, 15.0, fees).unwrap())
            .collect();
        assert!(aprs.windows(2).all(|w| w[1] > w[0]), "{:?}", aprs);
    }

    #[test]
    fn test_zero_nominal_rate_with_fees() {
        let solver = AprSolver::default();
        let apr = solver.solve(12_000.0, 0.0, 1.0, 600.0).unwrap();
        assert!(apr > 9.0 && apr < 11.0, "apr = {}", apr);
    }

    #[test]
    fn test_fees_exceeding_principal_fail() {
        let solver = AprSolver::default();
        let result = solver.solve(10_000.0, 5.0, 5.0, 10_000.0);
        assert!(matches!(result, Err(LoanError::Convergence { .. })));
    }

    #[test]
    fn test_iteration_cap() {
        let solver = AprSolver::new(1e-30, 3, 1.0);
        let result = solver.solve(10_000.0, 5.0, 5.0, 1_000.0);
        assert!(matches!(result, Err(LoanError::Convergence { iterations: 3, .. })));
    }
}

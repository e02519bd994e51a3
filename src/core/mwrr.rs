//! Money-weighted rate of return (XIRR-style) by bisection.
use chrono::NaiveDateTime;
use tracing::debug;

/// Average year length in days, accounting for leap years.
pub const YEAR_LENGTH_DAYS: f64 = 365.24;
const MS_PER_YEAR: f64 = 1000.0 * 60.0 * 60.0 * 24.0 * YEAR_LENGTH_DAYS;

/// A cash flow into the portfolio. Withdrawals carry a negative amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deposit {
    pub date: NaiveDateTime,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationPoint {
    pub date: NaiveDateTime,
    pub value: f64,
}

/// Search bracket and stopping rules for [`solve_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    pub lower: f64,
    pub upper: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            lower: 0.001,
            upper: 10.0,
            tolerance: 1e-6,
            max_iterations: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// Per-year growth factor, 1.07 being +7% a year.
    pub rate_factor: f64,
    pub iterations: u32,
    /// False when the iteration cap was hit before the bracket closed.
    pub converged: bool,
}

fn years_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_milliseconds() as f64 / MS_PER_YEAR
}

/// Value of `amount` deposited at `date` grown to `target` at `rate_factor`.
pub fn compound_value(date: NaiveDateTime, target: NaiveDateTime, amount: f64, rate_factor: f64) -> f64 {
    amount * rate_factor.powf(years_between(date, target))
}

/// Sum of every deposit grown to `target`.
pub fn compounded_total(deposits: &[Deposit], target: NaiveDateTime, rate_factor: f64) -> f64 {
    deposits
        .iter()
        .map(|d| compound_value(d.date, target, d.amount, rate_factor))
        .sum()
}

/// Finds the constant yearly growth factor that turns `deposits` into
/// `current_valuation` at `valuation_date`, using the default bracket.
pub fn solve(deposits: &[Deposit], valuation_date: NaiveDateTime, current_valuation: f64) -> f64 {
    solve_with(
        &SolverSettings::default(),
        deposits,
        valuation_date,
        current_valuation,
    )
    .rate_factor
}

/// Bisection over `[settings.lower, settings.upper]`.
///
/// The compounded total grows with the rate for positive deposits, so a
/// midpoint overshooting the valuation moves the upper bound down. The loop
/// stops once the bracket is narrower than the tolerance or after
/// `max_iterations`; either way the bracket midpoint is returned, so the
/// result always lies inside the initial bracket.
///
/// Series mixing deposits and withdrawals may not be monotone in the rate,
/// and the search then settles on whichever root the halving reaches.
pub fn solve_with(
    settings: &SolverSettings,
    deposits: &[Deposit],
    valuation_date: NaiveDateTime,
    current_valuation: f64,
) -> Solution {
    // Nothing has time to grow, so every rate fits equally well
    if deposits.iter().all(|d| d.date == valuation_date) {
        debug!("All deposits dated at valuation, returning neutral factor");
        return Solution {
            rate_factor: 1.0,
            iterations: 0,
            converged: true,
        };
    }

    let mut lower = settings.lower;
    let mut upper = settings.upper;

    for iteration in 0..settings.max_iterations {
        let mid = (upper + lower) * 0.5;
        if upper - lower < settings.tolerance {
            debug!(iteration, rate_factor = mid, "MWRR converged");
            return Solution {
                rate_factor: mid,
                iterations: iteration,
                converged: true,
            };
        }

        if compounded_total(deposits, valuation_date, mid) > current_valuation {
            upper = mid;
        } else {
            lower = mid;
        }
    }

    let rate_factor = (upper + lower) / 2.0;
    debug!(
        iterations = settings.max_iterations,
        rate_factor, "MWRR hit the iteration cap, returning best midpoint"
    );
    Solution {
        rate_factor,
        iterations: settings.max_iterations,
        converged: false,
    }
}

//! Validated performance input and the derived return report.
use crate::core::error::InputError;
use crate::core::mwrr::{self, Deposit, ValuationPoint};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::debug;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransactionRecord {
    pub date: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValuationRecord {
    pub date: String,
    pub value: f64,
}

/// Raw performance file: cash flows plus the observed portfolio values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PerformanceData {
    pub transactions: Vec<TransactionRecord>,
    pub values: Vec<ValuationRecord>,
}

/// Parses `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` or an RFC 3339 timestamp.
///
/// Plain dates are taken at midnight, timestamps with an offset are
/// converted to UTC.
pub fn parse_date(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(datetime);
    }
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.naive_utc())
}

fn parse_field_date(field: String, raw: &str) -> Result<NaiveDateTime, InputError> {
    parse_date(raw).map_err(|e| InputError::InvalidDate {
        field,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn finite(field: String, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NonFinite { field, value })
    }
}

/// Deposits and the final valuation, checked and ready for the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceInput {
    pub deposits: Vec<Deposit>,
    /// Last entry of the value series, taken by position rather than date.
    pub valuation: ValuationPoint,
}

impl PerformanceInput {
    /// Rejects empty series, unparseable dates and non-finite numbers in the
    /// transactions and in the last value point.
    pub fn from_records(data: &PerformanceData) -> Result<Self, InputError> {
        if data.transactions.is_empty() {
            return Err(InputError::Empty {
                field: "transactions".to_string(),
            });
        }
        if data.values.is_empty() {
            return Err(InputError::Empty {
                field: "values".to_string(),
            });
        }

        let deposits = data
            .transactions
            .iter()
            .enumerate()
            .map(|(i, t)| {
                Ok(Deposit {
                    date: parse_field_date(format!("transactions[{i}].date"), &t.date)?,
                    amount: finite(format!("transactions[{i}].amount"), t.amount)?,
                })
            })
            .collect::<Result<Vec<_>, InputError>>()?;

        // Only the last point feeds the solver; earlier ones are ignored
        let last = data.values.len() - 1;
        let point = &data.values[last];
        let valuation = ValuationPoint {
            date: parse_field_date(format!("values[{last}].date"), &point.date)?,
            value: finite(format!("values[{last}].value"), point.value)?,
        };

        Ok(Self {
            deposits,
            valuation,
        })
    }
}

/// Ratio of final value to invested amount; undefined when nothing was
/// invested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BruteYield {
    Ratio(f64),
    Undefined,
}

impl Display for BruteYield {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BruteYield::Ratio(ratio) => write!(f, "{ratio:.4}"),
            BruteYield::Undefined => write!(f, "n/a (invested = 0)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub last_date: NaiveDateTime,
    pub invested: f64,
    pub last_value: f64,
    pub earned: f64,
    pub brute_yield: BruteYield,
    pub rate_factor: f64,
    pub percentage: f64,
}

impl PerformanceReport {
    pub fn compute(input: &PerformanceInput) -> Self {
        let last_value = input.valuation.value;
        let last_date = input.valuation.date;
        let invested: f64 = input.deposits.iter().map(|d| d.amount).sum();

        let rate_factor = mwrr::solve(&input.deposits, last_date, last_value);
        let brute_yield = if invested == 0.0 {
            BruteYield::Undefined
        } else {
            BruteYield::Ratio(last_value / invested)
        };

        debug!(invested, last_value, rate_factor, "Computed performance report");
        Self {
            last_date,
            invested,
            last_value,
            earned: last_value - invested,
            brute_yield,
            rate_factor,
            percentage: (rate_factor - 1.0) * 100.0,
        }
    }
}

//! Look-through allocation of a portfolio into country, continent, sector
//! and market-status exposure.
use crate::core::catalog::{FundCatalogIndex, GeographyLookup, StatusLookup, non_empty};
use crate::core::error::InputError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Bucket receiving positions whose fund is not in the catalog.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A single holding in the portfolio.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Position {
    pub isin: Option<String>,
    pub ticker: Option<String>,
    pub shares: f64,
    pub price: f64,
}

impl Position {
    pub fn value(&self) -> f64 {
        self.shares * self.price
    }

    /// ISIN if present, else the ticker. Empty strings count as absent.
    pub fn identifier(&self) -> Option<&str> {
        non_empty(self.isin.as_deref()).or_else(|| non_empty(self.ticker.as_deref()))
    }

    fn validate(&self, index: usize) -> Result<(), InputError> {
        if self.identifier().is_none() {
            return Err(InputError::MissingIdentifier {
                field: format!("assets[{index}]"),
            });
        }
        for (name, value) in [("shares", self.shares), ("price", self.price)] {
            let field = format!("assets[{index}].{name}");
            if !value.is_finite() {
                return Err(InputError::NonFinite { field, value });
            }
            if value < 0.0 {
                return Err(InputError::Negative { field, value });
            }
        }
        Ok(())
    }
}

/// Checks every position has an identifier and sane quantities.
pub fn validate_positions(positions: &[Position]) -> Result<(), InputError> {
    positions
        .iter()
        .enumerate()
        .try_for_each(|(i, p)| p.validate(i))
}

/// Open-ended set of labelled monetary buckets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryDistribution {
    buckets: BTreeMap<String, f64>,
}

impl CategoryDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates `value` into `label`, creating the bucket at zero.
    pub fn add(&mut self, label: &str, value: f64) {
        if let Some(total) = self.buckets.get_mut(label) {
            *total += value;
        } else {
            self.buckets.insert(label.to_string(), value);
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.buckets.get(label).copied()
    }

    pub fn total(&self) -> f64 {
        self.buckets.values().sum()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.buckets.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entries by value descending, ties by label.
    pub fn sorted(&self) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> =
            self.buckets.iter().map(|(k, v)| (k.clone(), *v)).collect();
        entries.sort_by(|(la, a), (lb, b)| b.total_cmp(a).then_with(|| la.cmp(lb)));
        entries
    }

    /// Keeps the `limit` largest entries and folds the rest into a single
    /// `"... K others ..."` entry. Display only.
    pub fn top(&self, limit: usize) -> Vec<(String, f64)> {
        let mut entries = self.sorted();
        if entries.len() <= limit {
            return entries;
        }

        let others = entries.split_off(limit);
        let others_value: f64 = others.iter().map(|(_, v)| v).sum();
        entries.push((format!("... {} others ...", others.len()), others_value));
        entries
    }
}

/// The four independent exposure breakdowns of a portfolio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryReport {
    pub country: CategoryDistribution,
    pub continent: CategoryDistribution,
    pub sector: CategoryDistribution,
    pub market_status: CategoryDistribution,
}

impl CategoryReport {
    fn add_to_all(&mut self, label: &str, value: f64) {
        self.country.add(label, value);
        self.continent.add(label, value);
        self.sector.add(label, value);
        self.market_status.add(label, value);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationSummary {
    pub total_value: f64,
    pub position_count: usize,
    pub report: CategoryReport,
}

/// Distributes each position's value over the countries and sectors of its
/// fund.
///
/// Fund weights are used as given. Weights summing below 100 leave part of
/// the position unallocated, so a distribution total may be below
/// `total_value`. Positions whose fund is missing from the catalog are
/// logged and placed entirely in the [`UNKNOWN_CATEGORY`] bucket of every
/// distribution.
pub fn aggregate(
    positions: &[Position],
    catalog: &FundCatalogIndex,
    geography: &GeographyLookup,
    status: &StatusLookup,
) -> AllocationSummary {
    let mut total_value = 0.0;
    let mut report = CategoryReport::default();

    for position in positions {
        let position_value = position.value();
        total_value += position_value;

        let Some(fund) = catalog.resolve(position.isin.as_deref(), position.ticker.as_deref())
        else {
            warn!(
                identifier = position.identifier().unwrap_or_default(),
                "Fund details not found, counting position as {UNKNOWN_CATEGORY}"
            );
            report.add_to_all(UNKNOWN_CATEGORY, position_value);
            continue;
        };

        for (country, pct) in &fund.countries {
            let slice = position_value * (pct / 100.0);
            report.country.add(country, slice);
            report.continent.add(geography.continent_of(country), slice);
            report.market_status.add(status.status_of(country), slice);
        }

        for (sector, pct) in &fund.sectors {
            report.sector.add(sector, position_value * (pct / 100.0));
        }
    }

    debug!(
        total_value,
        positions = positions.len(),
        countries = report.country.len(),
        sectors = report.sector.len(),
        "Aggregated portfolio allocation"
    );

    AllocationSummary {
        total_value,
        position_count: positions.len(),
        report,
    }
}

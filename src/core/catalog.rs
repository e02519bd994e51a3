//! Fund catalog index and country classification tables.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Country label that always maps to [`OTHER_UNCLASSIFIED`].
pub const OTHER_COUNTRY: &str = "Other";
pub const OTHER_UNCLASSIFIED: &str = "Other/Unclassified";
pub const UNKNOWN_CONTINENT: &str = "Unknown Continent";
pub const UNCLASSIFIED_STATUS: &str = "Unclassified Status";

/// Treats an empty identifier the same as a missing one.
pub fn non_empty(identifier: Option<&str>) -> Option<&str> {
    identifier.filter(|s| !s.is_empty())
}

/// Breakdown of one fund by country and by sector, in percent of fund value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FundComposition {
    pub isin: Option<String>,
    pub ticker: Option<String>,
    #[serde(default)]
    pub countries: BTreeMap<String, f64>,
    #[serde(default)]
    pub sectors: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContinentRecord {
    pub country: String,
    pub continent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusRecord {
    pub country: String,
    pub status: String,
}

/// Funds keyed by both ISIN and ticker.
///
/// Both identifiers of a fund resolve to the same stored composition. When two
/// funds share an identifier the one later in catalog order wins.
#[derive(Debug, Default)]
pub struct FundCatalogIndex {
    funds: Vec<FundComposition>,
    by_identifier: HashMap<String, usize>,
}

impl FundCatalogIndex {
    pub fn build(catalog: Vec<FundComposition>) -> Self {
        let mut by_identifier = HashMap::new();

        for (slot, fund) in catalog.iter().enumerate() {
            let keys = [fund.isin.as_deref(), fund.ticker.as_deref()];
            for key in keys.into_iter().filter_map(non_empty) {
                if let Some(previous) = by_identifier.insert(key.to_string(), slot) {
                    debug!(
                        identifier = %key,
                        previous,
                        current = slot,
                        "Catalog identifier collision, later fund wins"
                    );
                }
            }
        }

        debug!(
            funds = catalog.len(),
            keys = by_identifier.len(),
            "Built fund catalog index"
        );
        Self {
            funds: catalog,
            by_identifier,
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&FundComposition> {
        self.by_identifier
            .get(identifier)
            .map(|&slot| &self.funds[slot])
    }

    /// Looks up by ISIN first, then by ticker. Empty identifiers are skipped.
    pub fn resolve(&self, isin: Option<&str>, ticker: Option<&str>) -> Option<&FundComposition> {
        non_empty(isin)
            .and_then(|i| self.get(i))
            .or_else(|| non_empty(ticker).and_then(|t| self.get(t)))
    }

    pub fn len(&self) -> usize {
        self.funds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funds.is_empty()
    }
}

/// Country to continent.
#[derive(Debug, Default, Clone)]
pub struct GeographyLookup {
    continents: HashMap<String, String>,
}

impl GeographyLookup {
    pub fn build(records: Vec<ContinentRecord>) -> Self {
        Self {
            continents: records
                .into_iter()
                .map(|r| (r.country, r.continent))
                .collect(),
        }
    }

    pub fn continent_of<'a>(&'a self, country: &str) -> &'a str {
        if country == OTHER_COUNTRY {
            return OTHER_UNCLASSIFIED;
        }
        self.continents
            .get(country)
            .map_or(UNKNOWN_CONTINENT, String::as_str)
    }
}

/// Country to market status (developed, emerging, ...).
#[derive(Debug, Default, Clone)]
pub struct StatusLookup {
    statuses: HashMap<String, String>,
}

impl StatusLookup {
    pub fn build(records: Vec<StatusRecord>) -> Self {
        Self {
            statuses: records.into_iter().map(|r| (r.country, r.status)).collect(),
        }
    }

    pub fn status_of<'a>(&'a self, country: &str) -> &'a str {
        if country == OTHER_COUNTRY {
            return OTHER_UNCLASSIFIED;
        }
        self.statuses
            .get(country)
            .map_or(UNCLASSIFIED_STATUS, String::as_str)
    }
}

//! Core portfolio analytics: look-through allocation and money-weighted return

pub mod allocation;
pub mod catalog;
pub mod config;
pub mod error;
pub mod input;
pub mod log;
pub mod mwrr;
pub mod performance;

// Re-export main types for cleaner imports
pub use allocation::{AllocationSummary, CategoryDistribution, CategoryReport, Position, aggregate};
pub use catalog::{FundCatalogIndex, FundComposition, GeographyLookup, StatusLookup};
pub use error::InputError;
pub use mwrr::{Deposit, ValuationPoint, solve};
pub use performance::{BruteYield, PerformanceInput, PerformanceReport};

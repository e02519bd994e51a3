//! Command implementations and console rendering

pub mod alloc;
pub mod performance;
pub mod setup;
pub mod ui;

//! Personal ledger for daily jaap counts. Keeps one entry per day, derives yearly and lifetime
//! totals and records the date every crore milestone was reached.
//! Everything is stored locally and used through a terminal.
//!

pub mod actions;
pub mod cli;
pub mod engine;
pub mod store;
pub mod utils;

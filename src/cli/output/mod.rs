//! Terminal rendering of the reflection and the ledger. Nothing in here computes totals, it
//! only formats what the engine returned.

pub mod ledger_view;
pub mod reflection;

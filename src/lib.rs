//! Apartment listing scoring: tier reconciliation, the aggregate "mega
//! score", ranking, and a live terminal dashboard over a listing source.

pub mod cli;
pub mod services;
pub mod sources;
pub mod tui;
pub mod types;

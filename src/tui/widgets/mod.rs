//! TUI widgets

pub mod detail;
pub mod help;
pub mod listings;
pub mod spinner;

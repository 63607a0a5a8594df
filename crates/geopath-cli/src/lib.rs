//! geopath CLI library.
//!
//! Command handlers and output formatting for the `geopath` binary.

pub mod commands;
pub mod output;

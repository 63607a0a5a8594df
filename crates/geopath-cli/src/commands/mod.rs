// Module exports for CLI subcommands.
//
// Each module handles one subcommand; main.rs only parses arguments and
// dispatches.

pub mod geocode;
pub mod route;

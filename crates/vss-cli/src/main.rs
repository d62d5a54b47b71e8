//! # vss CLI
//!
//! Command-line interface for the Vector Similarity Service.
//!
//! This binary provides human-friendly access to `vss-core` functionality.
//! Run `vss --help` for usage information.

mod cli;
mod records;
pub mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}

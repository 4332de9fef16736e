//! CLI command definitions
//!
//! Defines the clap commands for the portal test harness.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and run the test suite against the configured portal
    Run {
        /// Load scenarios from a YAML file instead of the built-in suite
        #[arg(long)]
        suite: Option<PathBuf>,

        /// Only run scenarios whose name contains this string
        #[arg(long)]
        scenario: Option<String>,

        /// Where to write the error dump when any scenario fails
        #[arg(long, default_value = "portal-error.log")]
        error_log: PathBuf,
    },

    /// List the scenarios and steps that would run
    List {
        /// Load scenarios from a YAML file instead of the built-in suite
        #[arg(long)]
        suite: Option<PathBuf>,
    },
}

//! Portal test harness CLI
//!
//! Signs in against Cognito and runs scripted GraphQL scenarios against
//! the portal AppSync endpoint, reporting per-step pass/fail lines and a
//! final summary.

use clap::Parser;
use portal_probe::{cli, commands::Commands, common::logging};

#[derive(Parser)]
#[command(name = "portal-probe", about = "Integration-test harness for the portal GraphQL API")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    logging::init();

    let cli = Cli::parse();

    match cli::dispatch(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

//! CLI command handling
//!
//! Dispatches commands: loads configuration, signs in against Cognito,
//! runs the suite, and renders the banner and summary blocks. The exit
//! code is 0 only when every scenario passed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;

use crate::auth::CognitoClient;
use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::suite::{load_suite, run_all, scenarios, ConsoleReporter, Scenario, SuiteReport};
use crate::transport::GraphqlClient;

/// Dispatch a CLI command, returning the process exit code.
pub async fn dispatch(command: Commands) -> Result<i32> {
    match command {
        Commands::Run {
            suite,
            scenario,
            error_log,
        } => run(suite, scenario, error_log).await,
        Commands::List { suite } => {
            list(suite)?;
            Ok(0)
        }
    }
}

async fn run(
    suite: Option<PathBuf>,
    filter: Option<String>,
    error_log: PathBuf,
) -> Result<i32> {
    let config = Config::load()?;
    print_banner(&config);

    println!("{} SignIn", "Try".blue());
    let cognito = CognitoClient::new(&config.region, &config.client_id);
    let session = match cognito
        .authenticate(&config.username, &config.password)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            println!("\n{} SignIn\n{}", "Failed".red(), e.to_string().red());
            return Ok(1);
        }
    };

    println!("\n{} SignIn", "Success".green());
    println!("{} username           : {}", "i".blue(), config.username.green());
    println!("{} sub                : {}", "i".blue(), session.claims.sub.green());
    if let Some(email) = &session.claims.email {
        println!("{} email              : {}", "i".blue(), email.green());
    }
    if let Some(name) = &session.claims.display_name {
        println!("{} custom:display_name: {}", "i".blue(), name.green());
    }

    let suite = resolve_suite(suite.as_deref(), filter.as_deref())?;
    print_execute_banner(suite.len());

    let transport = GraphqlClient::new(
        &config.endpoint,
        &session.bearer_token,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let report = run_all(&transport, &suite, &session.claims.sub, &ConsoleReporter).await;

    print_summary(&report);

    if report.summary.all_passed() {
        Ok(0)
    } else {
        let dump = serde_json::to_string_pretty(&report.error_dump())?;
        std::fs::write(&error_log, dump)?;
        println!("Error details written to {}", error_log.display());
        Ok(1)
    }
}

fn list(suite: Option<PathBuf>) -> Result<()> {
    let suite = resolve_suite(suite.as_deref(), None)?;
    for scenario in &suite {
        println!("{} ({} steps)", scenario.name.bold(), scenario.steps.len());
        for step in &scenario.steps {
            println!("  - {}", step.label);
        }
    }
    Ok(())
}

fn resolve_suite(path: Option<&Path>, filter: Option<&str>) -> Result<Vec<Scenario>> {
    let mut suite = match path {
        Some(path) => load_suite(path)?,
        None => scenarios::default_suite(),
    };
    if let Some(filter) = filter {
        suite.retain(|s| s.name.contains(filter));
    }
    if suite.is_empty() {
        return Err(Error::Config("no scenarios selected".to_string()));
    }
    Ok(suite)
}

fn print_banner(config: &Config) {
    println!(
        r#"
=======================================================
╔═╗┌─┐┬─┐┌┬┐┌─┐┬    ╔═╗┌─┐┌─┐╔═╗┬ ┬┌┐┌┌─┐  ╔╦╗┌─┐┌─┐┌┬┐
╠═╝│ │├┬┘ │ ├─┤│    ╠═╣├─┘├─┘╚═╗└┬┘││││     ║ ├┤ └─┐ │
╩  └─┘┴└─ ┴ ┴ ┴┴─┘  ╩ ╩┴  ┴  ╚═╝ ┴ ┘└┘└─┘   ╩ └─┘└─┘ ┴
COGNITO_REGION_NAME: {}
COGNITO_CLIENT_KEY : {}
APPSYNC_URL        : {}
======================================================="#,
        config.region.green(),
        config.client_id.green(),
        config.endpoint.green()
    );
}

fn print_execute_banner(count: usize) {
    println!(
        r#"
=======================================================
╔═╗─┐ ┬┌─┐┌─┐┬ ┬┌┬┐┌─┐  ╔╦╗╔═╗╔═╗╔╦╗
║╣ ┌┴┬┘├┤ │  │ │ │ ├┤    ║ ║╣ ╚═╗ ║
╚═╝┴ └─└─┘└─┘└─┘ ┴ └─┘   ╩ ╚═╝╚═╝ ╩
Number of scenarios: {}
======================================================="#,
        count.to_string().green()
    );
}

fn print_summary(report: &SuiteReport) {
    let summary = &report.summary;
    println!(
        r#"
=======================================================
╔╦╗┌─┐┌─┐┌┬┐  ╦═╗┌─┐┌─┐┬ ┬┬ ┌┬┐
 ║ ├┤ └─┐ │   ╠╦╝├┤ └─┐│ ││  │
 ╩ └─┘└─┘ ┴   ╩╚═└─┘└─┘└─┘┴─┘┴

Number of scenarios : {}
Scenario pass count : {}
Scenario fail count : {}
Step pass count     : {}
Step fail count     : {}
======================================================="#,
        summary.total_scenarios.to_string().green(),
        (summary.total_scenarios - summary.failed_scenarios)
            .to_string()
            .green(),
        summary.failed_scenarios.to_string().green(),
        (summary.total_steps - summary.failed_steps).to_string().green(),
        summary.failed_steps.to_string().green()
    );
}

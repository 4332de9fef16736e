//! Progress reporting
//!
//! The executor emits one event per step through this sink. Keeping the
//! sink behind a trait keeps console formatting out of the core's
//! decision logic; tests run against the silent sink with no output
//! capture.

use std::io::Write as _;

use colored::Colorize;

use crate::common::StepFailure;

pub trait Reporter: Send + Sync {
    fn scenario_started(&self, index: usize, total: usize, name: &str);
    fn step_started(&self, label: &str);
    fn step_passed(&self, label: &str, detail: Option<&str>);
    fn step_failed(&self, label: &str, failure: &StepFailure);
}

/// Console sink rendering the classic harness output: a dimmed step label
/// followed by a ✓ with the distinguishing identifier, or a ✗ with the
/// raw error payload.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn scenario_started(&self, index: usize, total: usize, name: &str) {
        println!("[{}/{}] Try: {}", index + 1, total, name.underline());
    }

    fn step_started(&self, label: &str) {
        let pad = 24usize.saturating_sub(label.len());
        print!("{} {}{}: ", "i".blue(), label.dimmed(), " ".repeat(pad));
        let _ = std::io::stdout().flush();
    }

    fn step_passed(&self, _label: &str, detail: Option<&str>) {
        match detail {
            Some(detail) => println!("{} {}", "✓".green().bold(), detail),
            None => println!("{}", "✓".green().bold()),
        }
    }

    fn step_failed(&self, _label: &str, failure: &StepFailure) {
        match &failure.body {
            Some(body) => println!(
                "{} {} {}",
                "✗".red().bold(),
                failure.message.red(),
                body.to_string().red()
            ),
            None => println!("{} {}", "✗".red().bold(), failure.message.red()),
        }
    }
}

/// No-op sink for tests and embedding.
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn scenario_started(&self, _index: usize, _total: usize, _name: &str) {}
    fn step_started(&self, _label: &str) {}
    fn step_passed(&self, _label: &str, _detail: Option<&str>) {}
    fn step_failed(&self, _label: &str, _failure: &StepFailure) {}
}

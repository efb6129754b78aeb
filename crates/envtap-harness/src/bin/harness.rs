//! Conformance harness CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use envtap_harness::report::ConformanceReport;
use envtap_harness::{FixtureSet, TestRunner, fixtures};

#[derive(Parser)]
#[command(name = "harness", about = "envtap conformance harness")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a fixture file and print a JSON report.
    Run {
        /// Path to a fixture JSON file; omit to run the built-in smoke set.
        #[arg(long)]
        fixtures: Option<PathBuf>,
        /// Campaign name stamped into the report.
        #[arg(long, default_value = "conformance")]
        campaign: String,
    },
    /// Print the built-in smoke fixture set as JSON.
    Sample,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Run { fixtures, campaign } => run(fixtures.as_deref(), &campaign),
        Command::Sample => sample(),
    }
}

fn run(path: Option<&std::path::Path>, campaign: &str) -> ExitCode {
    let (set, json) = match path {
        Some(path) => match FixtureSet::from_file(path) {
            Ok(set) => {
                let json = match set.to_json() {
                    Ok(json) => json,
                    Err(err) => return fail(&format!("serialize fixtures: {err}")),
                };
                (set, json)
            }
            Err(err) => return fail(&format!("load {}: {err}", path.display())),
        },
        None => {
            let set = fixtures::smoke_set();
            let json = match set.to_json() {
                Ok(json) => json,
                Err(err) => return fail(&format!("serialize fixtures: {err}")),
            };
            (set, json)
        }
    };

    let results = TestRunner::new(campaign).run(&set);
    let report = ConformanceReport::from_results(campaign, &json, &results);
    match report.to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => return fail(&format!("serialize report: {err}")),
    }
    if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn sample() -> ExitCode {
    match fixtures::smoke_set().to_json() {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => fail(&format!("serialize fixtures: {err}")),
    }
}

fn fail(message: &str) -> ExitCode {
    eprintln!("harness: {message}");
    ExitCode::FAILURE
}

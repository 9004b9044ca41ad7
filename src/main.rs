use clap::Parser;
use filerev::cli::Cli;
use filerev::config::{self, PublishConfig, RevisionConfig};
use filerev::error::{IoOp, RevisionError};
use filerev::fs::LocalFileSystem;
use filerev::logging;
use filerev::reporter::{HttpPublisher, Publisher};
use filerev::revision::{RevisionReport, compute_revision};
use log::info;
use serde::Serialize;
use std::process::ExitCode;

const STANDALONE_MESSAGE: &str =
    "This is a Reeve CI pipeline step and is not intended to be used on its own.";

#[derive(Serialize)]
struct Summary<'a> {
    key: &'a str,
    published: bool,
    #[serde(flatten)]
    report: &'a RevisionReport,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::init_logging(cli.logging_mode, cli.debug) {
        eprintln!("Failed to initialize logging: {}", err);
    }
    info!("filerev starting");
    info!("args: {:?}", std::env::args().collect::<Vec<_>>());

    let publish = PublishConfig::from_cli(&cli);
    if publish.is_none() && !cli.dry_run {
        println!("{}", STANDALONE_MESSAGE);
        return ExitCode::from(1);
    }

    let target = if cli.dry_run { None } else { publish.as_ref() };
    match run(&cli, target) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: &Cli, target: Option<&PublishConfig>) -> Result<(), RevisionError> {
    let cwd = std::env::current_dir().map_err(|err| RevisionError::io(IoOp::Resolve, ".", err))?;
    let revision_config = RevisionConfig::from_cli(cli, &cwd)?;
    info!(
        "base dir: {}, non regular files: {}",
        revision_config.base_dir.display(),
        revision_config.non_regular
    );

    let fs = LocalFileSystem::new(&revision_config.base_dir);
    let report = compute_revision(&revision_config, &fs)?;

    let key = match target {
        Some(target) => {
            HttpPublisher::new(&target.api_url)?.publish(&target.key, report.revision.as_str())?;
            target.key.clone()
        }
        None => config::revision_key(cli.revision_var.as_deref()),
    };

    if cli.json {
        let summary = Summary {
            key: &key,
            published: target.is_some(),
            report: &report,
        };
        let output = serde_json::to_string_pretty(&summary)
            .map_err(|err| RevisionError::Serialization(err.to_string()))?;
        println!("{}", output);
    } else if target.is_some() {
        println!("Set {}={}", key, report.revision);
    } else {
        println!("{}={}", key, report.revision);
    }
    Ok(())
}

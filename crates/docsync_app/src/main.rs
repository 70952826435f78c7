mod cli;
mod config;
mod logging;
mod progress;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use docsync_core::{SyncStatus, SyncSummary};
use docsync_engine::{
    utc_clock, FetchSettings, Fetcher, GitCloner, ReqwestFetcher, RepositoryCloner, SyncPipeline,
};
use sync_logging::{enter_source, sync_error, sync_info};

use crate::cli::Cli;
use crate::config::{load_config, select_sources};
use crate::progress::LogProgressSink;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.verbose, cli.log_file.as_deref());

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            sync_error!("{:#}", err);
            ExitCode::from(2)
        }
    }
}

/// Syncs every selected source in turn. `Ok(false)` means at least one source aborted;
/// failures of single documents do not count.
fn run(cli: &Cli) -> Result<bool> {
    let sources = select_sources(load_config(&cli.config)?, &cli.sources)?;
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let cloner: Arc<dyn RepositoryCloner> = Arc::new(GitCloner::default());

    let mut all_results = Vec::new();
    let mut aborted = 0;
    for config in &sources {
        let _label = enter_source(config.name.as_str());
        sync_info!(
            "syncing {} source into {}{}",
            config.source.kind(),
            config.output_dir.display(),
            if cli.dry_run { " (dry run)" } else { "" }
        );
        let pipeline =
            SyncPipeline::from_config(config, fetcher.clone(), cloner.clone(), utc_clock());
        match runtime.block_on(pipeline.run(cli.dry_run, &LogProgressSink)) {
            Ok(report) => {
                for result in &report.results {
                    if result.status == SyncStatus::Skipped {
                        println!(
                            "{}: would write {} ({} bytes)",
                            config.name, result.output_path, result.size_bytes
                        );
                    }
                }
                println!("{}: {}", config.name, report.summary);
                all_results.extend(report.results);
            }
            Err(err) => {
                sync_error!("sync aborted: {}", err);
                println!("{}: aborted: {}", config.name, err);
                aborted += 1;
            }
        }
    }

    if sources.len() > 1 {
        println!(
            "total: {} ({} of {} sources aborted)",
            SyncSummary::from_results(&all_results),
            aborted,
            sources.len()
        );
    }
    Ok(aborted == 0)
}

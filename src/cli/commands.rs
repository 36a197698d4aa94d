use crate::cli::args::{Cli, Commands};
use crate::config::{ConfigOverrides, StreamConfig};
use crate::error::Result;
use crate::models::StationCatalog;
use crate::processors::BatchAggregator;
use crate::readers::StationReader;
use crate::streaming::{LineSource, StreamingPipeline};
use crate::utils::progress::ProgressReporter;
use crate::writers::RowWriter;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{info, Level};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Stream {
            stations,
            host,
            port,
            input,
            config,
            window_length_ms,
            tick_interval_ms,
            max_buffered,
            overflow_policy,
            format,
        } => {
            let config = StreamConfig::load(config.as_deref())?.with_overrides(ConfigOverrides {
                window_length_ms,
                tick_interval_ms,
                max_buffered,
                overflow_policy,
                output_format: format,
            })?;

            let catalog = Arc::new(StationReader::new().read_catalog(&stations)?);

            let source = match (host, input) {
                (Some(host), _) => LineSource::Tcp { host, port },
                (None, Some(path)) => LineSource::File(path),
                (None, None) => LineSource::Stdin,
            };
            let lines = source.open().await?;
            info!(source = %source, "Opened line source");

            let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = shutdown_tx.send(());
                }
            });

            let sink = config.output_format.sink(std::io::stdout());
            let pipeline = StreamingPipeline::new(catalog, &config);
            let stats = pipeline.run(lines, sink, shutdown_rx).await?;

            eprintln!("\n{}", stats.summary());
        }

        Commands::Aggregate {
            stations,
            weather,
            output,
            max_workers,
            mmap,
        } => {
            println!("Aggregating weather observations...");
            println!("Stations: {}", stations.display());
            println!("Observations: {}", weather.display());
            println!("Workers: {}", max_workers);

            let catalog = StationReader::new().read_catalog(&stations)?;
            let progress = ProgressReporter::new_spinner("Loading observations...", false);

            let outcome = BatchAggregator::new(max_workers)
                .with_mmap(mmap)
                .aggregate_file(&weather, &catalog, Some(&progress))?;

            println!("\n{}", outcome.report.summary());

            if outcome.rows.is_empty() {
                println!("No rows aggregated, writing an empty result");
            }

            let written = RowWriter::new().write_rows(&outcome.rows, &output)?;
            println!("Wrote {} rows to {}", written, output.display());
        }

        Commands::Validate {
            stations,
            weather,
            max_workers,
        } => {
            println!("Validating weather observations...");
            println!("Observations: {}", weather.display());

            let catalog = match stations {
                Some(path) => StationReader::new().read_catalog(&path)?,
                None => StationCatalog::default(),
            };
            let progress = ProgressReporter::new_spinner("Validating observations...", false);

            let outcome = BatchAggregator::new(max_workers).aggregate_file(
                &weather,
                &catalog,
                Some(&progress),
            )?;

            println!("\n{}", outcome.report.summary());

            if outcome.report.malformed == 0 {
                println!("✅ All observation lines parsed");
            } else {
                println!(
                    "⚠️  Found {} malformed observation lines",
                    outcome.report.malformed
                );
            }
        }
    }

    Ok(())
}

/// Logs go to stderr (stdout carries stream results) or to `log_file`.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt().with_max_level(level).with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    // A global subscriber may already be installed by an embedding program.
    if let Err(e) = installed {
        eprintln!("Logging not initialised: {}", e);
    }
    Ok(())
}

use clap::Parser;
use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

use pgnsync::cli::{Cli, Commands};
use pgnsync::config::Config;
use pgnsync::errors::ErrorKind;
use pgnsync::models::SyncSummary;
use pgnsync::pipeline::{self, ArchiveDecision, CancelFlag};
use pgnsync::remote::ChessComClient;
use pgnsync::status;
use pgnsync::storage::LocalVault;

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "pgnsync=info");
    }

    // Initialize logging to both console and file
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let file_appender = tracing_appender::rolling::never(".", "pgnsync.log");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env())
        )
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env())
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match &cli.command {
        Commands::Sync { config: overrides, blob_policy, concurrency, json } => {
            overrides.apply(&mut config);
            if let Some(policy) = blob_policy {
                config.blob_policy = *policy;
            }
            if let Some(concurrency) = concurrency {
                config.fetch_concurrency = *concurrency;
            }

            let sync_config = config.sync_config()?;
            let source = ChessComClient::new(&config)?;
            let vault = LocalVault::new(".");

            let cancel = CancelFlag::new();
            let on_ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, stopping after the current archive");
                    on_ctrl_c.cancel();
                }
            });

            let summary = pipeline::run_sync(&source, &vault, &sync_config, &cancel).await?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }

        Commands::Archives { config: overrides } => {
            overrides.apply(&mut config);
            let sync_config = config.sync_config()?;
            let source = ChessComClient::new(&config)?;

            let planned = pipeline::list_archives(&source, &sync_config.account, sync_config.cutoff).await?;
            for archive in &planned {
                match &archive.decision {
                    ArchiveDecision::Included(date) => println!("{}  sync     {}", date, archive.reference),
                    ArchiveDecision::Excluded(date) => println!("{}  skip     {}", date, archive.reference),
                    ArchiveDecision::Malformed(e) => println!("???????  invalid  {} ({})", archive.reference, e),
                }
            }
            info!("Listed {} archives", planned.len());
        }

        Commands::Status { output } => {
            if let Some(output) = output {
                config.output_dir = output.into();
            }

            let mirror = status::scan_mirror(Path::new(config.output_dir_str()))?;
            println!("Mirror: {}", config.output_dir.display());
            println!("Game files: {}", mirror.game_files);
            println!("Monthly archives: {}", mirror.months.len());
            for month in &mirror.months {
                println!("  {}", month);
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &SyncSummary) {
    println!(
        "Archives: {} listed, {} included, {} processed",
        summary.archives_listed, summary.archives_included, summary.archives_processed
    );
    println!(
        "Games: {} found, {} written, {} already present",
        summary.games_found, summary.games_materialized, summary.games_skipped
    );
    println!("Errors: {}", summary.errors.total());
    for kind in [
        ErrorKind::RemoteUnavailable,
        ErrorKind::MalformedArchiveReference,
        ErrorKind::MissingRequiredField,
        ErrorKind::FilesystemFailure,
    ] {
        let count = summary.errors.get(kind);
        if count > 0 {
            println!("  {}: {}", kind.as_str(), count);
        }
    }
    for message in &summary.error_messages {
        println!("  - {}", message);
    }
    if summary.cancelled {
        println!("Run was cancelled before all archives were processed");
    }
}

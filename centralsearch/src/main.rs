//! Central Search - command-line replicator.
//!
//! Copies records from a source search backend into the central index,
//! mapping each record through a source-specific profile.

use clap::Parser;
use std::error::Error;
use tracing::{error, info};

use centralsearch::cli::{Cli, Commands, SourceArgs};
use centralsearch::logging::init_tracing;
use centralsearch::{interrupted, AppError, CopySettings, Dependencies};
use centralsearch_pipeline::{ProfileRegistry, RetryPolicy, SourceConnector};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let result = tokio::select! {
        result = run(cli) => result,
        _ = interrupted(tokio::signal::ctrl_c()) => {
            info!("Received shutdown signal");
            eprintln!("Interrupted");
            std::process::exit(130);
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Run failed");
        eprintln!("Error: {}", e);

        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("  Caused by: {}", err);
            source = err.source();
        }

        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Copy(args) => {
            let settings = CopySettings::from_args(args)?;
            copy(&settings).await
        }
        Commands::Histogram(args) => histogram(&args).await,
        Commands::Profiles => {
            let registry = ProfileRegistry::builtin()?;
            for name in registry.names() {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

async fn copy(settings: &CopySettings) -> Result<(), AppError> {
    let dependencies = Dependencies::new(settings).await?;

    let summary = dependencies
        .replicator
        .run(dependencies.query, dependencies.progress.as_ref())
        .await?;

    let total = summary
        .total
        .map_or_else(|| "?".to_string(), |total| total.to_string());
    println!(
        "Copied {}/{} records ({} failed)",
        summary.succeeded, total, summary.failed
    );
    Ok(())
}

async fn histogram(args: &SourceArgs) -> Result<(), AppError> {
    if args.page_size == 0 {
        return Err(AppError::config("--page-size must be greater than zero"));
    }

    let connector = SourceConnector::new(args.source_type, &args.source_url, RetryPolicy::page_fetch())?;
    let filter = args.source_query.as_deref().unwrap_or(centralsearch::config::DEFAULT_SOURCE_QUERY);

    let histogram = connector.field_histogram(filter, args.page_size).await?;
    for (field, count) in histogram {
        println!("{}\t{}", field, count);
    }
    Ok(())
}

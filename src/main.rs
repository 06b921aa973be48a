mod cli;
mod enumerate;
mod error;
mod executor;
mod storage;
mod types;

use anyhow::bail;
use chrono::NaiveDate;
use clap::Parser;
use cli::{Cli, Commands};
use colored::*;
use executor::{Executor, FailurePolicy};
use log::{error, info};
use std::path::Path;
use std::sync::Arc;
use storage::{ObjectStorage, WebdavClient};
use types::{NamingPolicy, TransferKind, TransferStatus, TransferSummary};

/// Public read-only bucket holding the NWP model runs.
const BUCKET: &str = "mf-nwp-models";

/// Concurrency ceiling shared by all commands.
const MAX_WORKERS: usize = 8;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let summary = match cli.command {
        Commands::S3download {
            model,
            run_date,
            flatten,
        } => s3download(&model, run_date, flatten).await?,
        Commands::S3upload {
            s3_host,
            bucket_name,
            glob_pattern,
            incremental_names,
        } => s3upload(&s3_host, &bucket_name, &glob_pattern, incremental_names).await?,
        Commands::Webdavupload {
            host,
            prefix,
            glob_pattern,
            incremental_names,
        } => webdavupload(&host, &prefix, &glob_pattern, incremental_names).await?,
    };

    print_summary(&summary);

    if summary.failed > 0 {
        error!("{} transfers failed", summary.failed);
        bail!("Some transfers failed");
    }
    Ok(())
}

async fn s3download(
    model: &str,
    run_date: NaiveDate,
    flatten: bool,
) -> anyhow::Result<TransferSummary> {
    println!("Downloading model {} for date {}", model, run_date);
    let prefix = format!("{}/v2/{}/", model, run_date.format("%Y-%m-%d"));
    println!("Prefix is {}", prefix);

    let storage = Arc::new(ObjectStorage::anonymous(BUCKET)?);
    let keys = storage.list_keys(&prefix).await?;
    info!("Listing returned {} keys", keys.len());
    let tasks = enumerate::download_tasks(&keys, flatten);

    let executor = Executor::new(MAX_WORKERS, FailurePolicy::ContinueOnError);
    let summary = executor
        .run(tasks, |task| {
            let storage = storage.clone();
            async move {
                storage
                    .download(&task.source, Path::new(&task.destination))
                    .await
            }
        })
        .await;
    Ok(summary)
}

async fn s3upload(
    s3_host: &str,
    bucket_name: &str,
    glob_pattern: &str,
    incremental_names: bool,
) -> anyhow::Result<TransferSummary> {
    let naming = naming_policy(incremental_names);
    let tasks = enumerate::upload_tasks(
        glob_pattern,
        Path::new("."),
        naming,
        TransferKind::UploadBucket,
    )?;

    let storage = Arc::new(ObjectStorage::with_endpoint(s3_host, bucket_name)?);
    let executor = Executor::new(MAX_WORKERS, FailurePolicy::ContinueOnError);
    let summary = executor
        .run(tasks, |task| {
            let storage = storage.clone();
            async move {
                storage
                    .upload(Path::new(&task.source), &task.destination)
                    .await
            }
        })
        .await;
    Ok(summary)
}

async fn webdavupload(
    host: &str,
    prefix: &str,
    glob_pattern: &str,
    incremental_names: bool,
) -> anyhow::Result<TransferSummary> {
    let naming = naming_policy(incremental_names);
    let tasks = enumerate::upload_tasks(
        glob_pattern,
        Path::new("."),
        naming,
        TransferKind::UploadWebdav,
    )?;

    let webdav = Arc::new(WebdavClient::new(host, prefix));
    let executor = Executor::new(MAX_WORKERS, FailurePolicy::ContinueOnError);
    let summary = executor
        .run(tasks, |task| {
            let webdav = webdav.clone();
            async move {
                webdav
                    .put_file(Path::new(&task.source), &task.destination)
                    .await
            }
        })
        .await;
    Ok(summary)
}

fn naming_policy(incremental_names: bool) -> NamingPolicy {
    if incremental_names {
        NamingPolicy::Incremental
    } else {
        NamingPolicy::Original
    }
}

fn print_summary(summary: &TransferSummary) {
    println!("\n{}", "Transfer Summary:".bold());
    println!("Total transfers: {} files", summary.total);
    if summary.total > 0 {
        println!(
            "Success rate: {:.1}% ({} files)",
            (summary.succeeded as f64 / summary.total as f64) * 100.0,
            summary.succeeded.to_string().green()
        );
        println!(
            "Failure rate: {:.1}% ({} files)",
            (summary.failed as f64 / summary.total as f64) * 100.0,
            summary.failed.to_string().red()
        );
    }
    println!("Total duration: {:.2?}", summary.total_duration);

    if summary.failed > 0 {
        println!("\n{}", "Failed Transfers:".red().bold());
        for report in summary
            .reports
            .iter()
            .filter(|r| r.status == TransferStatus::Failed)
        {
            println!(
                "✗ {} - Error: {}",
                report.task.source.red(),
                report.error.as_deref().unwrap_or("unknown")
            );
        }
    } else if summary.total > 0 {
        println!("\n{}", "All transfers completed successfully".green());
    }
}

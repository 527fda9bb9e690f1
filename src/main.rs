//! vkdisk-rs: copy the most recent photos of a VK user to Yandex Disk.
//!
//! Photo metadata comes from VK's `photos.get`; for each photo the largest
//! stored size is chosen and named after its like count. Photos are staged
//! locally, then uploaded through Disk upload links. Transient network
//! failures are retried with exponential backoff.

#![warn(clippy::all)]

mod cli;
mod config;
mod disk;
mod export;
mod pipeline;
pub mod retry;
#[cfg(test)]
mod test_support;
mod transfer;
mod types;
mod vk;

use clap::Parser;
use tracing_subscriber::EnvFilter;

const USER_AGENT: &str = concat!("vkdisk-rs/", env!("CARGO_PKG_VERSION"));

fn print_report(report: &pipeline::RunReport, folder: &str) {
    println!();
    println!("Photos:");
    for (record, outcome) in report.entries() {
        println!(
            "  {:<28} {:>2}  {:>6} likes  {}  {}",
            disk::file_path(folder, record.file_name()),
            record.size_kind(),
            record.like_count(),
            record.captured_at().format("%Y-%m-%d %H:%M:%S"),
            outcome
        );
    }
    if !report.malformed.is_empty() {
        println!();
        println!("Skipped:");
        for bad in &report.malformed {
            println!("  {}", bad);
        }
    }
    println!();
    println!("Results:");
    println!("  Uploaded: {}", report.uploaded());
    println!("  Failed:   {}", report.failed());
    println!("  Skipped:  {}", report.malformed.len());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    let config = config::Config::from_cli(cli)?;
    tracing::debug!(?config, "Configuration");
    tracing::info!(concurrency = config.threads_num, "Starting vkdisk-rs");

    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout())
        .build()?;
    let retry = config.retry_config();

    let source = vk::VkClient::new(
        http.clone(),
        &config.vk_api_url,
        config.vk_token.clone(),
        retry,
    );
    let destination = disk::YandexDisk::new(
        http.clone(),
        &config.disk_api_url,
        config.disk_token.clone(),
        config.overwrite,
        retry,
    );

    let pipeline_config = config.pipeline_config();
    let report = pipeline::run(&source, &destination, &http, &pipeline_config).await?;
    print_report(&report, &config.folder);

    if report.failed() > 0 {
        tracing::warn!(
            "{} of {} photo(s) were not copied",
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(())
}

use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::PipelineConfig;
use crate::retry::RetryConfig;
use crate::transfer::TransferConfig;
use crate::types::Album;
use crate::vk::fetch::MAX_PAGE_SIZE;

/// Application configuration.
///
/// Fields are ordered for optimal memory layout:
/// - Heap types first (String, PathBuf)
/// - 8-byte primitives
/// - 4-byte primitives
/// - 2-byte primitives
/// - 1-byte enums
/// - All booleans grouped at the end
pub struct Config {
    // Heap types first
    pub disk_token: String,
    pub vk_token: String,
    pub folder: String,
    pub staging_dir: PathBuf,
    pub snapshot_path: PathBuf,
    pub vk_api_url: String,
    pub disk_api_url: String,

    // 8-byte primitives
    pub owner_id: i64,
    pub count: u64,
    pub page_size: u64,
    pub retry_delay_secs: u64,
    pub timeout_secs: u64,

    // 4-byte primitives
    pub max_retries: u32,

    // 2-byte primitives
    pub threads_num: u16,

    // 1-byte enums
    pub album: Album,

    // All booleans grouped together
    pub overwrite: bool,
    pub no_progress_bar: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("owner_id", &self.owner_id)
            .field("album", &self.album)
            .field("count", &self.count)
            .field("folder", &self.folder)
            .field("disk_token", &"<redacted>")
            .field("vk_token", &"<redacted>")
            .field("staging_dir", &self.staging_dir)
            .field("snapshot_path", &self.snapshot_path)
            .field("threads_num", &self.threads_num)
            .finish_non_exhaustive()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Config {
    pub fn from_cli(cli: crate::cli::Cli) -> anyhow::Result<Self> {
        let disk_token = cli.disk_token.trim().to_string();
        let vk_token = cli.vk_token.trim().to_string();
        if disk_token.is_empty() {
            anyhow::bail!("Yandex Disk token is empty (--disk-token / YANDEX_DISK_TOKEN)");
        }
        if vk_token.is_empty() {
            anyhow::bail!("VK access token is empty (--vk-token / VK_ACCESS_TOKEN)");
        }
        if cli.threads_num == 0 {
            anyhow::bail!("--threads must be at least 1");
        }
        if cli.timeout == 0 {
            anyhow::bail!("--timeout must be at least 1 second");
        }
        if !(1..=MAX_PAGE_SIZE).contains(&cli.page_size) {
            anyhow::bail!(
                "--page-size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE,
                cli.page_size
            );
        }
        let folder = cli.folder.trim_matches('/').to_string();
        if folder.is_empty() {
            anyhow::bail!("--folder must name a folder, not the disk root");
        }

        Ok(Self {
            disk_token,
            vk_token,
            folder,
            staging_dir: expand_tilde(&cli.staging_dir),
            snapshot_path: expand_tilde(&cli.snapshot),
            vk_api_url: cli.vk_api_url,
            disk_api_url: cli.disk_api_url,
            owner_id: cli.owner_id,
            count: cli.count,
            page_size: cli.page_size,
            retry_delay_secs: cli.retry_delay,
            timeout_secs: cli.timeout,
            max_retries: cli.max_retries,
            threads_num: cli.threads_num,
            album: cli.album,
            overwrite: cli.overwrite,
            no_progress_bar: cli.no_progress_bar,
        })
    }

    pub fn retry_config(&self) -> RetryConfig {
        let defaults = RetryConfig::default();
        RetryConfig {
            max_retries: self.max_retries,
            base_delay_secs: self.retry_delay_secs,
            max_delay_secs: defaults.max_delay_secs.max(self.retry_delay_secs),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            owner_id: self.owner_id,
            album: self.album,
            count: self.count,
            folder: self.folder.clone(),
            snapshot_path: self.snapshot_path.clone(),
            page_size: self.page_size,
            transfer: TransferConfig {
                staging_dir: self.staging_dir.clone(),
                concurrency: usize::from(self.threads_num),
                retry: self.retry_config(),
                no_progress_bar: self.no_progress_bar,
            },
        }
    }
}

use clap::Parser;

use crate::types::{Album, LogLevel};

#[derive(Parser, Debug)]
#[command(
    name = "vkdisk-rs",
    version,
    about = "Copy the most recent photos of a VK user to a Yandex Disk folder"
)]
pub struct Cli {
    /// Numeric VK user id whose photos are copied
    #[arg(allow_negative_numbers = true)]
    pub owner_id: i64,

    /// Yandex Disk OAuth token.
    /// WARNING: passing via --disk-token is visible in process listings.
    /// Prefer the YANDEX_DISK_TOKEN environment variable instead.
    #[arg(long, env = "YANDEX_DISK_TOKEN", hide_env_values = true)]
    pub disk_token: String,

    /// VK API access token
    #[arg(long, env = "VK_ACCESS_TOKEN", hide_env_values = true)]
    pub vk_token: String,

    /// VK album to read from
    #[arg(short = 'a', long, value_enum, default_value = "wall")]
    pub album: Album,

    /// Number of photos to copy, newest first
    #[arg(short = 'n', long, default_value_t = 20)]
    pub count: u64,

    /// Destination folder in the root of the disk
    #[arg(short = 'f', long, default_value = "Image")]
    pub folder: String,

    /// Local directory photos are staged in before upload
    #[arg(long, default_value = "images")]
    pub staging_dir: String,

    /// Where the JSON list of exported photos is written
    #[arg(long, default_value = "result.json")]
    pub snapshot: String,

    /// Number of concurrent downloads and uploads
    #[arg(long = "threads", alias = "threads-num", default_value_t = 4)]
    pub threads_num: u16,

    /// Photos requested per `photos.get` call (1-1000)
    #[arg(long, default_value_t = 1000)]
    pub page_size: u64,

    /// Max retries per network call on transient failures (0 = no retries)
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,

    /// Initial retry delay in seconds
    #[arg(long, default_value_t = 5)]
    pub retry_delay: u64,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Replace files that already exist in the destination folder
    #[arg(long)]
    pub overwrite: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,

    /// VK API base URL
    #[arg(long, default_value = crate::vk::DEFAULT_API_URL, hide = true)]
    pub vk_api_url: String,

    /// Yandex Disk API base URL
    #[arg(long, default_value = crate::disk::DEFAULT_API_URL, hide = true)]
    pub disk_api_url: String,
}

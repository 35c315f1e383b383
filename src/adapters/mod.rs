// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod fal_queue;
pub mod fs_local;
pub mod http_download;
pub mod probe_ffprobe;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::FFmpegAdapter;
pub use fal_queue::{FalConfig, FalQueueAdapter};
pub use fs_local::FsLocalAdapter;
pub use http_download::HttpDownloadAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use toml_config::{AppConfig, TomlConfigAdapter};

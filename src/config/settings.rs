use crate::config::env::{self, EnvKey};

const DEFAULT_ALLOWED_MIME: &str = "video/mp4,video/x-matroska,video/webm,video/avi,video/quicktime,image/jpeg,image/png,image/webp";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub storage_dir: String,
    pub max_upload_mb: u64,
    pub allowed_mime_types: String,
    pub rate_limit_per_minute: i64,
    pub convert_workers: usize,
    pub convert_timeout_secs: u64,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            storage_dir: env::get_or(EnvKey::StorageDir, "./storage"),
            max_upload_mb: env::get_parsed(EnvKey::MaxUploadMb, 1024),
            allowed_mime_types: env::get_or(EnvKey::AllowedMimeTypes, DEFAULT_ALLOWED_MIME),
            rate_limit_per_minute: env::get_parsed(EnvKey::RateLimitPerMinute, 10),
            convert_workers: env::get_parsed(EnvKey::ConvertWorkers, 2),
            convert_timeout_secs: env::get_parsed(EnvKey::ConvertTimeoutSecs, 0),
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb * 1024 * 1024
    }

    pub fn allowed_mime(&self, content_type: &str) -> bool {
        self.allowed_mime_types
            .split(',')
            .any(|m| m.trim().eq_ignore_ascii_case(content_type))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

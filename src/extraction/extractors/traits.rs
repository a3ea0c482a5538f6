// InfoExtractor trait and common types

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use tracing::debug;

use crate::extraction::errors::ExtractError;
use crate::extraction::models::RawExtractionResult;
use crate::extraction::utils::is_youtube_url;

/// Extraction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorMode {
    /// Python module yt_dlp
    Python,
    /// CLI binary yt-dlp
    Cli,
    /// Python module when installed, CLI binary otherwise
    #[default]
    Auto,
}

impl fmt::Display for ExtractorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Cli => write!(f, "cli"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for ExtractorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "cli" => Ok(Self::Cli),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown extractor mode '{}'", other)),
        }
    }
}

/// Configuration for info extraction, built once at startup
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Extraction mode (Python, CLI, or Auto)
    pub mode: ExtractorMode,
    /// Python interpreter used for module mode
    pub python_cmd: Option<String>,
    /// yt-dlp binary used for CLI mode
    pub ytdlp_path: Option<String>,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Path to cookies.txt file
    pub cookies_path: Option<PathBuf>,
    /// Browser to read cookies from (e.g. "chrome")
    pub cookies_from_browser: Option<String>,
    /// Whole-extraction timeout in seconds
    pub timeout_seconds: u64,
    /// YouTube player client (android, web, tv)
    pub player_client: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            mode: ExtractorMode::Auto,
            python_cmd: None,
            ytdlp_path: None,
            proxy: None,
            cookies_path: None,
            cookies_from_browser: None,
            timeout_seconds: 60,
            player_client: None,
        }
    }
}

impl ExtractorConfig {
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_cookies_path(mut self, path: Option<PathBuf>) -> Self {
        self.cookies_path = path;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Engine arguments shared by both modes, URL last
    pub fn engine_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--skip-download".to_string(),
            "--socket-timeout".to_string(),
            self.timeout_seconds.to_string(),
        ];

        if let Some(client) = &self.player_client {
            if is_youtube_url(url) {
                args.push("--extractor-args".to_string());
                args.push(format!("youtube:player_client={}", client));
            }
        }

        // Cookies
        if let Some(path) = &self.cookies_path {
            args.push("--cookies".to_string());
            args.push(path.to_string_lossy().to_string());
        } else if let Some(browser) = &self.cookies_from_browser {
            args.push("--cookies-from-browser".to_string());
            args.push(browser.clone());
        }

        // Proxy
        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        // Keep option parsing from treating the URL as a flag
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}

/// Decode `--dump-json` output.
///
/// Empty output or a JSON `null` means the engine found nothing. Decoding runs on
/// the blocking pool since info dicts can be several megabytes.
pub async fn decode_info_json(stdout: Vec<u8>) -> Result<Option<RawExtractionResult>, ExtractError> {
    tokio::task::spawn_blocking(move || parse_info_json(&stdout))
        .await
        .map_err(|e| ExtractError::ExecutionError(format!("JSON decode task failed: {}", e)))?
}

pub fn parse_info_json(stdout: &[u8]) -> Result<Option<RawExtractionResult>, ExtractError> {
    let json_str = String::from_utf8_lossy(stdout);

    // --dump-json prints one object per line; only the first entry is used
    let first = match json_str.lines().map(str::trim).find(|l| !l.is_empty()) {
        Some(line) => line,
        None => {
            debug!("[InfoExtractor] engine produced no output");
            return Ok(None);
        }
    };

    let json: serde_json::Value = serde_json::from_str(first)
        .map_err(|e| ExtractError::ParseError(format!("Invalid JSON: {}", e)))?;

    Ok(RawExtractionResult::from_json(&json))
}

/// Trait for info extractors
#[async_trait]
pub trait InfoExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Check if this extractor is available
    fn is_available(&self) -> bool;

    /// Extract raw metadata for a URL; `Ok(None)` when the engine returned nothing
    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<Option<RawExtractionResult>, ExtractError>;
}

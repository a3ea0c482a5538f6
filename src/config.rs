//! Process configuration, read once at startup from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use crate::extraction::utils::expand_home;
use crate::extraction::{ExtractorConfig, ExtractorMode, FormatSelector};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Immutable service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub static_dir: PathBuf,
    pub max_formats: usize,
    pub extractor: ExtractorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            max_formats: FormatSelector::DEFAULT_MAX_FORMATS,
            extractor: ExtractorConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let max_formats = match get("MAX_FORMATS") {
            Some(v) => parse_positive("MAX_FORMATS", &v)?,
            None => defaults.max_formats,
        };

        let timeout_seconds = match get("EXTRACT_TIMEOUT_SECS") {
            Some(v) => parse_positive("EXTRACT_TIMEOUT_SECS", &v)? as u64,
            None => defaults.extractor.timeout_seconds,
        };

        let mode = match get("EXTRACTOR_MODE") {
            Some(v) => ExtractorMode::from_str(&v).map_err(|reason| ConfigError::InvalidValue {
                key: "EXTRACTOR_MODE",
                value: v.clone(),
                reason,
            })?,
            None => ExtractorMode::default(),
        };

        let cookies_path = get("COOKIES_FILE").and_then(|raw| {
            let path = expand_home(&raw);
            if path.is_file() {
                Some(path)
            } else {
                warn!("[Config] COOKIES_FILE {} does not exist, ignoring", path.display());
                None
            }
        });

        let extractor = ExtractorConfig {
            mode,
            python_cmd: get("YTDLP_PYTHON"),
            ytdlp_path: get("YTDLP_PATH"),
            proxy: get("EXTRACT_PROXY"),
            cookies_path,
            cookies_from_browser: get("COOKIES_FROM_BROWSER"),
            timeout_seconds,
            player_client: get("YTDLP_PLAYER_CLIENT"),
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            max_formats,
            extractor,
        })
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Err(e) => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.max_formats, 6);
        assert_eq!(config.extractor.mode, ExtractorMode::Auto);
        assert_eq!(config.extractor.timeout_seconds, 60);
        assert!(config.extractor.cookies_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("MAX_FORMATS", "3"),
            ("EXTRACTOR_MODE", "cli"),
            ("EXTRACT_TIMEOUT_SECS", "20"),
            ("EXTRACT_PROXY", "socks5://127.0.0.1:1080"),
            ("YTDLP_PATH", "/opt/yt-dlp"),
            ("YTDLP_PLAYER_CLIENT", "android"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.max_formats, 3);
        assert_eq!(config.extractor.mode, ExtractorMode::Cli);
        assert_eq!(config.extractor.timeout_seconds, 20);
        assert_eq!(config.extractor.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
        assert_eq!(config.extractor.ytdlp_path.as_deref(), Some("/opt/yt-dlp"));
        assert_eq!(config.extractor.player_client.as_deref(), Some("android"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = config_from(&[("BIND_ADDR", "  "), ("EXTRACT_PROXY", "")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert!(config.extractor.proxy.is_none());
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(matches!(
            config_from(&[("MAX_FORMATS", "0")]),
            Err(ConfigError::InvalidValue { key: "MAX_FORMATS", .. })
        ));
        assert!(matches!(
            config_from(&[("EXTRACT_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidValue { key: "EXTRACT_TIMEOUT_SECS", .. })
        ));
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let err = config_from(&[("EXTRACTOR_MODE", "lux")]).unwrap_err();
        assert!(err.to_string().contains("EXTRACTOR_MODE"));
    }

    #[test]
    fn test_missing_cookie_file_ignored() {
        let config = config_from(&[("COOKIES_FILE", "/nonexistent/cookies.txt")]).unwrap();
        assert!(config.extractor.cookies_path.is_none());
    }

    #[test]
    fn test_existing_cookie_file_kept() {
        let path = std::env::temp_dir().join("video-extract-api-test-cookies.txt");
        std::fs::write(&path, "# Netscape HTTP Cookie File\n").unwrap();

        let config = config_from(&[("COOKIES_FILE", path.to_str().unwrap())]).unwrap();
        assert_eq!(config.extractor.cookies_path, Some(path.clone()));

        let _ = std::fs::remove_file(path);
    }
}

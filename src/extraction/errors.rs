// Error types for the extraction gateway

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// yt-dlp binary or python module not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// URL rejected by the engine
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Engine output could not be decoded
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Child process could not be started or awaited
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Engine did not finish in time
    #[error("Extraction timed out after {0}s")]
    Timeout(u64),

    /// Engine exited with an error message
    #[error("{0}")]
    Engine(String),
}

// Classify engine stderr
impl From<String> for ExtractError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();

        if lower.contains("unsupported url") || lower.contains("is not a valid url") {
            return Self::InvalidUrl(s);
        }

        if lower.contains("command not found")
            || lower.contains("no module named yt_dlp")
            || lower.contains("no such file or directory")
        {
            return Self::ToolNotFound(s);
        }

        if lower.contains("invalid json") || lower.contains("failed to parse json") {
            return Self::ParseError(s);
        }

        Self::Engine(s)
    }
}

// InfoExtractor Orchestrator - engine selection
//
// Strategy:
// 1. Explicit mode: use that engine, fail if it is missing
// 2. Auto: Python module when installed, CLI binary otherwise
//
// Selection happens before the call. A failed extraction is returned as is,
// the other engine is never tried as a retry.

use async_trait::async_trait;
use tracing::{info, warn};

use super::cli::CliInfoExtractor;
use super::python::PythonInfoExtractor;
use super::traits::{ExtractorConfig, ExtractorMode, InfoExtractor};
use crate::extraction::errors::ExtractError;
use crate::extraction::models::RawExtractionResult;

/// Orchestrator that manages Python and CLI extractors
pub struct InfoExtractorOrchestrator {
    python: Box<dyn InfoExtractor>,
    cli: Box<dyn InfoExtractor>,
    mode: ExtractorMode,
}

impl InfoExtractorOrchestrator {
    /// Probe both engines using the overrides from `config`
    pub fn new(config: &ExtractorConfig) -> Self {
        Self::with_extractors(
            Box::new(PythonInfoExtractor::new(config.python_cmd.as_deref())),
            Box::new(CliInfoExtractor::new(config.ytdlp_path.as_deref())),
            config.mode,
        )
    }

    pub fn with_extractors(
        python: Box<dyn InfoExtractor>,
        cli: Box<dyn InfoExtractor>,
        mode: ExtractorMode,
    ) -> Self {
        let orchestrator = Self { python, cli, mode };
        match orchestrator.select() {
            Some(engine) => info!(
                "[Orchestrator] mode {} -> using {}",
                orchestrator.mode,
                engine.name()
            ),
            None => warn!(
                "[Orchestrator] mode {}: no extraction engine available (python: {}, cli: {})",
                orchestrator.mode,
                orchestrator.python.is_available(),
                orchestrator.cli.is_available()
            ),
        }
        orchestrator
    }

    /// Engine that will serve requests, if any
    pub fn select(&self) -> Option<&dyn InfoExtractor> {
        let engine: &dyn InfoExtractor = match self.mode {
            ExtractorMode::Python => self.python.as_ref(),
            ExtractorMode::Cli => self.cli.as_ref(),
            ExtractorMode::Auto if self.python.is_available() => self.python.as_ref(),
            ExtractorMode::Auto => self.cli.as_ref(),
        };
        engine.is_available().then_some(engine)
    }

    fn missing_tool_error(&self) -> ExtractError {
        let msg = match self.mode {
            ExtractorMode::Python => "Python yt_dlp module not installed (pip install yt-dlp)",
            ExtractorMode::Cli => "yt-dlp binary not found",
            ExtractorMode::Auto => "Neither Python yt_dlp nor yt-dlp binary available",
        };
        ExtractError::ToolNotFound(msg.to_string())
    }
}

#[async_trait]
impl InfoExtractor for InfoExtractorOrchestrator {
    fn name(&self) -> &'static str {
        self.select().map_or("unavailable", |e| e.name())
    }

    fn is_available(&self) -> bool {
        self.select().is_some()
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<Option<RawExtractionResult>, ExtractError> {
        let engine = self.select().ok_or_else(|| self.missing_tool_error())?;
        engine.extract(url, config).await
    }
}

// InfoExtractor module - metadata extraction through yt-dlp
//
// Provides two engines:
// - Python mode: `python3 -m yt_dlp`
// - CLI mode: native `yt-dlp` binary
//
// The orchestrator picks one at startup based on the configured mode and
// what is installed on the host.

mod cli;
mod diagnostics;
mod orchestrator;
mod python;
mod traits;

pub use cli::CliInfoExtractor;
pub use diagnostics::{diagnose_error, FailureReason};
pub use orchestrator::InfoExtractorOrchestrator;
pub use python::PythonInfoExtractor;
pub use traits::{decode_info_json, parse_info_json, ExtractorConfig, ExtractorMode, InfoExtractor};

// Extraction module - gateway to the engine plus format selection

pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod models;
pub mod utils;

pub use errors::ExtractError;
pub use extractors::{ExtractorConfig, ExtractorMode, InfoExtractor, InfoExtractorOrchestrator};
pub use format_selector::{FormatSelector, SelectionError};
pub use models::{ExtractionResult, RawExtractionResult, RawFormatCandidate, SelectedFormat};

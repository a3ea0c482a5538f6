//! Video extraction API
//!
//! Accepts a video page URL, asks yt-dlp for its metadata and returns a short,
//! ranked list of direct combined audio+video stream URLs.

pub mod api;
pub mod config;
pub mod extraction;

pub use api::{build_router, start_server, AppState};
pub use config::AppConfig;
pub use extraction::{ExtractionResult, FormatSelector, SelectedFormat};

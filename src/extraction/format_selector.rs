// FormatSelector - turns the engine's raw format list into a short list
// of direct combined audio+video streams.
//
// Stages, each consuming the whole output of the previous one:
// - normalize: fill defaults for every missing field
// - filter: keep streams with both tracks and a direct URL
// - rank: largest file first (stable)
// - dedupe: one stream per resolution label
// - bound: at most `max_formats` entries

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tracing::{debug, error};

use super::models::{ExtractionResult, RawExtractionResult, RawFormatCandidate, SelectedFormat};

/// Codec value meaning the track is absent
pub const CODEC_NONE: &str = "none";

const UNKNOWN_RESOLUTION: &str = "unknown";
const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_EXTRACTOR: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The engine produced no metadata at all
    #[error("Could not extract video information.")]
    ExtractionFailed,
}

/// Candidate with all defaults applied
#[derive(Debug, Clone, PartialEq)]
struct NormalizedFormat {
    format_id: String,
    ext: String,
    resolution: String,
    filesize: Option<u64>,
    url: String,
    vcodec: String,
    acodec: String,
}

impl NormalizedFormat {
    fn from_raw(raw: &RawFormatCandidate) -> Self {
        let resolution = non_empty(&raw.resolution)
            .or_else(|| non_empty(&raw.format_note))
            .unwrap_or(UNKNOWN_RESOLUTION)
            .to_string();

        // A zero primary size falls through to the approximation but is
        // still a known size when no approximation exists
        let filesize = raw
            .filesize
            .filter(|s| *s > 0)
            .or(raw.filesize_approx)
            .or(raw.filesize);

        Self {
            format_id: raw.format_id.clone().unwrap_or_default(),
            ext: raw.ext.clone().unwrap_or_default(),
            resolution,
            filesize,
            url: raw.url.clone().unwrap_or_default(),
            vcodec: raw.vcodec.clone().unwrap_or_else(|| CODEC_NONE.to_string()),
            acodec: raw.acodec.clone().unwrap_or_else(|| CODEC_NONE.to_string()),
        }
    }

    fn is_combined_stream(&self) -> bool {
        self.vcodec != CODEC_NONE && self.acodec != CODEC_NONE && !self.url.is_empty()
    }

    /// Size used for ranking
    fn effective_size(&self) -> u64 {
        self.filesize.unwrap_or(0)
    }

    fn into_selected(self) -> SelectedFormat {
        SelectedFormat {
            format_id: self.format_id,
            ext: self.ext,
            resolution: self.resolution,
            filesize: self.filesize,
            url: self.url,
            vcodec: self.vcodec,
            acodec: self.acodec,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Format selector with a fixed output bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSelector {
    max_formats: usize,
}

impl Default for FormatSelector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_FORMATS)
    }
}

impl FormatSelector {
    pub const DEFAULT_MAX_FORMATS: usize = 6;

    pub fn new(max_formats: usize) -> Self {
        Self { max_formats }
    }

    /// Run the whole pipeline over a raw candidate list
    pub fn select(&self, candidates: &[RawFormatCandidate]) -> Vec<SelectedFormat> {
        let normalized: Vec<NormalizedFormat> =
            candidates.iter().map(NormalizedFormat::from_raw).collect();
        let combined = Self::filter_combined(normalized);
        let ranked = Self::rank(combined);
        let unique = Self::dedupe_by_resolution(ranked);

        debug!(
            "[FormatSelector] {} candidates -> {} unique combined streams",
            candidates.len(),
            unique.len()
        );

        self.bound(unique)
            .into_iter()
            .map(NormalizedFormat::into_selected)
            .collect()
    }

    /// Build the response payload from engine output.
    ///
    /// `None` means the engine gave nothing back and is reported as
    /// [`SelectionError::ExtractionFailed`]. An empty format list is a success.
    pub fn build_result(
        &self,
        raw: Option<RawExtractionResult>,
        original_url: &str,
    ) -> Result<ExtractionResult, SelectionError> {
        let raw = raw.ok_or(SelectionError::ExtractionFailed)?;

        let formats = contain_defects(|| self.select(&raw.formats));

        Ok(ExtractionResult {
            title: raw.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            thumbnail: raw.thumbnail.unwrap_or_default(),
            duration: raw.duration,
            formats,
            original_url: original_url.to_string(),
            extractor: raw.extractor.unwrap_or_else(|| UNKNOWN_EXTRACTOR.to_string()),
        })
    }

    fn filter_combined(formats: Vec<NormalizedFormat>) -> Vec<NormalizedFormat> {
        formats.into_iter().filter(|f| f.is_combined_stream()).collect()
    }

    // sort_by is stable, equal keys keep input order
    fn rank(mut formats: Vec<NormalizedFormat>) -> Vec<NormalizedFormat> {
        formats.sort_by(|a, b| {
            b.effective_size()
                .cmp(&a.effective_size())
                .then_with(|| b.filesize.is_some().cmp(&a.filesize.is_some()))
        });
        formats
    }

    fn dedupe_by_resolution(formats: Vec<NormalizedFormat>) -> Vec<NormalizedFormat> {
        let mut seen: HashSet<String> = HashSet::with_capacity(formats.len());
        formats
            .into_iter()
            .filter(|f| seen.insert(f.resolution.clone()))
            .collect()
    }

    fn bound(&self, mut formats: Vec<NormalizedFormat>) -> Vec<NormalizedFormat> {
        formats.truncate(self.max_formats);
        formats
    }
}

// A panic inside the pipeline must not take the request down with it;
// metadata is still worth returning.
fn contain_defects<F>(select: F) -> Vec<SelectedFormat>
where
    F: FnOnce() -> Vec<SelectedFormat>,
{
    match panic::catch_unwind(AssertUnwindSafe(select)) {
        Ok(formats) => formats,
        Err(cause) => {
            let msg = cause
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("[FormatSelector] pipeline defect, returning no formats: {}", msg);
            Vec::new()
        }
    }
}

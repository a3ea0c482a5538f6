// Data models shared by the gateway, the selector and the API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of the engine's `formats` array, untrusted.
///
/// Every field is optional; values with an unexpected JSON type are kept as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFormatCandidate {
    pub format_id: Option<String>,
    pub ext: Option<String>,
    pub resolution: Option<String>,
    pub format_note: Option<String>,
    pub filesize: Option<u64>,
    pub filesize_approx: Option<u64>,
    pub url: Option<String>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
}

impl RawFormatCandidate {
    pub fn from_json(f: &Value) -> Self {
        Self {
            format_id: json_string(&f["format_id"]),
            ext: json_string(&f["ext"]),
            resolution: json_string(&f["resolution"]),
            format_note: json_string(&f["format_note"]),
            filesize: json_size(&f["filesize"]),
            filesize_approx: json_size(&f["filesize_approx"]),
            url: json_string(&f["url"]),
            vcodec: json_string(&f["vcodec"]),
            acodec: json_string(&f["acodec"]),
        }
    }
}

/// Metadata returned by the engine for a single URL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawExtractionResult {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: Option<f64>,
    pub extractor: Option<String>,
    pub formats: Vec<RawFormatCandidate>,
}

impl RawExtractionResult {
    /// Build from the engine's info dict. `null` or a non-object yields `None`.
    pub fn from_json(json: &Value) -> Option<Self> {
        let obj = json.as_object()?;
        if obj.is_empty() {
            return None;
        }

        let formats = json["formats"]
            .as_array()
            .map(|arr| arr.iter().map(RawFormatCandidate::from_json).collect())
            .unwrap_or_default();

        Some(Self {
            title: json_string(&json["title"]),
            thumbnail: json_string(&json["thumbnail"]),
            duration: json["duration"].as_f64().filter(|d| d.is_finite() && *d >= 0.0),
            extractor: json_string(&json["extractor"]),
            formats,
        })
    }
}

/// A validated combined audio+video stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedFormat {
    pub format_id: String,
    pub ext: String,
    pub resolution: String,
    pub filesize: Option<u64>,
    pub url: String,
    pub vcodec: String,
    pub acodec: String,
}

/// Response payload for one extraction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    pub thumbnail: String,
    pub duration: Option<f64>,
    pub formats: Vec<SelectedFormat>,
    pub original_url: String,
    pub extractor: String,
}

fn json_string(v: &Value) -> Option<String> {
    v.as_str().map(|s| s.to_string())
}

// Sizes sometimes come through as floats (e.g. filesize_approx)
fn json_size(v: &Value) -> Option<u64> {
    v.as_u64().or_else(|| {
        v.as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64)
    })
}

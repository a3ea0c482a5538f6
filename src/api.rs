//! HTTP surface: `POST /api/extract`, `GET /api/health` and the static UI.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use url::Url;

use crate::config::AppConfig;
use crate::extraction::extractors::diagnose_error;
use crate::extraction::{
    ExtractError, ExtractionResult, ExtractorConfig, FormatSelector, InfoExtractor,
    InfoExtractorOrchestrator, SelectionError,
};

/// State shared across handlers; read-only after startup
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn InfoExtractor>,
    pub extractor_config: Arc<ExtractorConfig>,
    pub selector: FormatSelector,
}

impl AppState {
    pub fn new(
        extractor: Arc<dyn InfoExtractor>,
        extractor_config: ExtractorConfig,
        selector: FormatSelector,
    ) -> Self {
        Self {
            extractor,
            extractor_config: Arc::new(extractor_config),
            selector,
        }
    }

    /// Probe the installed engines and build state from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let orchestrator = InfoExtractorOrchestrator::new(&config.extractor);
        Self::new(
            Arc::new(orchestrator),
            config.extractor.clone(),
            FormatSelector::new(config.max_formats),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EngineStatus {
    pub name: String,
    pub available: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine: EngineStatus,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
    reason: Option<&'static str>,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
            reason: None,
        }
    }

    fn internal(detail: impl Into<String>, reason: Option<&'static str>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
            reason,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ExtractError> for ApiError {
    fn from(e: ExtractError) -> Self {
        let reason = diagnose_error(&e.to_string()).map(|r| r.as_str());
        Self::internal(e.to_string(), reason)
    }
}

impl From<SelectionError> for ApiError {
    fn from(e: SelectionError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
            reason: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            detail: self.detail,
            reason: self.reason,
        });
        (self.status, body).into_response()
    }
}

/// Accept only absolute http(s) URLs with a host
pub fn validate_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ApiError::bad_request(format!("Invalid URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::bad_request(format!(
            "Invalid URL: unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ApiError::bad_request("Invalid URL: missing host"));
    }

    Ok(url)
}

/// Extract video metadata and direct stream URLs for a page URL
pub async fn extract_video_info(
    State(state): State<AppState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let Json(request) = payload?;
    let url = validate_url(&request.url).map_err(|e| {
        warn!("Rejected extract request for {:?}: {}", request.url, e.detail);
        e
    })?;

    info!("Extract request: url={} engine={}", url, state.extractor.name());

    let raw = state
        .extractor
        .extract(url.as_str(), &state.extractor_config)
        .await
        .map_err(|e| {
            error!("Extraction failed for {}: {}", url, e);
            let cookies_configured = state.extractor_config.cookies_path.is_some()
                || state.extractor_config.cookies_from_browser.is_some();
            if let Some(reason) = diagnose_error(&e.to_string()) {
                if reason.cookies_might_help() && !cookies_configured {
                    warn!("{} may succeed with COOKIES_FILE configured", reason.as_str());
                }
            }
            ApiError::from(e)
        })?;

    let result = state.selector.build_result(raw, url.as_str()).map_err(|e| {
        warn!("No metadata extracted for {}", url);
        ApiError::from(e)
    })?;

    info!(
        "Extracted {} formats for {} via {}",
        result.formats.len(),
        url,
        result.extractor
    );
    Ok(Json(result))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: EngineStatus {
            name: state.extractor.name().to_string(),
            available: state.extractor.is_available(),
        },
    })
}

/// Build the API router; the static UI is mounted only if its directory exists
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        .route("/api/extract", post(extract_video_info))
        .route("/api/health", get(health_check));

    let router = if config.static_dir.is_dir() {
        info!("Serving static files from {}", config.static_dir.display());
        router.fallback_service(ServeDir::new(&config.static_dir))
    } else {
        warn!(
            "Static directory {} not found, UI disabled",
            config.static_dir.display()
        );
        router
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn start_server(config: AppConfig) -> Result<(), std::io::Error> {
    let state = AppState::from_config(&config);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(validate_url("https://www.youtube.com/watch?v=abc").is_ok());
        assert!(validate_url(" http://vimeo.com/1 ").is_ok());
    }

    #[test]
    fn test_rejects_malformed_urls() {
        for bad in ["", "not a url", "ftp://example.com/v.mp4", "file:///etc/passwd", "youtube.com/watch"] {
            let err = validate_url(bad).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{}", bad);
        }
    }

    #[test]
    fn test_engine_error_maps_to_500_with_reason() {
        let err = ApiError::from(ExtractError::Engine("[youtube] x: Private video".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.reason, Some("private_video"));
    }

    #[test]
    fn test_extraction_failed_maps_to_400() {
        let err = ApiError::from(SelectionError::ExtractionFailed);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail, "Could not extract video information.");
    }
}

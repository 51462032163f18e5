//! HTTP front end for code extraction.
//!
//! A two-route axum service: a health check at `GET /` and a multipart
//! upload endpoint at `POST /extract` that runs the full pipeline on the
//! uploaded PDF and returns the code list as JSON. The service is
//! stateless — every request is a complete, independent extraction — so
//! it scales horizontally with no coordination.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ExtractConfig;
use crate::extract::extract_from_bytes;
use crate::output::{CodeRecord, ExtractStats};

/// Shared per-process state: one config reused across requests, so the
/// grammar is compiled once at startup.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ExtractConfig>,
}

/// Upload cap for `/extract`. Multi-sheet drawing sets run to tens of
/// megabytes; axum's 2 MB default would reject most real documents.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Build the application router.
pub fn router(config: ExtractConfig) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/extract", post(extract_upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState {
            config: Arc::new(config),
        })
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "drawcodes",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractParams {
    /// Include per-code provenance records and run stats in the response.
    #[serde(default)]
    pub records: bool,
}

/// Extraction response body.
///
/// `records` and `stats` are omitted unless requested, keeping the common
/// case — a client that only wants the code list — small.
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<CodeRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ExtractStats>,
}

/// Extract codes from an uploaded PDF.
async fn extract_upload(
    State(state): State<AppState>,
    Query(params): Query<ExtractParams>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, (StatusCode, Json<serde_json::Value>)> {
    let mut data = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Upload error: {}", e)))?
    {
        if field.name() == Some("file") {
            data = Some(field.bytes().await.map_err(|e| {
                bad_request(format!("Read error: {}", e))
            })?);
            break;
        }
    }
    let data = data.ok_or_else(|| bad_request("No file provided".to_string()))?;

    info!("Extract request: {} bytes", data.len());

    let output = extract_from_bytes(&data, &state.config).await.map_err(|e| {
        error!("Extraction failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
    })?;

    let (records, stats) = if params.records {
        (Some(output.records), Some(output.stats))
    } else {
        (None, None)
    };

    Ok(Json(ExtractResponse {
        codes: output.codes,
        records,
        stats,
    }))
}

fn bad_request(msg: String) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": msg })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_reports_service_name() {
        let app = router(ExtractConfig::default());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["service"], "drawcodes");
    }

    #[tokio::test]
    async fn uploads_larger_than_the_axum_default_are_accepted() {
        // 3 MB of junk clears the body limit (no 413) and fails later in
        // extraction because it is not a PDF.
        let mut body = Vec::new();
        body.extend_from_slice(
            b"--X\r\ncontent-disposition: form-data; name=\"file\"; filename=\"plan.pdf\"\r\n\r\n",
        );
        body.extend_from_slice(&vec![b'a'; 3 * 1024 * 1024]);
        body.extend_from_slice(b"\r\n--X--\r\n");

        let app = router(ExtractConfig::default());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/extract")
                    .header("content-type", "multipart/form-data; boundary=X")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn extract_without_file_is_bad_request() {
        let app = router(ExtractConfig::default());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/extract")
                    .header("content-type", "multipart/form-data; boundary=X")
                    .body(Body::from("--X--\r\n"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

//! Extraction entry points.
//!
//! The whole pipeline for one document lives here: resolve the input,
//! read spans from the vector text layer, run the span pipeline, and fall
//! back to an OCR span source when the text layer yields nothing. Callers
//! get a single [`ExtractOutput`] with codes, provenance records and run
//! statistics.

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::output::{ExtractOutput, ExtractStats};
use crate::pipeline::source::PdfiumSpanSource;
use crate::pipeline::{input, Pipeline, PipelineRun, SpanSource};
use crate::span::Span;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extract component codes from a PDF file or URL.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input` — Local file path or HTTP/HTTPS URL to a PDF
/// * `config` — Extraction configuration
///
/// # Returns
/// `Ok(ExtractOutput)` on success. A document with no green-marked codes is
/// a success with an empty `codes` list, not an error.
///
/// # Errors
/// Returns `Err(ExtractError)` only for fatal errors:
/// - File not found / permission denied / download failure
/// - Not a valid PDF, or unparseable
/// - OCR fallback failed while running
pub async fn extract(
    input_str: impl AsRef<str>,
    config: &ExtractConfig,
) -> Result<ExtractOutput, ExtractError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting extraction: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let pdf_path = resolved.path().to_path_buf();

    // ── Step 2: Read spans from the vector text layer ────────────────────
    let primary: Arc<dyn SpanSource> = Arc::new(PdfiumSpanSource::new(config.password.clone()));
    let parse_start = Instant::now();
    let (spans, total_pages) = read_source(Arc::clone(&primary), pdf_path.clone()).await?;
    let mut parse_duration_ms = parse_start.elapsed().as_millis() as u64;
    info!(
        "Read {} spans from {} pages in {}ms",
        spans.len(),
        total_pages,
        parse_duration_ms
    );

    // ── Step 3: Run the span pipeline ────────────────────────────────────
    let pipeline = Pipeline::new(
        Arc::clone(&config.grammar),
        config.marker_green_min,
        config.marker_dominance,
    );
    let mut run = pipeline.run(&spans, primary.method());
    let mut total_spans = spans.len();
    let mut marker_spans = run.marker_spans;
    let mut used_ocr_fallback = false;

    // ── Step 4: OCR fallback when the text layer produced no codes ───────
    // Scanned drawings carry no vector text at all, and some CAD exports
    // flatten labels into line art. Either way the primary pass comes back
    // empty, never partially wrong, so "zero codes" is the trigger.
    if run.records.is_empty() {
        if let Some(ref ocr) = config.ocr_fallback {
            info!("Text layer yielded no codes; running OCR fallback");
            used_ocr_fallback = true;
            let ocr_start = Instant::now();
            let (fallback_run, span_count) = fallback_pass(&pipeline, ocr, &pdf_path).await?;
            parse_duration_ms += ocr_start.elapsed().as_millis() as u64;
            total_spans += span_count;
            marker_spans += fallback_run.marker_spans;
            run = fallback_run;
        } else {
            debug!("Text layer yielded no codes and no OCR fallback is configured");
        }
    }

    let stats = ExtractStats {
        total_pages,
        total_spans,
        marker_spans,
        codes_found: run.records.len(),
        used_ocr_fallback,
        parse_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Extraction complete: {} codes from {} marker spans, {}ms total",
        stats.codes_found, stats.marker_spans, stats.total_duration_ms
    );

    Ok(ExtractOutput::from_records(run.records, stats))
}

/// Extract codes and write the JSON output directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn extract_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractConfig,
) -> Result<ExtractStats, ExtractError> {
    let output = extract(input_str, config).await?;
    let path = output_path.as_ref();

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| ExtractError::Internal(format!("JSON serialisation failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ExtractError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &json)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input_str: impl AsRef<str>,
    config: &ExtractConfig,
) -> Result<ExtractOutput, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input_str, config))
}

/// Extract codes from PDF bytes in memory.
///
/// This avoids the need for the caller to create a temporary file.
/// Internally the library writes `bytes` to a managed [`tempfile`] and cleans
/// it up automatically on return or panic.
///
/// This is the recommended API when PDF data comes from an HTTP upload,
/// database, or in-memory buffer rather than a file on disk.
///
/// # Example
/// ```rust,no_run
/// use drawcodes::{extract_from_bytes, ExtractConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("plan.pdf")?;
/// let config = ExtractConfig::default();
/// let output = extract_from_bytes(&bytes, &config).await?;
/// println!("{:?}", output.codes);
/// # Ok(())
/// # }
/// ```
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &ExtractConfig,
) -> Result<ExtractOutput, ExtractError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| ExtractError::Internal(format!("tempfile: {e}")))?;
    // Same magic gate the path/URL routes apply, before writing anything.
    input::ensure_pdf_magic(bytes, tmp.path())?;
    tmp.write_all(bytes)
        .map_err(|e| ExtractError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    // `tmp` is dropped (and the file deleted) when `extract` returns
    extract(&path, config).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run a span source on the blocking pool.
///
/// `SpanSource::spans` is a synchronous call because span producers (pdfium,
/// OCR engines) are not async-safe; wrapping it here keeps implementors
/// simple.
async fn read_source(
    source: Arc<dyn SpanSource>,
    pdf_path: PathBuf,
) -> Result<(Vec<Span>, usize), ExtractError> {
    tokio::task::spawn_blocking(move || source.spans(&pdf_path))
        .await
        .map_err(|e| ExtractError::Internal(format!("Span-read task panicked: {}", e)))?
}

/// Run the OCR fallback source and pipe its spans through the pipeline.
///
/// Records are tagged with the method the source itself declares. Any
/// source error comes back as [`ExtractError::OcrFailed`]; the second
/// return value is the span count for run statistics.
async fn fallback_pass(
    pipeline: &Pipeline,
    ocr: &Arc<dyn SpanSource>,
    pdf_path: &Path,
) -> Result<(PipelineRun, usize), ExtractError> {
    let (spans, _) = read_source(Arc::clone(ocr), pdf_path.to_path_buf())
        .await
        .map_err(|e| {
            warn!("OCR fallback failed: {}", e);
            match e {
                ExtractError::OcrFailed { .. } => e,
                other => ExtractError::OcrFailed {
                    detail: other.to_string(),
                },
            }
        })?;
    let run = pipeline.run(&spans, ocr.method());
    Ok((run, spans.len()))
}

//! Output types for an extraction run.

use serde::{Deserialize, Serialize};

use crate::span::{BBox, Rgb};

/// How a code's span was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Vector text layer of the PDF.
    Text,
    /// OCR over color-segmented image regions (fallback pass).
    Ocr,
}

/// One extracted code with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeRecord {
    /// 1-based page number.
    pub page: usize,
    /// Normalized code string.
    pub code: String,
    /// Raw span text the code was extracted from (pre-normalization).
    pub raw_text: String,
    /// Bounding box of the source span.
    pub bbox: BBox,
    /// Normalized span color.
    pub rgb: Rgb,
    /// Extraction method that produced the span.
    pub method: ExtractionMethod,
}

/// Statistics for one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractStats {
    /// Pages in the document.
    pub total_pages: usize,
    /// Spans observed across all pages (both passes).
    pub total_spans: usize,
    /// Spans that passed the marker-color gate.
    pub marker_spans: usize,
    /// Codes in the final output.
    pub codes_found: usize,
    /// Whether the OCR fallback pass ran.
    pub used_ocr_fallback: bool,
    /// Wall-clock time spent reading spans out of the document, in ms.
    pub parse_duration_ms: u64,
    /// Total wall-clock time, in ms.
    pub total_duration_ms: u64,
}

/// The result of extracting one document.
///
/// `codes` is the plain ordered list most callers want; `records` carries
/// page, position, color and raw-text provenance for each entry of `codes`,
/// in the same order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOutput {
    pub codes: Vec<String>,
    pub records: Vec<CodeRecord>,
    pub stats: ExtractStats,
}

impl ExtractOutput {
    /// Assemble the output from pipeline records plus run stats.
    pub fn from_records(records: Vec<CodeRecord>, stats: ExtractStats) -> Self {
        let codes = records.iter().map(|r| r.code.clone()).collect();
        ExtractOutput {
            codes,
            records,
            stats,
        }
    }
}

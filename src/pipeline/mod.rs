//! Pipeline stages for code extraction.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. an OCR span source instead of the vector
//! text layer) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ source ──▶ color ──▶ candidates ──▶ grammar ──▶ normalize ──▶ dedup
//! (URL/path) (pdfium)  (green?)  (splitting)    (rules)     (canon form)  (position)
//! ```
//!
//! 1. [`input`]      — canonicalise the user-supplied path or URL to a local file
//! 2. [`source`]     — read text spans with color and position; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`color`]      — marker-color gate: only green-marked spans continue
//! 4. [`candidates`] — split each span's raw text into candidate labels and
//!    resolve overlap between concatenations and their parts
//! 5. [`grammar`]    — full-string rule matching; the acceptance oracle
//! 6. [`normalize`]  — strip quantities and collapse to canonical form
//! 7. [`dedup`]      — drop exact positional repeats from layered content

pub mod candidates;
pub mod color;
pub mod dedup;
pub mod grammar;
pub mod input;
pub mod normalize;
pub mod source;

use std::path::Path;

use tracing::{debug, trace};

use crate::error::ExtractError;
use crate::output::{CodeRecord, ExtractionMethod};
use crate::span::Span;

/// A producer of positioned, colored text spans for one document.
///
/// The primary implementation reads the PDF vector text layer
/// ([`source::PdfiumSpanSource`]); an OCR implementation can be plugged in
/// through [`crate::ExtractConfig::builder`] as a fallback for scanned
/// drawings with no text layer.
pub trait SpanSource: Send + Sync {
    /// Read every span of the document at `pdf_path`.
    ///
    /// Returns the spans plus the document's page count.
    fn spans(&self, pdf_path: &Path) -> Result<(Vec<Span>, usize), ExtractError>;

    /// Which extraction method this source reports in output records.
    fn method(&self) -> ExtractionMethod;
}

/// The span-to-records pipeline, stages 3–7 above.
///
/// Stateless across documents; positional dedup state lives only for the
/// duration of one [`run`](Pipeline::run) call.
#[derive(Debug, Clone)]
pub struct Pipeline {
    grammar: std::sync::Arc<grammar::CodeGrammar>,
    green_min: u8,
    dominance: u8,
}

/// What one pipeline run produced, with the marker-span count for stats.
#[derive(Debug, Default)]
pub struct PipelineRun {
    pub records: Vec<CodeRecord>,
    pub marker_spans: usize,
}

impl Pipeline {
    pub fn new(grammar: std::sync::Arc<grammar::CodeGrammar>, green_min: u8, dominance: u8) -> Self {
        Pipeline {
            grammar,
            green_min,
            dominance,
        }
    }

    /// Run the span pipeline over one document's spans.
    ///
    /// Span order is preserved: records come out in document order (page by
    /// page, span by span, candidate by candidate).
    pub fn run(&self, spans: &[Span], method: ExtractionMethod) -> PipelineRun {
        let mut deduper = dedup::PositionDeduper::new();
        let mut out = PipelineRun::default();

        for span in spans {
            let rgb = span.color.to_rgb();
            if !color::is_marker_color(rgb, self.green_min, self.dominance) {
                continue;
            }
            out.marker_spans += 1;
            trace!(page = span.page, text = %span.text, "marker span");

            let generated = candidates::generate(&span.text, &self.grammar);
            let valid: Vec<String> = generated
                .into_iter()
                .filter(|c| self.grammar.looks_like_code(c))
                .collect();
            let kept = candidates::disambiguate(&valid, &self.grammar);

            for raw in kept {
                if !deduper.first_occurrence(span.page, &raw, &span.bbox) {
                    continue;
                }
                let code = normalize::normalize_code(&raw);
                if code.is_empty() {
                    continue;
                }
                debug!(page = span.page, %code, raw = %raw, "code extracted");
                out.records.push(CodeRecord {
                    page: span.page,
                    code,
                    raw_text: raw,
                    bbox: span.bbox,
                    rgb,
                    method,
                });
            }
        }

        out
    }
}

//! Span reading: pull positioned, colored text spans out of a PDF via pdfium.
//!
//! [`SpanSource::spans`] here is a synchronous call — pdfium wraps a C++
//! library with thread-local state that must not run on async worker
//! threads. [`crate::extract`] moves the call onto tokio's blocking pool.
//!
//! One span is emitted per text object. Drawing software writes each label
//! as its own text object, so this granularity matches the label granularity
//! we want; running heads and title blocks come out as separate spans that
//! the color gate discards.

use crate::error::ExtractError;
use crate::output::ExtractionMethod;
use crate::pipeline::SpanSource;
use crate::span::{BBox, Span, SpanColor};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Reads spans from the PDF vector text layer.
///
/// Stateless; one instance serves any number of documents.
#[derive(Debug, Default, Clone)]
pub struct PdfiumSpanSource {
    password: Option<String>,
}

impl PdfiumSpanSource {
    pub fn new(password: Option<String>) -> Self {
        PdfiumSpanSource { password }
    }
}

impl SpanSource for PdfiumSpanSource {
    fn spans(&self, pdf_path: &Path) -> Result<(Vec<Span>, usize), ExtractError> {
        read_spans_blocking(pdf_path, self.password.as_deref())
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Text
    }
}

/// Bind to a pdfium library, honouring `PDFIUM_LIB_PATH` when set.
fn bind_pdfium() -> Result<Pdfium, ExtractError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(lib) => Pdfium::bind_to_library(Path::new(&lib)),
        Err(_) => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ExtractError::PdfiumBindingFailed(e.to_string()))?;
    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of span reading.
fn read_spans_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<(Vec<Span>, usize), ExtractError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ExtractError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                ExtractError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            ExtractError::DocumentParse {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let mut spans = Vec::new();

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        for object in page.objects().iter() {
            let Some(text_object) = object.as_text_object() else {
                continue;
            };

            let text = text_object.text();
            if text.trim().is_empty() {
                continue;
            }

            let fill = text_object.fill_color().map_err(|e| ExtractError::PageRead {
                page: page_num,
                detail: format!("fill color unavailable: {:?}", e),
            })?;

            let bounds = object.bounds().map_err(|e| ExtractError::PageRead {
                page: page_num,
                detail: format!("object bounds unavailable: {:?}", e),
            })?;

            spans.push(Span {
                page: page_num,
                text,
                color: SpanColor::Components(vec![
                    fill.red() as f64,
                    fill.green() as f64,
                    fill.blue() as f64,
                ]),
                bbox: BBox::new(
                    bounds.left().value,
                    bounds.top().value,
                    bounds.right().value,
                    bounds.bottom().value,
                ),
            });
        }
        debug!(
            "Page {}: {} spans so far",
            page_num,
            spans.len()
        );
    }

    Ok((spans, total_pages))
}

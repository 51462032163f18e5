//! Error types for the drawcodes library.
//!
//! A single fatal error enum covers the whole crate. Extraction either
//! fails for the document as a whole (bad input, unreadable PDF) or it
//! succeeds; a span with empty text or an unusable color is not an error,
//! it is simply skipped by the pipeline, and a document that yields zero
//! codes is a valid empty result.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the drawcodes library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The document could not be opened or parsed at all.
    #[error("PDF '{path}' could not be parsed: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    DocumentParse { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// A page's text objects could not be read.
    #[error("Failed to read spans from page {page}: {detail}")]
    PageRead { page: usize, detail: String },

    /// The OCR fallback span source failed.
    #[error("OCR fallback failed: {detail}")]
    OcrFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy, or install\n\
a pdfium binary for your platform.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_parse_display() {
        let e = ExtractError::DocumentParse {
            path: PathBuf::from("plan.pdf"),
            detail: "corrupt xref".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("plan.pdf"), "got: {msg}");
        assert!(msg.contains("corrupt xref"));
    }

    #[test]
    fn not_a_pdf_shows_magic() {
        let e = ExtractError::NotAPdf {
            path: PathBuf::from("notes.txt"),
            magic: *b"PK\x03\x04",
        };
        assert!(e.to_string().contains("notes.txt"));
    }

    #[test]
    fn page_read_display() {
        let e = ExtractError::PageRead {
            page: 3,
            detail: "object stream truncated".into(),
        };
        assert!(e.to_string().contains("page 3"));
    }

    #[test]
    fn invalid_input_display() {
        let e = ExtractError::InvalidInput {
            input: "ftp://example.com/plan.pdf".into(),
        };
        assert!(e.to_string().contains("ftp://example.com/plan.pdf"));
    }

    #[test]
    fn pdfium_binding_failure_points_at_lib_path() {
        let e = ExtractError::PdfiumBindingFailed("LoadLibraryError".into());
        assert!(e.to_string().contains("PDFIUM_LIB_PATH"));
    }

    #[test]
    fn download_timeout_display() {
        let e = ExtractError::DownloadTimeout {
            url: "https://example.com/plan.pdf".into(),
            secs: 120,
        };
        assert!(e.to_string().contains("120s"));
    }
}

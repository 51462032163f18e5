//! Input resolution.
//!
//! Extraction accepts a local path or an HTTP/HTTPS URL, but everything
//! downstream wants a file on disk because pdfium opens documents by path.
//! URLs are fetched into a `TempDir` whose lifetime is tied to the returned
//! [`ResolvedInput`], so the downloaded copy is removed as soon as the
//! caller drops the handle. Both routes verify the `%PDF` magic up front:
//! a junk file fails here as [`ExtractError::NotAPdf`] instead of as a
//! confusing parse error deep inside pdfium.

use crate::error::ExtractError;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

/// A drawing pinned to a local path, however it arrived.
#[derive(Debug)]
pub enum ResolvedInput {
    /// The caller gave us a path that checks out.
    Local(PathBuf),
    /// Fetched from a URL; the temp dir owns the on-disk copy.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// True for inputs this crate downloads rather than opens.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Pin a user-supplied path or URL to a validated local PDF file.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, ExtractError> {
    if is_url(input) {
        return download_url(input, timeout_secs).await;
    }
    // Any other scheme would otherwise read as a relative path and surface
    // as a misleading "file not found".
    if input.contains("://") {
        return Err(ExtractError::InvalidInput {
            input: input.to_string(),
        });
    }
    resolve_local(input)
}

/// Fail with [`ExtractError::NotAPdf`] unless `bytes` opens with `%PDF`.
///
/// Fewer than four bytes passes; the parser reports truncated files with
/// more context than we have here.
pub(crate) fn ensure_pdf_magic(bytes: &[u8], path: &Path) -> Result<(), ExtractError> {
    if bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(ExtractError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

fn resolve_local(path_str: &str) -> Result<ResolvedInput, ExtractError> {
    let path = PathBuf::from(path_str);

    let mut file = std::fs::File::open(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied { path: path.clone() },
        _ => ExtractError::FileNotFound { path: path.clone() },
    })?;

    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_ok() {
        ensure_pdf_magic(&magic, &path)?;
    }

    debug!("Using local drawing: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, ExtractError> {
    info!("Fetching drawing from {}", url);

    let failed = |reason: String| ExtractError::DownloadFailed {
        url: url.to_string(),
        reason,
    };
    let timed_out = || ExtractError::DownloadTimeout {
        url: url.to_string(),
        secs: timeout_secs,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| if e.is_timeout() { timed_out() } else { failed(e.to_string()) })?;
    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| if e.is_timeout() { timed_out() } else { failed(e.to_string()) })?;

    let temp_dir =
        TempDir::new().map_err(|e| ExtractError::Internal(format!("temp dir: {}", e)))?;
    let file_path = temp_dir.path().join(filename_from_url(url));

    // Validate before touching the disk; a bad body never gets written.
    ensure_pdf_magic(&bytes, &file_path)?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| ExtractError::Internal(format!("temp file write: {}", e)))?;

    debug!("Downloaded {} bytes to {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Name the temp copy after the URL's last path segment when it carries an
/// extension, else fall back to a fixed name.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/plan.pdf"));
        assert!(is_url("http://example.com/plan.pdf"));
        assert!(!is_url("/tmp/plan.pdf"));
        assert!(!is_url("plan.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://example.com/drawings/plan.pdf"),
            "plan.pdf"
        );
        assert_eq!(filename_from_url("https://example.com/"), "downloaded.pdf");
        assert_eq!(
            filename_from_url("https://example.com/download"),
            "downloaded.pdf"
        );
    }

    #[test]
    fn magic_check_accepts_pdf_and_short_buffers() {
        let p = Path::new("plan.pdf");
        assert!(ensure_pdf_magic(b"%PDF-1.7\n", p).is_ok());
        assert!(ensure_pdf_magic(b"%P", p).is_ok());
        assert!(ensure_pdf_magic(b"PK\x03\x04zip", p).is_err());
    }

    #[tokio::test]
    async fn unsupported_scheme_is_invalid_input() {
        let err = resolve_input("ftp://example.com/plan.pdf", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidInput { .. }), "got: {err}");
    }

    #[test]
    fn missing_local_file_is_reported() {
        let err = resolve_local("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_local_file_is_rejected() {
        use std::io::Write;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"just some text").unwrap();

        let err = resolve_local(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ExtractError::NotAPdf { .. }));
    }
}

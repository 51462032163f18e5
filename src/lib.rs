//! # drawcodes
//!
//! Extract green-marked component codes from technical drawing PDFs.
//!
//! ## Why this crate?
//!
//! Electrical and construction drawings carry short alphanumeric component
//! labels (`ABN-7`, `CE1(2).CE3(1)`, `S1N S3R`) annotated in a distinctive
//! green. Generic PDF text extraction returns every string on the sheet —
//! title blocks, dimensions, notes — with no way to tell a component label
//! from prose. This crate reads the vector text layer with per-span color
//! and position, keeps only green-marked spans, and validates each against
//! a grammar of known code shapes, so the output is the component list and
//! nothing else.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input       resolve local file or download from URL
//!  ├─ 2. Source      read colored text spans via pdfium (spawn_blocking)
//!  ├─ 3. Color       keep spans whose fill is marker green
//!  ├─ 4. Candidates  split merged/concatenated labels into candidates
//!  ├─ 5. Grammar     full-string rule matching against the code table
//!  ├─ 6. Normalize   strip quantity parentheticals, canonical form
//!  └─ 7. Dedup       drop exact positional repeats from layered content
//! ```
//!
//! A document whose text layer yields no codes can fall through to an OCR
//! span source (see [`pipeline::SpanSource`]); the pipeline stages are the
//! same either way.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drawcodes::{extract, ExtractConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractConfig::default();
//!     let output = extract("plan.pdf", &config).await?;
//!     for code in &output.codes {
//!         println!("{code}");
//!     }
//!     eprintln!("{} codes from {} marker spans",
//!         output.stats.codes_found, output.stats.marker_spans);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `drawcodes` binary (clap + anyhow + tracing-subscriber) |
//! | `server` | off     | Enables the `drawcodes-server` binary (axum + tower-http) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! drawcodes = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
#[cfg(feature = "server")]
pub mod server;
pub mod span;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractConfig, ExtractConfigBuilder};
pub use error::ExtractError;
pub use extract::{extract, extract_from_bytes, extract_sync, extract_to_file};
pub use output::{CodeRecord, ExtractOutput, ExtractStats, ExtractionMethod};
pub use pipeline::grammar::CodeGrammar;
pub use pipeline::SpanSource;
pub use span::{BBox, Rgb, Span, SpanColor};

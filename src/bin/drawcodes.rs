//! CLI binary for drawcodes.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractConfig` and prints results as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use drawcodes::{extract, ExtractConfig, ExtractOutput};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract codes from one drawing (JSON to stdout)
  drawcodes plan.pdf

  # Write output to a file
  drawcodes plan.pdf -o codes.json

  # Include per-code provenance (page, position, raw text, color)
  drawcodes --records plan.pdf

  # Extract from a URL
  drawcodes https://example.com/drawings/plan.pdf

  # Sweep a directory of drawings
  drawcodes --recursive drawings/ -o all-codes.json

  # Looser marker threshold for faded scans
  drawcodes --green-min 90 --dominance 10 plan.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to an existing libpdfium shared library
  RUST_LOG          Tracing filter, overrides -v/-q (e.g. drawcodes=debug)
"#;

/// Extract green-marked component codes from technical drawing PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "drawcodes",
    version,
    about = "Extract green-marked component codes from technical drawing PDFs",
    long_about = "Extract component codes (ABN-7, CE1(2).CE3(1), S1N S3R, ...) from the \
green-annotated text layer of technical drawing PDFs. Accepts a local file, an HTTP/HTTPS \
URL, or a directory of PDFs.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file path, HTTP/HTTPS URL, or directory of PDFs.
    input: String,

    /// Write JSON to this file instead of stdout.
    #[arg(short, long, env = "DRAWCODES_OUTPUT")]
    output: Option<PathBuf>,

    /// Include per-code provenance records and run stats.
    #[arg(long, env = "DRAWCODES_RECORDS")]
    records: bool,

    /// Minimum green channel value for a span to count as marked.
    #[arg(long, env = "DRAWCODES_GREEN_MIN", default_value_t = 110)]
    green_min: u8,

    /// How far green must exceed red and blue.
    #[arg(long, env = "DRAWCODES_DOMINANCE", default_value_t = 20)]
    dominance: u8,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "DRAWCODES_PASSWORD")]
    password: Option<String>,

    /// Recurse into subdirectories when the input is a directory.
    #[arg(short, long)]
    recursive: bool,

    /// Documents processed concurrently in directory mode.
    #[arg(short, long, env = "DRAWCODES_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DRAWCODES_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DRAWCODES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DRAWCODES_QUIET")]
    quiet: bool,
}

/// One entry of the directory-sweep output array.
#[derive(Debug, Serialize)]
struct SweepEntry {
    file: String,
    codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<Vec<drawcodes::CodeRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<drawcodes::ExtractStats>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let mut builder = ExtractConfig::builder()
        .marker_green_min(cli.green_min)
        .marker_dominance(cli.dominance)
        .download_timeout_secs(cli.download_timeout);
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    let input_path = Path::new(&cli.input);
    let json = if input_path.is_dir() {
        sweep_directory(&cli, input_path, &config).await?
    } else {
        let output = extract(&cli.input, &config)
            .await
            .context("Extraction failed")?;
        render_single(&cli, output)?
    };

    // ── Write output ─────────────────────────────────────────────────────
    if let Some(ref path) = cli.output {
        tokio::fs::write(path, &json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !cli.quiet {
            eprintln!("Wrote {}", path.display());
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();
    }

    Ok(())
}

/// Serialise one document's output, trimmed to what was asked for.
fn render_single(cli: &Cli, output: ExtractOutput) -> Result<String> {
    if cli.records {
        serde_json::to_string_pretty(&output).context("Failed to serialise output")
    } else {
        serde_json::to_string_pretty(&serde_json::json!({ "codes": output.codes }))
            .context("Failed to serialise output")
    }
}

/// Extract every PDF under `dir`, concurrently, into one JSON array.
///
/// Per-document failures are logged and skipped; the sweep fails only when
/// no document could be processed at all.
async fn sweep_directory(cli: &Cli, dir: &Path, config: &ExtractConfig) -> Result<String> {
    let files = collect_pdfs(dir, cli.recursive)?;
    if files.is_empty() {
        anyhow::bail!("No PDF files found under {}", dir.display());
    }

    let bar = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar
    };

    let entries: Vec<Option<SweepEntry>> = stream::iter(files.iter().map(|path| {
        let bar = bar.clone();
        async move {
            let name = path.display().to_string();
            bar.set_message(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
            let result = extract(&name, config).await;
            bar.inc(1);
            match result {
                Ok(output) => {
                    let (records, stats) = if cli.records {
                        (Some(output.records), Some(output.stats))
                    } else {
                        (None, None)
                    };
                    Some(SweepEntry {
                        file: name,
                        codes: output.codes,
                        records,
                        stats,
                    })
                }
                Err(e) => {
                    bar.println(format!("✗ {}: {}", name, e));
                    None
                }
            }
        }
    }))
    .buffer_unordered(cli.concurrency.max(1))
    .collect()
    .await;
    bar.finish_and_clear();

    let mut entries: Vec<SweepEntry> = entries.into_iter().flatten().collect();
    if entries.is_empty() {
        anyhow::bail!("Every PDF under {} failed to process", dir.display());
    }
    // buffer_unordered scrambles completion order; sort for stable output.
    entries.sort_by(|a, b| a.file.cmp(&b.file));

    if !cli.quiet {
        eprintln!("Processed {}/{} files", entries.len(), files.len());
    }

    serde_json::to_string_pretty(&entries).context("Failed to serialise sweep output")
}

/// List PDF files under `dir`, optionally recursing.
fn collect_pdfs(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(d) = stack.pop() {
        for entry in std::fs::read_dir(&d)
            .with_context(|| format!("Failed to read directory {}", d.display()))?
        {
            let path = entry?.path();
            if path.is_dir() {
                if recursive {
                    stack.push(path);
                }
            } else if path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
            {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

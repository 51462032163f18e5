//! Configuration types for code extraction.
//!
//! All extraction behaviour is controlled through [`ExtractConfig`], built
//! via its [`ExtractConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across threads and diff two runs to
//! understand why their outputs differ.

use crate::error::ExtractError;
use crate::pipeline::grammar::CodeGrammar;
use crate::pipeline::SpanSource;
use std::fmt;
use std::sync::Arc;

/// Configuration for a code-extraction run.
///
/// Built via [`ExtractConfig::builder()`] or using
/// [`ExtractConfig::default()`].
///
/// # Example
/// ```rust
/// use drawcodes::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .marker_green_min(120)
///     .marker_dominance(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractConfig {
    /// Minimum green channel value for a span to count as marked. Default: 110.
    ///
    /// Labels on the source drawings are annotated in a saturated green; the
    /// threshold is strict (`g > marker_green_min`) so a channel value of
    /// exactly 110 does not pass. Raise this when scans carry a green tint;
    /// lower it for faded annotations.
    pub marker_green_min: u8,

    /// How far the green channel must exceed both red and blue. Default: 20.
    ///
    /// Grey and near-white text has roughly equal channels; requiring
    /// `g > r + dominance && g > b + dominance` rejects it even when the
    /// green channel itself is bright.
    pub marker_dominance: u8,

    /// The code grammar. Defaults to the built-in rule table; tests can
    /// substitute a reduced grammar.
    pub grammar: Arc<CodeGrammar>,

    /// Optional OCR span source used when the vector text layer yields zero
    /// codes. `None` disables the fallback pass.
    pub ocr_fallback: Option<Arc<dyn SpanSource>>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            marker_green_min: crate::pipeline::color::DEFAULT_GREEN_MIN,
            marker_dominance: crate::pipeline::color::DEFAULT_DOMINANCE,
            grammar: Arc::new(CodeGrammar::new()),
            ocr_fallback: None,
            password: None,
            download_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for ExtractConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractConfig")
            .field("marker_green_min", &self.marker_green_min)
            .field("marker_dominance", &self.marker_dominance)
            .field("grammar_rules", &self.grammar.rule_count())
            .field(
                "ocr_fallback",
                &self.ocr_fallback.as_ref().map(|_| "<dyn SpanSource>"),
            )
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl ExtractConfig {
    /// Create a new builder for `ExtractConfig`.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Debug)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn marker_green_min(mut self, v: u8) -> Self {
        self.config.marker_green_min = v;
        self
    }

    pub fn marker_dominance(mut self, v: u8) -> Self {
        self.config.marker_dominance = v;
        self
    }

    pub fn grammar(mut self, grammar: Arc<CodeGrammar>) -> Self {
        self.config.grammar = grammar;
        self
    }

    pub fn ocr_fallback(mut self, source: Arc<dyn SpanSource>) -> Self {
        self.config.ocr_fallback = Some(source);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractConfig, ExtractError> {
        let c = &self.config;
        if c.grammar.rule_count() == 0 {
            return Err(ExtractError::InvalidConfig(
                "Grammar must contain at least one rule".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(ExtractError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

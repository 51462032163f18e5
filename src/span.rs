//! Observation types produced by a span source.
//!
//! A [`Span`] is one styled run of text as reported by text extraction: a
//! single color, a single bounding box, one raw text fragment. Spans live
//! only for the duration of one document's extraction — they are produced,
//! classified and discarded within a single call, never persisted.
//!
//! Colors arrive in whatever shape the source reports them: a packed
//! `0xRRGGBB` integer from some PDF text layers, or a component triple in
//! either the 0–255 or the 0–1 range. [`SpanColor::to_rgb`] folds all of
//! these into one normalized [`Rgb`]; anything unrecognizable becomes black,
//! which is never a marker color, so malformed spans fall out of the
//! pipeline silently rather than erroring.

use serde::{Deserialize, Serialize};

/// A normalized RGB triple with components in [0, 255].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

/// A span color as reported by the source, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpanColor {
    /// Packed `0xRRGGBB` integer.
    Packed(u32),
    /// Component sequence. If all of the first three components are ≤ 1.0
    /// they are treated as fractional and scaled by 255; otherwise they are
    /// taken as-is and rounded. Fewer than three components → black.
    Components(Vec<f64>),
}

impl SpanColor {
    /// Normalize to an [`Rgb`] triple.
    ///
    /// Total: every color shape maps to something, with black as the
    /// fallback for anything unusable.
    pub fn to_rgb(&self) -> Rgb {
        match self {
            SpanColor::Packed(c) => Rgb::new(
                ((c >> 16) & 0xFF) as u8,
                ((c >> 8) & 0xFF) as u8,
                (c & 0xFF) as u8,
            ),
            SpanColor::Components(v) if v.len() >= 3 => {
                let (r, g, b) = (v[0], v[1], v[2]);
                if r.max(g).max(b) <= 1.0 {
                    Rgb::new(
                        clamp_255(r * 255.0),
                        clamp_255(g * 255.0),
                        clamp_255(b * 255.0),
                    )
                } else {
                    Rgb::new(clamp_255(r), clamp_255(g), clamp_255(b))
                }
            }
            SpanColor::Components(_) => Rgb::BLACK,
        }
    }
}

fn clamp_255(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Bounding box of a span in page coordinates: left, top, right, bottom.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BBox {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        BBox {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Each coordinate rounded to one decimal place, scaled to integers.
    ///
    /// This is the positional component of the dedup key: coarse enough to
    /// absorb sub-pixel jitter between duplicate extractions of the same
    /// physical label, fine enough that a repeated label elsewhere on the
    /// page keeps its own key.
    pub fn rounded_key(&self) -> [i64; 4] {
        let r = |v: f32| (f64::from(v) * 10.0).round() as i64;
        [r(self.left), r(self.top), r(self.right), r(self.bottom)]
    }
}

/// One styled run of text observed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// 1-based page number.
    pub page: usize,
    /// Raw fragment text. May contain several juxtaposed labels.
    pub text: String,
    /// Fill color as reported by the source.
    pub color: SpanColor,
    /// Bounding box in page coordinates.
    pub bbox: BBox,
}

impl Span {
    pub fn new(page: usize, text: impl Into<String>, color: SpanColor, bbox: BBox) -> Self {
        Span {
            page,
            text: text.into(),
            color,
            bbox,
        }
    }
}

//! Marker-color classification.
//!
//! Drawings in this domain flag component codes by printing them in green.
//! Rendering and anti-aliasing shift the exact shade from file to file, so
//! instead of matching one green we test *greenness*: the green channel must
//! clear an absolute floor and dominate both red and blue by a margin. Both
//! thresholds are configurable; the defaults were tuned against the source
//! drawing set.

use crate::span::Rgb;

/// Default minimum green channel value.
pub const DEFAULT_GREEN_MIN: u8 = 110;

/// Default margin by which green must exceed red and blue.
pub const DEFAULT_DOMINANCE: u8 = 20;

/// True iff `rgb` counts as the marker color.
///
/// `g > g_min && g > r + delta && g > b + delta`, computed in `i32` so the
/// margin arithmetic cannot wrap.
pub fn is_marker_color(rgb: Rgb, g_min: u8, delta: u8) -> bool {
    let (r, g, b) = (i32::from(rgb.r), i32::from(rgb.g), i32::from(rgb.b));
    let (g_min, delta) = (i32::from(g_min), i32::from(delta));
    g > g_min && g > r + delta && g > b + delta
}

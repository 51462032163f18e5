//! Position-based deduplication.
//!
//! PDF text layers frequently report the same physical label twice (overdraw,
//! layered content streams), always at the same position. Keying on
//! `(page, raw candidate text, bbox rounded to one decimal)` suppresses those
//! exact repeats while keeping legitimate repeats of the same code elsewhere
//! on the drawing — a diagram may use one label many times.
//!
//! State is local to one document run; there is no cross-document memory.

use std::collections::HashSet;

use crate::span::BBox;

type Key = (usize, String, [i64; 4]);

/// Tracks which `(page, raw text, position)` keys have been emitted.
#[derive(Debug, Default)]
pub struct PositionDeduper {
    seen: HashSet<Key>,
}

impl PositionDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly once per key, in first-seen order.
    pub fn first_occurrence(&mut self, page: usize, raw: &str, bbox: &BBox) -> bool {
        self.seen
            .insert((page, raw.to_string(), bbox.rounded_key()))
    }
}

//! Natural box model for entries.
//!
//! [`Measure`] is the single place entry sizes come from. [`TextMetrics`]
//! is the canonical implementation used by the demo viewer: the renderer
//! wraps text with the same [`wrap_text`] so measured and drawn heights
//! always agree.

use super::types::BoxSize;
use crate::model::{Content, Entry, EntryKind};
use unicode_width::UnicodeWidthChar;

/// Computes the natural (unpositioned) box of an entry.
///
/// # Contract
/// - MUST be deterministic (same entry + width → same box)
/// - MUST return a non-negative, finite height
/// - for media entries MUST use the settlement's current display box
pub trait Measure {
    /// Box of `entry` in a container `container_width` wide.
    fn measure(&self, entry: &Entry, container_width: f64) -> BoxSize;
}

impl<F> Measure for F
where
    F: Fn(&Entry, f64) -> BoxSize,
{
    fn measure(&self, entry: &Entry, container_width: f64) -> BoxSize {
        self(entry, container_width)
    }
}

/// Layout units per terminal column.
pub const CHAR_WIDTH: f64 = 8.0;
/// Layout units per text line (one terminal row).
pub const LINE_HEIGHT: f64 = 20.0;
/// Avatar width plus the gap before the bubble.
pub const AVATAR_GUTTER: f64 = 48.0;
/// Fraction of the container a bubble may span.
pub const BUBBLE_WIDTH_FRACTION: f64 = 0.7;

/// Box model of the demo viewer: monospace text in bordered bubbles.
///
/// - Header: one line, full width
/// - Text message: wrapped lines plus a one-line border above and below
/// - Media message: display box plus the same border
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMetrics;

impl TextMetrics {
    /// Columns available for text inside a bubble.
    pub fn text_columns(container_width: f64) -> usize {
        let bubble = (container_width * BUBBLE_WIDTH_FRACTION - AVATAR_GUTTER).max(CHAR_WIDTH * 3.0);
        // two border columns
        ((bubble / CHAR_WIDTH).floor() as usize).saturating_sub(2).max(1)
    }
}

impl Measure for TextMetrics {
    fn measure(&self, entry: &Entry, container_width: f64) -> BoxSize {
        match (entry.kind(), entry.content()) {
            (EntryKind::Header, _) => BoxSize::new(container_width, LINE_HEIGHT),
            (_, Content::Media(media)) => {
                let display = media.settlement().display();
                BoxSize::new(
                    AVATAR_GUTTER + display.width + 2.0 * CHAR_WIDTH,
                    display.height + 2.0 * LINE_HEIGHT,
                )
            }
            (_, Content::Text { text }) | (_, Content::Label { text }) => {
                let columns = Self::text_columns(container_width);
                let lines = wrap_text(text, columns);
                let widest = lines.iter().map(|l| display_width(l)).max().unwrap_or(0);
                BoxSize::new(
                    AVATAR_GUTTER + (widest + 2) as f64 * CHAR_WIDTH,
                    (lines.len().max(1) + 2) as f64 * LINE_HEIGHT,
                )
            }
        }
    }
}

/// Fixed-height box model. Useful when exact extents matter (tests, benches).
///
/// Messages take half the container width so left and right bubbles share
/// no columns; media messages take their display height.
#[derive(Debug, Clone, Copy)]
pub struct FixedHeight {
    /// Height of every header.
    pub header: f64,
    /// Height of every text message.
    pub text: f64,
}

impl FixedHeight {
    /// Measure with the given header and text heights.
    pub fn new(header: f64, text: f64) -> Self {
        Self { header, text }
    }
}

impl Measure for FixedHeight {
    fn measure(&self, entry: &Entry, container_width: f64) -> BoxSize {
        match entry.content() {
            _ if entry.is_header() => BoxSize::new(container_width, self.header),
            Content::Media(media) => {
                let display = media.settlement().display();
                BoxSize::new((container_width / 2.0).max(display.width), display.height)
            }
            _ => BoxSize::new(container_width / 2.0, self.text),
        }
    }
}

/// Display width of a string in terminal columns.
pub fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Hard-wrap text to `columns` display columns.
///
/// Existing newlines are kept; empty input yields one empty line. Wide
/// characters never straddle a break.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        let mut current = String::new();
        let mut width = 0usize;
        for c in raw.chars() {
            let w = c.width().unwrap_or(0);
            if width + w > columns && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                width = 0;
            }
            current.push(c);
            width += w;
        }
        lines.push(current);
    }

    lines
}

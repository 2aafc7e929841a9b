//! Status bar: reconciler phase, list size, pin state and key hints.

use super::styles::ChatStyles;
use crate::state::{ChatList, Phase};
use crate::view_state::LayoutTree;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

const KEY_HINTS: &str = "i insert  o history  m media  s stress  q quit";
const COMPACT_KEY_HINTS: &str = "i/o/m/s  q quit";

/// Values shown in the status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    /// Reconciler phase.
    pub phase: Phase,
    /// Entries in the list.
    pub entries: usize,
    /// Whether the viewport follows the bottom.
    pub pinned: bool,
    /// Media waiting for their asset.
    pub pending_assets: usize,
    /// Batches waiting behind the flight.
    pub queued: usize,
    /// Whether the fast scroll runs.
    pub animating: bool,
    /// Current scroll offset.
    pub scroll_offset: f64,
    /// Largest scroll offset.
    pub max_offset: f64,
}

impl StatusLine {
    /// Read the values off a list.
    pub fn from_list<T: LayoutTree>(list: &ChatList<T>) -> Self {
        let metrics = list.metrics();
        Self {
            phase: list.phase(),
            entries: list.len(),
            pinned: list.is_pinned_to_bottom(),
            pending_assets: list.pending_assets(),
            queued: list.queued(),
            animating: list.is_animating(),
            scroll_offset: metrics.scroll_offset,
            max_offset: metrics.max_offset(),
        }
    }

    /// Left part of the bar.
    pub fn summary(&self) -> String {
        let mut parts = vec![
            self.phase.to_string(),
            format!("{} entries", self.entries),
            if self.pinned { "pinned" } else { "scrolled" }.to_string(),
        ];
        if self.pending_assets > 0 {
            parts.push(format!("{} loading", self.pending_assets));
        }
        if self.queued > 0 {
            parts.push(format!("{} queued", self.queued));
        }
        if self.animating {
            parts.push("fast scroll".to_string());
        }
        parts.push(format!("{:.0}/{:.0}", self.scroll_offset, self.max_offset));
        format!(" {}", parts.join(" │ "))
    }

    /// Draw the bar into `area`.
    pub fn render(&self, area: Rect, buf: &mut Buffer, styles: &ChatStyles) {
        let style = if self.animating || self.queued > 0 {
            styles.status_alert
        } else {
            styles.status
        };
        let summary = self.summary();
        let width = usize::from(area.width);
        let fitting = [KEY_HINTS, COMPACT_KEY_HINTS].into_iter().find_map(|hints| {
            let used = summary.chars().count() + hints.len() + 1;
            let gap = width.saturating_sub(used);
            (gap > 0).then_some((hints, gap))
        });
        let line = match fitting {
            Some((hints, gap)) => Line::from(vec![
                Span::raw(summary),
                Span::raw(" ".repeat(gap)),
                Span::raw(format!("{hints} ")),
            ]),
            None => Line::from(summary),
        };
        Paragraph::new(line).style(style).render(area, buf);
    }
}

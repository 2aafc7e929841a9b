//! Styling for the chat viewport.
//!
//! Provides distinct colors per side, for time headers and for media in
//! each settlement state.

use crate::model::{Entry, Side, SizeState};
use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Whether colors are enabled.
///
/// Priority (first match wins):
/// 1. `--no-color` flag (disables colors)
/// 2. `NO_COLOR` env var (any value disables colors)
/// 3. Default: colors enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Resolve from the `--no-color` flag and `NO_COLOR`.
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var("NO_COLOR").is_err();
        Self { enabled }
    }

    /// Whether colors are on.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== ChatStyles =====

/// Styles of the chat viewport and status bar.
#[derive(Debug, Clone, Copy)]
pub struct ChatStyles {
    /// Incoming bubbles.
    pub left: Style,
    /// Outgoing bubbles.
    pub right: Style,
    /// Time dividers.
    pub header: Style,
    /// Media still loading.
    pub media_pending: Style,
    /// Loaded media.
    pub media_settled: Style,
    /// Status bar.
    pub status: Style,
    /// Status bar while work is queued or animating.
    pub status_alert: Style,
}

impl ChatStyles {
    /// Colors off: only modifiers distinguish elements.
    pub fn plain() -> Self {
        Self {
            left: Style::default(),
            right: Style::default(),
            header: Style::default().add_modifier(Modifier::DIM),
            media_pending: Style::default().add_modifier(Modifier::DIM),
            media_settled: Style::default(),
            status: Style::default().add_modifier(Modifier::REVERSED),
            status_alert: Style::default()
                .add_modifier(Modifier::REVERSED)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Styles for a color mode.
    pub fn with_color_config(config: ColorConfig) -> Self {
        if !config.colors_enabled() {
            return Self::plain();
        }
        Self {
            left: Style::default().fg(Color::Cyan),
            right: Style::default().fg(Color::Green),
            header: Style::default().fg(Color::DarkGray),
            media_pending: Style::default().fg(Color::Yellow),
            media_settled: Style::default().fg(Color::Magenta),
            status: Style::default().fg(Color::Black).bg(Color::Gray),
            status_alert: Style::default().fg(Color::White).bg(Color::Red),
        }
    }

    /// Bubble style of a side.
    pub fn for_side(&self, side: Side) -> Style {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Style of the body of an entry.
    pub fn for_entry(&self, entry: &Entry) -> Style {
        if entry.is_header() {
            return self.header;
        }
        match entry.size_state() {
            Some(SizeState::Pending) => self.media_pending,
            Some(SizeState::Settled { .. }) => self.media_settled,
            None => self.for_side(entry.side().unwrap_or(Side::Left)),
        }
    }
}

impl Default for ChatStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env_and_args(false))
    }
}

//! Chat viewport widget.
//!
//! Maps the layout-unit geometry of a [`StackLayout`] onto terminal cells:
//! one column is [`CHAR_WIDTH`] units and one row is [`LINE_HEIGHT`] units.
//! Entries partly above or below the viewport are clipped row by row.

use super::styles::ChatStyles;
use crate::model::{Content, Entry, SettleOutcome, Side};
use crate::view_state::layout::{display_width, wrap_text, AVATAR_GUTTER, CHAR_WIDTH, LINE_HEIGHT};
use crate::view_state::{LayoutTree, Measure, StackLayout, Viewport};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthChar;

const AVATAR: &str = "(o)";
const PENDING_FILL: char = '·';
const SETTLED_FILL: char = '░';

/// Layout viewport matching a terminal area.
pub fn viewport_for(width: u16, height: u16) -> Viewport {
    Viewport::new(f64::from(width) * CHAR_WIDTH, f64::from(height) * LINE_HEIGHT)
}

/// Renders the visible part of a stack. The stack must be flushed.
pub struct ChatView<'a, M> {
    tree: &'a StackLayout<M>,
    styles: &'a ChatStyles,
}

impl<'a, M: Measure> ChatView<'a, M> {
    /// Widget over a laid-out stack.
    pub fn new(tree: &'a StackLayout<M>, styles: &'a ChatStyles) -> Self {
        Self { tree, styles }
    }
}

impl<M: Measure> Widget for ChatView<'_, M> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let scroll = self.tree.metrics().scroll_offset;
        let range = self.tree.visible_range();

        for view in self.tree.views().skip(range.start).take(range.len()) {
            let bbox = view.layout();
            let row0 = ((bbox.top - scroll) / LINE_HEIGHT).round() as i32;
            let rows = (bbox.height / LINE_HEIGHT).round().max(1.0) as usize;
            let col0 = ((bbox.left / CHAR_WIDTH).round() as u16).min(area.width);
            let cols = ((bbox.width / CHAR_WIDTH).round().max(1.0) as usize)
                .min(usize::from(area.width - col0));
            if cols == 0 {
                continue;
            }

            let entry = view.entry();
            let style = self.styles.for_entry(entry);
            for (r, line) in entry_lines(entry, cols, rows).iter().enumerate() {
                let y = row0 + r as i32;
                if y < 0 || y >= i32::from(area.height) {
                    continue;
                }
                buf.set_stringn(area.x + col0, area.y + y as u16, line, cols, style);
            }
        }
    }
}

/// Text rows of one entry, each `cols` columns wide.
pub fn entry_lines(entry: &Entry, cols: usize, rows: usize) -> Vec<String> {
    let rows = rows.max(1);
    match entry.content() {
        Content::Label { text } => {
            let mut lines = vec![divider(text, cols)];
            lines.resize(rows, " ".repeat(cols));
            lines
        }
        Content::Text { text } => {
            let gutter = gutter_columns(cols);
            let inner = cols.saturating_sub(gutter + 2).max(1);
            let body = wrap_text(text, inner);
            bubble(&body, entry.side(), cols, rows)
        }
        Content::Media(media) => {
            let gutter = gutter_columns(cols);
            let inner = cols.saturating_sub(gutter + 2).max(1);
            let settlement = media.settlement();
            let (fill, caption) = match (settlement.outcome(), settlement.intrinsic()) {
                (Some(SettleOutcome::Loaded), Some(size)) => {
                    (SETTLED_FILL, format!("{}×{}", size.width, size.height))
                }
                (Some(_), _) => (SETTLED_FILL, "unavailable".to_string()),
                (None, _) => (PENDING_FILL, "loading…".to_string()),
            };
            let body: Vec<String> = (0..rows.saturating_sub(2))
                .map(|i| {
                    let row = fill.to_string().repeat(inner);
                    if i == 0 {
                        overlay_center(&row, &caption, inner)
                    } else {
                        row
                    }
                })
                .collect();
            bubble(&body, entry.side(), cols, rows)
        }
    }
}

fn gutter_columns(cols: usize) -> usize {
    let gutter = (AVATAR_GUTTER / CHAR_WIDTH) as usize;
    if cols > gutter + 2 {
        gutter
    } else {
        0
    }
}

fn divider(label: &str, cols: usize) -> String {
    let label = format!(" {label} ");
    let width = display_width(&label);
    if width >= cols {
        return pad(&label, cols);
    }
    let left = (cols - width) / 2;
    let right = cols - width - left;
    format!("{}{}{}", "─".repeat(left), label, "─".repeat(right))
}

fn bubble(body: &[String], side: Option<Side>, cols: usize, rows: usize) -> Vec<String> {
    let gutter = gutter_columns(cols);
    let inner = cols.saturating_sub(gutter + 2).max(1);
    let mut bubble_rows = Vec::with_capacity(rows);
    bubble_rows.push(format!("╭{}╮", "─".repeat(inner)));
    for i in 0..rows.saturating_sub(2) {
        let text = body.get(i).map(String::as_str).unwrap_or("");
        bubble_rows.push(format!("│{}│", pad(text, inner)));
    }
    if rows >= 2 {
        bubble_rows.push(format!("╰{}╯", "─".repeat(inner)));
    }

    bubble_rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            if gutter == 0 {
                return row;
            }
            let avatar = if i == 1 || rows == 1 { AVATAR } else { "" };
            let slot = pad(avatar, gutter);
            match side {
                Some(Side::Right) => format!("{row}{}", pad(&format!("   {avatar}"), gutter)),
                _ => format!("{slot}{row}"),
            }
        })
        .collect()
}

fn pad(text: &str, cols: usize) -> String {
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > cols {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push_str(&" ".repeat(cols - width));
    out
}

fn overlay_center(row: &str, caption: &str, cols: usize) -> String {
    let width = display_width(caption);
    if width >= cols {
        return pad(caption, cols);
    }
    let left = (cols - width) / 2;
    let prefix: String = row.chars().take(left).collect();
    let suffix: String = row.chars().skip(left + width).collect();
    format!("{prefix}{caption}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssetRef, BoxSize, EntryId, MediaDescriptor, TimeBucket};
    use crate::state::SettlementCoordinator;

    fn id(raw: &str) -> EntryId {
        EntryId::new(raw).unwrap()
    }

    fn buffer_to_string(buffer: &Buffer) -> String {
        let area = buffer.area();
        let mut lines = Vec::new();
        for y in area.top()..area.bottom() {
            let mut line = String::new();
            for x in area.left()..area.right() {
                line.push_str(buffer[(x, y)].symbol());
            }
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }

    fn render(tree: &StackLayout, width: u16, height: u16) -> String {
        let styles = ChatStyles::plain();
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        ChatView::new(tree, &styles).render(area, &mut buf);
        buffer_to_string(&buf)
    }

    #[test]
    fn viewport_for_converts_cells_to_units() {
        let viewport = viewport_for(80, 24);
        assert_eq!(viewport.width, 640.0);
        assert_eq!(viewport.height, 480.0);
    }

    #[test]
    fn header_renders_centered_label() {
        let lines = entry_lines(
            &Entry::header(id("h"), TimeBucket::from_hm(9, 5).unwrap()),
            20,
            1,
        );
        assert_eq!(lines, vec!["───── 9:05 AM ──────".to_string()]);
    }

    #[test]
    fn left_text_bubble_has_avatar_first() {
        let lines = entry_lines(&Entry::text(id("m"), Side::Left, "hello"), 13, 3);
        assert_eq!(
            lines,
            vec![
                "      ╭─────╮".to_string(),
                "(o)   │hello│".to_string(),
                "      ╰─────╯".to_string(),
            ]
        );
    }

    #[test]
    fn right_text_bubble_has_avatar_last() {
        let lines = entry_lines(&Entry::text(id("m"), Side::Right, "hi"), 10, 3);
        assert_eq!(lines[1], "│hi│   (o)");
    }

    #[test]
    fn pending_media_shows_loading_caption() {
        let entry = Entry::media_message(
            id("m"),
            Side::Left,
            MediaDescriptor::new(AssetRef::new("a")),
            BoxSize::new(80.0, 60.0),
        );
        let lines = entry_lines(&entry, 20, 5);
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("loading…"));
        assert!(lines[2].contains(PENDING_FILL));
    }

    #[test]
    fn settled_media_shows_intrinsic_size() {
        let mut entry = Entry::media_message(
            id("m"),
            Side::Left,
            MediaDescriptor::new(AssetRef::new("a")),
            BoxSize::new(80.0, 60.0),
        );
        let coordinator = SettlementCoordinator::default();
        coordinator
            .on_asset_ready(
                &id("m"),
                entry.media_mut().unwrap(),
                BoxSize::new(300.0, 150.0),
                Viewport::new(800.0, 600.0),
            )
            .unwrap();

        let lines = entry_lines(&entry, 30, 5);

        assert!(lines[1].contains("300×150"));
    }

    #[test]
    fn stack_renders_visible_rows_only() {
        // GIVEN: a 30x4 viewport and a header followed by two bubbles
        let mut tree = StackLayout::new(viewport_for(30, 4));
        tree.append_child(Entry::header(id("h"), TimeBucket::from_hm(10, 0).unwrap()));
        tree.append_child(Entry::text(id("a"), Side::Left, "first"));
        tree.append_child(Entry::text(id("b"), Side::Right, "second"));
        tree.flush_layout();

        // WHEN: rendered at the top
        let top = render(&tree, 30, 4);

        // THEN: the header and the first bubble are visible, the second is not
        assert!(top.lines().next().unwrap().contains("10:00 AM"));
        assert!(top.contains("│first│"));
        assert!(!top.contains("second"));

        // WHEN: scrolled to the bottom
        let bottom_offset = tree.metrics().max_offset();
        tree.set_scroll_offset(bottom_offset);
        let bottom = render(&tree, 30, 4);

        // THEN: the right bubble ends at the right edge
        assert!(bottom.contains("│second│"));
        assert!(bottom.lines().any(|l| l.ends_with("(o)")));
    }

    #[test]
    fn zero_area_is_a_noop() {
        let tree = StackLayout::new(viewport_for(0, 0));
        let styles = ChatStyles::plain();
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        ChatView::new(&tree, &styles).render(area, &mut buf);
    }
}

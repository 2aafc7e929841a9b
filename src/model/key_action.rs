//! Domain-level keyboard actions independent of key bindings.

/// Actions of the demo viewer.
///
/// These represent user intent, not specific keys. The mapping from
/// `crossterm::event::KeyEvent` to `KeyAction` is handled by `KeyBindings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Scrolling
    /// Scroll up by one row. Default: k/↑
    ScrollUp,
    /// Scroll down by one row. Default: j/↓
    ScrollDown,
    /// Scroll up by one page. Default: Ctrl+u/Page Up
    PageUp,
    /// Scroll down by one page. Default: Ctrl+d/Page Down
    PageDown,
    /// Jump to the oldest content. Default: g/Home
    ScrollToTop,
    /// Jump to the newest content. Default: G/End
    ScrollToBottom,

    // Insertion
    /// One policy-default insertion. Default: i
    InsertOnce,
    /// Older history (divider + message) arriving above. Default: o
    InsertHistory,
    /// Incoming media message. Default: m
    InsertMedia,
    /// Fast-scroll animation followed by a burst of insertions. Default: s
    FastScroll,

    // Application
    /// Exit. Default: q/Ctrl+c
    Quit,
}

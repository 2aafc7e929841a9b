//! TUI rendering and terminal management (impure shell)

pub mod chat;
pub mod constants;
pub mod status;
mod styles;

pub use chat::{viewport_for, ChatView};
pub use status::StatusLine;
pub use styles::{ChatStyles, ColorConfig};

use crate::config::keybindings::KeyBindings;
use crate::integration::INSERTS_DURING_FAST_SCROLL;
use crate::model::{EntrySpec, KeyAction, Location, MediaSpec, Side, TimeBucket};
use crate::source::SimulatedAssets;
use crate::state::{ChatList, ListConfig};
use crate::view_state::layout::LINE_HEIGHT;
use constants::{
    ASSET_LATENCY_FRAMES, FAST_SCROLL_TOGGLES, FRAME_INTERVAL, INITIAL_INSERTS, STATUS_BAR_HEIGHT,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use thiserror::Error;
use tracing::{debug, info};

/// Intrinsic sizes cycled through by the media key.
const DEMO_MEDIA_SIZES: [(u32, u32); 4] = [(300, 200), (200, 300), (640, 480), (120, 120)];

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),
}

/// The interactive chat demo.
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    terminal: Terminal<B>,
    list: ChatList,
    source: SimulatedAssets,
    key_bindings: KeyBindings,
    styles: ChatStyles,
    media_cycle: usize,
    history_minute: u32,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize the demo on the real terminal
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(config: ListConfig, styles: ChatStyles) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self::with_terminal(terminal, config, styles))
    }

    /// Run the main event loop
    ///
    /// Returns when the user quits (q or Ctrl+C). Without input a frame is
    /// ticked every [`FRAME_INTERVAL`].
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            if event::poll(FRAME_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                    Event::Resize(width, height) => self.handle_resize(width, height),
                    _ => {}
                }
            } else {
                self.tick();
            }
            self.draw()?;
        }
    }
}

impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    /// Build the app over any backend and seed the list.
    pub fn with_terminal(terminal: Terminal<B>, config: ListConfig, styles: ChatStyles) -> Self {
        let size = terminal.size().unwrap_or_default();
        let viewport = viewport_for(
            size.width.max(1),
            size.height.saturating_sub(STATUS_BAR_HEIGHT).max(1),
        );
        let mut list = ChatList::new(viewport, config);
        for _ in 0..INITIAL_INSERTS {
            list.insert_once();
        }
        list.scroll_to_bottom();

        Self {
            terminal,
            list,
            source: SimulatedAssets::new(ASSET_LATENCY_FRAMES),
            key_bindings: KeyBindings::default(),
            styles,
            media_cycle: 0,
            history_minute: 0,
        }
    }

    /// The list being shown.
    pub fn list(&self) -> &ChatList {
        &self.list
    }

    /// One scheduler frame.
    pub fn tick(&mut self) {
        self.list.drive(&mut self.source);
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        let Some(action) = self.key_bindings.get(key) else {
            return false;
        };
        let page = self.list.metrics().viewport_extent;

        match action {
            KeyAction::Quit => return true,
            KeyAction::ScrollUp => self.list.scroll_by(-LINE_HEIGHT),
            KeyAction::ScrollDown => self.list.scroll_by(LINE_HEIGHT),
            KeyAction::PageUp => self.list.scroll_by(-page),
            KeyAction::PageDown => self.list.scroll_by(page),
            KeyAction::ScrollToTop => self.list.scroll_to_top(),
            KeyAction::ScrollToBottom => self.list.scroll_to_bottom(),
            KeyAction::InsertOnce => {
                self.list.insert_once();
            }
            KeyAction::InsertHistory => self.insert_history(),
            KeyAction::InsertMedia => self.insert_media(),
            KeyAction::FastScroll => {
                if self.list.start_fast_scroll(FAST_SCROLL_TOGGLES) {
                    for _ in 0..INSERTS_DURING_FAST_SCROLL {
                        self.list.insert_once();
                    }
                }
            }
        }
        debug!(?action, phase = %self.list.phase(), "Handled key");
        false
    }

    /// A divider with a message below it, arriving above everything.
    fn insert_history(&mut self) {
        let minute = self.history_minute % 60;
        self.history_minute += 1;
        let Some(bucket) = TimeBucket::from_hm(8, minute) else {
            return;
        };
        self.list.insert_batch(
            vec![
                EntrySpec::header(bucket),
                EntrySpec::text(Side::Left, format!("Earlier message from {bucket}")),
            ],
            Location::Top,
        );
    }

    fn insert_media(&mut self) {
        let (width, height) = DEMO_MEDIA_SIZES[self.media_cycle % DEMO_MEDIA_SIZES.len()];
        self.media_cycle += 1;
        let side = if self.media_cycle % 2 == 0 { Side::Left } else { Side::Right };
        self.list.insert_entry(EntrySpec::media(
            side,
            MediaSpec::new(SimulatedAssets::reference(width, height)),
        ));
    }

    /// Terminal resized: relayout in layout units.
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        let chat_height = height.saturating_sub(STATUS_BAR_HEIGHT);
        let viewport = viewport_for(width.max(1), chat_height.max(1));
        debug!(width, height, "Resize");
        self.list.set_viewport(viewport.width, viewport.height);
    }

    /// Render the current frame
    pub fn draw(&mut self) -> Result<(), TuiError> {
        self.list.flush_layout();
        let list = &self.list;
        let styles = &self.styles;
        self.terminal.draw(|frame| {
            let [chat_area, status_area] = split(frame.area());
            frame.render_widget(ChatView::new(list.tree(), styles), chat_area);
            StatusLine::from_list(list).render(status_area, frame.buffer_mut(), styles);
        })?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    #[cfg(test)]
    pub(crate) fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }
}

fn split(area: Rect) -> [Rect; 2] {
    Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)]).areas(area)
}

/// Run the demo on the real terminal.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run(config: ListConfig, styles: ChatStyles) -> Result<(), TuiError> {
    info!(seed = config.seed, "Starting chat demo");
    let mut app = TuiApp::new(config, styles)?;

    let result = app.run();

    // Always restore terminal state
    restore_terminal()?;

    result
}

/// Restore terminal to normal state
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

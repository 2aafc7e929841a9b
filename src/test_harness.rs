//! Acceptance Test Harness for TUI testing
//!
//! Wraps `TuiApp<TestBackend>` with methods for simulating key presses,
//! frames and resizes, and for reading back the rendered screen.

use crate::state::{ChatList, ListConfig};
use crate::view::{ChatStyles, TuiApp, TuiError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

/// Convert a ratatui buffer to a string, dropping empty trailing lines.
fn buffer_to_string(buffer: &ratatui::buffer::Buffer) -> String {
    let area = buffer.area();
    let mut lines = Vec::new();

    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            line.push_str(buffer[(x, y)].symbol());
        }
        lines.push(line.trim_end().to_string());
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

/// Test harness for acceptance testing
pub struct AcceptanceTestHarness {
    app: TuiApp<TestBackend>,
    running: bool,
}

impl AcceptanceTestHarness {
    /// Seeded demo on an 80x24 terminal.
    pub fn new(seed: u64) -> Result<Self, TuiError> {
        Self::with_size(seed, 80, 24)
    }

    pub fn with_size(seed: u64, width: u16, height: u16) -> Result<Self, TuiError> {
        let config = ListConfig {
            seed,
            ..ListConfig::default()
        };
        Self::with_config(config, width, height)
    }

    pub fn with_config(config: ListConfig, width: u16, height: u16) -> Result<Self, TuiError> {
        let terminal = Terminal::new(TestBackend::new(width, height))?;
        let app = TuiApp::with_terminal(terminal, config, ChatStyles::plain());
        Ok(Self { app, running: true })
    }

    /// Send a single key event
    ///
    /// Returns true if the app quit as a result of this key.
    pub fn send_key(&mut self, key: KeyCode) -> bool {
        self.send_key_with_mods(key, KeyModifiers::NONE)
    }

    pub fn send_key_with_mods(&mut self, key: KeyCode, mods: KeyModifiers) -> bool {
        if !self.running {
            return true;
        }

        let quit = self.app.handle_key(KeyEvent::new(key, mods));
        if quit {
            self.running = false;
        }
        quit
    }

    /// Send keys in order until the sequence ends or the app quits.
    pub fn send_keys(&mut self, keys: &[KeyCode]) {
        for key in keys {
            if self.send_key(*key) {
                break;
            }
        }
    }

    /// Advance `n` frames.
    pub fn tick(&mut self, n: usize) {
        for _ in 0..n {
            self.app.tick();
        }
    }

    /// Tick until nothing is in flight, animating or loading.
    ///
    /// Returns false if `max_frames` ran out first.
    pub fn settle(&mut self, max_frames: usize) -> bool {
        for _ in 0..max_frames {
            if self.is_quiet() {
                return true;
            }
            self.app.tick();
        }
        self.is_quiet()
    }

    fn is_quiet(&self) -> bool {
        let list = self.app.list();
        list.is_idle() && !list.is_animating() && list.pending_assets() == 0
    }

    /// Simulate a terminal resize.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.app.terminal_mut().backend_mut().resize(width, height);
        self.app.handle_resize(width, height);
    }

    pub fn list(&self) -> &ChatList {
        self.app.list()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Render the current frame to a string
    ///
    /// # Panics
    /// Panics if rendering fails (should never happen with TestBackend)
    pub fn render_to_string(&mut self) -> String {
        self.app
            .draw()
            .expect("Rendering should succeed in test harness");
        buffer_to_string(self.app.terminal().backend().buffer())
    }
}

//! Layout and timing constants of the demo viewer.

use std::time::Duration;

/// Height of the status bar in lines.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Frame pacing: one scheduler tick per interval while no input arrives.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Random insertions performed before the first frame.
pub const INITIAL_INSERTS: usize = 12;

/// Top/bottom toggles of the fast-scroll stress.
pub const FAST_SCROLL_TOGGLES: u32 = 20;

/// Frames a simulated asset takes to load.
pub const ASSET_LATENCY_FRAMES: u32 = 8;

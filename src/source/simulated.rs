//! Simulated asset loading for the demo and headless checks.
//!
//! References of the form `sim:<width>x<height>` load after a fixed number
//! of frames with that intrinsic size. `sim:lost` never answers, which
//! exercises the settlement time-out. Anything else fails.

use super::{AssetEvent, AssetSource};
use crate::model::{AssetRef, EntryId};

/// Prefix of simulated asset references.
pub const SIM_SCHEME: &str = "sim:";

#[derive(Debug, Clone, PartialEq)]
enum Planned {
    Ready { width: f64, height: f64 },
    Failed(String),
    Never,
}

#[derive(Debug, Clone)]
struct Loading {
    id: EntryId,
    frames_left: u32,
    planned: Planned,
}

/// Asset source resolving `sim:` references after `latency_frames` polls.
#[derive(Debug, Clone)]
pub struct SimulatedAssets {
    latency_frames: u32,
    loading: Vec<Loading>,
}

impl Default for SimulatedAssets {
    fn default() -> Self {
        Self::new(3)
    }
}

impl SimulatedAssets {
    /// Source answering every request after `latency_frames` polls.
    pub fn new(latency_frames: u32) -> Self {
        Self {
            latency_frames,
            loading: Vec::new(),
        }
    }

    /// Reference for a simulated image of the given size.
    pub fn reference(width: u32, height: u32) -> String {
        format!("{SIM_SCHEME}{width}x{height}")
    }

    /// Number of requests that have not produced an event yet.
    pub fn outstanding(&self) -> usize {
        self.loading.len()
    }

    fn plan(asset: &AssetRef) -> Planned {
        let Some(spec) = asset.as_str().strip_prefix(SIM_SCHEME) else {
            return Planned::Failed(format!("unsupported asset reference {asset}"));
        };
        if spec == "lost" {
            return Planned::Never;
        }
        let parsed = spec
            .split_once('x')
            .and_then(|(w, h)| Some((w.parse::<f64>().ok()?, h.parse::<f64>().ok()?)));
        match parsed {
            Some((width, height)) => Planned::Ready { width, height },
            None => Planned::Failed(format!("cannot decode size from {asset}")),
        }
    }
}

impl AssetSource for SimulatedAssets {
    fn request(&mut self, id: &EntryId, asset: &AssetRef) {
        self.loading.push(Loading {
            id: id.clone(),
            frames_left: self.latency_frames,
            planned: Self::plan(asset),
        });
    }

    fn poll(&mut self) -> Vec<AssetEvent> {
        let mut events = Vec::new();
        self.loading.retain_mut(|loading| {
            if loading.planned == Planned::Never {
                return true;
            }
            if loading.frames_left > 0 {
                loading.frames_left -= 1;
                return true;
            }
            let event = match &loading.planned {
                Planned::Ready { width, height } => AssetEvent::Ready {
                    id: loading.id.clone(),
                    width: *width,
                    height: *height,
                },
                Planned::Failed(reason) => AssetEvent::Failed {
                    id: loading.id.clone(),
                    reason: reason.clone(),
                },
                Planned::Never => return true,
            };
            events.push(event);
            false
        });
        events
    }
}

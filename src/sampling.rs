//! The sampling window that turns per-frame counters into ~1 Hz snapshots.

use std::time::Duration;

use bevy::prelude::Resource;

use crate::{
    backend::BackendKind, constants::DEFAULT_WINDOW_LENGTH, counters::RenderCounters,
    memory::MemorySample, snapshot::MetricSnapshot,
};

/// Frame count and start time of the window currently being accumulated.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct SamplingWindow {
    window_start: Duration,
    frame_count: u32,
    length: Duration,
}

impl Default for SamplingWindow {
    fn default() -> Self {
        Self::with_length(DEFAULT_WINDOW_LENGTH)
    }
}

impl SamplingWindow {
    pub fn with_length(length: Duration) -> Self {
        Self {
            window_start: Duration::ZERO,
            frame_count: 0,
            length,
        }
    }

    pub fn window_start(&self) -> Duration {
        self.window_start
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn length(&self) -> Duration {
        self.length
    }

    pub fn set_length(&mut self, length: Duration) {
        self.length = length;
    }

    /// Begin a fresh window at `now`. The start never moves backwards.
    pub fn restart(&mut self, now: Duration) {
        self.window_start = self.window_start.max(now);
        self.frame_count = 0;
    }

    /// Count one frame and close the window once it has lasted `length`.
    ///
    /// While the window is open this only bumps the frame count. On close it
    /// reads memory through `memory`, builds the snapshot, resets the counted
    /// subset of `counters`, and starts the next window at `now`.
    pub fn tick(
        &mut self,
        now: Duration,
        counters: &mut RenderCounters,
        backend: Option<BackendKind>,
        memory: impl FnOnce() -> MemorySample,
    ) -> Option<MetricSnapshot> {
        self.frame_count = self.frame_count.saturating_add(1);

        let elapsed = now.saturating_sub(self.window_start);
        if now < self.window_start || elapsed < self.length {
            return None;
        }

        let snapshot =
            MetricSnapshot::from_window(self.frame_count, elapsed, counters, memory(), backend);

        counters.reset_window_counters();
        self.frame_count = 0;
        self.window_start = now;

        Some(snapshot)
    }
}

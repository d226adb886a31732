// Copyright 2026 the Repaint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rolling frames-per-second aggregation.
//!
//! [`FrameClock`] is ticked exactly once per completed frame by the loop
//! driver. It buckets frames into fixed 1000 ms sampling windows: while a
//! window is open each tick only increments the frame count; the tick that
//! crosses the window boundary computes the window's FPS sample, appends it
//! to a fixed-capacity history (front-evicting), and opens the next window.
//!
//! Windows that elapsed entirely without a tick — a stalled or backgrounded
//! host — are backfilled with zero samples so the history stays a gap-free
//! one-sample-per-second timeline.
//!
//! [`StatSnapshot`] is the immutable view handed to overlay widgets and
//! other read-only consumers.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::time::{Duration, HostTime};

/// Width of one FPS sampling window.
pub const SAMPLE_WINDOW: Duration = Duration(1000);

/// Default number of retained FPS samples (~90 seconds of history).
pub const DEFAULT_HISTORY: usize = 90;

/// Read-only statistics snapshot.
///
/// Produced by [`FrameClock::snapshot`]; mutated by nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatSnapshot {
    /// Frames counted since the last completed sampling window.
    pub frames: u32,
    /// Timestamp of the last sampling-window boundary.
    pub time: HostTime,
    /// Highest FPS sample ever observed, across all windows (not just the
    /// retained history).
    pub max: u32,
    /// FPS history, oldest first. Length equals the clock's capacity.
    pub fps: Vec<u32>,
}

/// Per-loop FPS aggregator.
#[derive(Clone, Debug)]
pub struct FrameClock {
    /// Frames counted since `time`.
    frames: u32,
    /// Timestamp of the last sampling-window boundary.
    time: HostTime,
    /// Running maximum over all samples ever produced.
    max: u32,
    /// Fixed-capacity sample history, oldest at the front.
    history: VecDeque<u32>,
    capacity: usize,
}

impl FrameClock {
    /// Creates a clock whose first sampling window opens at `start`, with the
    /// default history capacity.
    #[must_use]
    pub fn new(start: HostTime) -> Self {
        Self::with_capacity(start, DEFAULT_HISTORY)
    }

    /// Creates a clock with an explicit history capacity.
    ///
    /// The history is prefilled with zero samples so its length is constant
    /// from the first frame on.
    #[must_use]
    pub fn with_capacity(start: HostTime, capacity: usize) -> Self {
        let mut history = VecDeque::with_capacity(capacity);
        history.resize(capacity, 0);
        Self {
            frames: 0,
            time: start,
            max: 0,
            history,
            capacity,
        }
    }

    /// Resets the clock to its all-zero starting state with a new first
    /// window opening at `start`.
    pub fn restart(&mut self, start: HostTime) {
        self.frames = 0;
        self.time = start;
        self.max = 0;
        self.history.clear();
        self.history.resize(self.capacity, 0);
    }

    /// Records one completed frame at `now`.
    ///
    /// Returns the newly computed FPS sample when `now` closed a sampling
    /// window, `None` while the current window is still open. Backfilled
    /// zero samples for fully-skipped windows are appended silently; the
    /// returned value is always the current window's computed sample.
    pub fn tick(&mut self, now: HostTime) -> Option<u32> {
        let elapsed = now.saturating_duration_since(self.time).millis();
        if elapsed < SAMPLE_WINDOW.millis() {
            self.frames = self.frames.saturating_add(1);
            return None;
        }

        // One zero sample per window that elapsed with no tick at all.
        let windows = elapsed / SAMPLE_WINDOW.millis();
        for _ in 1..windows {
            self.push_sample(0);
        }

        // FPS over the whole elapsed span, rounded, floored at 1 so even a
        // stalled-but-alive loop registers as drawing.
        let fps = ((u64::from(self.frames) * 1000 + elapsed / 2) / elapsed).max(1);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "frames is u32 and elapsed >= 1000, so fps <= frames"
        )]
        let fps = fps as u32;
        self.push_sample(fps);

        // The tick that closes a window is also the first frame of the next.
        self.frames = 1;
        self.time = now;
        Some(fps)
    }

    fn push_sample(&mut self, sample: u32) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(sample);
        if sample > self.max {
            self.max = sample;
        }
    }

    /// Frames counted since the last window boundary.
    #[must_use]
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Timestamp of the last window boundary.
    #[must_use]
    pub fn time(&self) -> HostTime {
        self.time
    }

    /// Highest FPS sample ever observed.
    #[must_use]
    pub fn max_fps(&self) -> u32 {
        self.max
    }

    /// Returns the current immutable statistics snapshot.
    #[must_use]
    pub fn snapshot(&self) -> StatSnapshot {
        StatSnapshot {
            frames: self.frames,
            time: self.time,
            max: self.max,
            fps: self.history.iter().copied().collect(),
        }
    }
}

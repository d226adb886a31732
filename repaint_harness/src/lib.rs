// Copyright 2026 the Repaint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Std hosts that drive a [`LoopDriver`].
//!
//! The core schedules nothing itself; these hosts close the loop:
//!
//! - [`ManualHost`] owns a simulated millisecond timeline and advances it
//!   according to each frame's [`Schedule`] directive. Deterministic, no
//!   real time involved — this is what the end-to-end tests drive.
//! - [`TimerHost`] maps a real [`Instant`] epoch onto the tick timeline and
//!   honors directives with [`thread::sleep`]. Suitable for headless tools
//!   and demos; a windowed host would use its frame callback instead.

use std::fmt;
use std::thread;
use std::time::Instant;

use repaint_core::driver::{FrameOutcome, FrameReport, LoopDriver, Schedule};
use repaint_core::surface::Surface;
use repaint_core::time::{Duration, HostTime};
use repaint_core::trace::Tracer;

/// Frame interval a [`ManualHost`] charges for a `NextFrame` directive,
/// approximating a 60 Hz display.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration(16);

/// Deterministic host over a simulated timeline.
///
/// [`step`](Self::step) runs one frame at the current simulated time, then
/// advances the timeline by whatever the returned directive asks for:
/// `NextFrame` costs the nominal frame interval, `After(d)` costs `d`, and
/// `Idle` leaves time untouched.
pub struct ManualHost<S, C> {
    driver: LoopDriver<S, C>,
    now: HostTime,
    frame_interval: Duration,
}

impl<S, C> fmt::Debug for ManualHost<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualHost")
            .field("now", &self.now)
            .field("frame_interval", &self.frame_interval)
            .field("driver", &self.driver)
            .finish()
    }
}

impl<S: Surface, C: Clone + Default> ManualHost<S, C> {
    /// Creates a host at simulated time zero with the default frame
    /// interval.
    #[must_use]
    pub fn new(driver: LoopDriver<S, C>) -> Self {
        Self {
            driver,
            now: HostTime(0),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }

    /// Sets the simulated cost of a `NextFrame` directive.
    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// The driven loop.
    #[must_use]
    pub fn driver(&self) -> &LoopDriver<S, C> {
        &self.driver
    }

    /// The driven loop, for configuration changes between steps.
    pub fn driver_mut(&mut self) -> &mut LoopDriver<S, C> {
        &mut self.driver
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.now
    }

    /// Moves simulated time forward without running a frame, as if the host
    /// were stalled or backgrounded.
    pub fn advance(&mut self, duration: Duration) {
        self.now += duration;
    }

    /// Runs one frame and advances the timeline per its directive.
    pub fn step(&mut self) -> FrameReport {
        self.step_traced(&mut Tracer::none())
    }

    /// Runs one traced frame and advances the timeline per its directive.
    pub fn step_traced(&mut self, tracer: &mut Tracer<'_>) -> FrameReport {
        let report = self.driver.run_frame_traced(self.now, tracer);
        match report.schedule {
            Schedule::NextFrame => self.now += self.frame_interval,
            Schedule::After(delay) => self.now += delay,
            Schedule::Idle => {}
        }
        report
    }

    /// Steps until the loop reports `Idle` or `max_frames` frames ran.
    ///
    /// Returns the number of non-idle frames executed.
    pub fn run_until_idle(&mut self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames {
            let report = self.step();
            if !matches!(report.outcome, FrameOutcome::Idle) {
                frames += 1;
            }
            if report.schedule == Schedule::Idle {
                break;
            }
        }
        frames
    }
}

/// Wall-clock host: real timestamps, real sleeps.
pub struct TimerHost<S, C> {
    driver: LoopDriver<S, C>,
    epoch: Instant,
    frame_interval: Duration,
}

impl<S, C> fmt::Debug for TimerHost<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHost")
            .field("frame_interval", &self.frame_interval)
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

impl<S: Surface, C: Clone + Default> TimerHost<S, C> {
    /// Creates a host whose tick timeline starts now.
    #[must_use]
    pub fn new(driver: LoopDriver<S, C>) -> Self {
        Self {
            driver,
            epoch: Instant::now(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }

    /// Sets the sleep used for a `NextFrame` directive.
    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// The driven loop, for configuration changes between runs.
    pub fn driver_mut(&mut self) -> &mut LoopDriver<S, C> {
        &mut self.driver
    }

    /// Milliseconds elapsed since the host was created.
    #[must_use]
    pub fn now(&self) -> HostTime {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "u64 milliseconds overflow after ~585 million years"
        )]
        HostTime(self.epoch.elapsed().as_millis() as u64)
    }

    /// Runs frames, sleeping between them per each directive, until the
    /// loop goes idle or `max_frames` frames ran.
    ///
    /// Returns the number of non-idle frames executed.
    pub fn run(&mut self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames {
            let report = self.driver.run_frame(self.now());
            if !matches!(report.outcome, FrameOutcome::Idle) {
                frames += 1;
            }
            match report.schedule {
                Schedule::NextFrame => {
                    thread::sleep(std::time::Duration::from_millis(self.frame_interval.millis()));
                }
                Schedule::After(delay) => {
                    thread::sleep(std::time::Duration::from_millis(delay.millis()));
                }
                Schedule::Idle => break,
            }
        }
        frames
    }
}

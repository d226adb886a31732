// Copyright 2026 the Repaint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame loop.
//!
//! [`TraceSink`] has one method per loop event, all defaulting to no-ops, so
//! sinks implement only what they care about. Renderer and hook failures are
//! delivered here — this is how "caught and logged" failures surface without
//! the `no_std` core depending on any logging framework.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. With the `trace`
//! feature **off**, every `Tracer` method compiles to nothing; with it
//! **on**, each method is a single `Option` branch before dispatch.

use crate::driver::{HookPhase, Schedule};
use crate::error::FrameError;
use crate::registry::{RendererId, RendererPhase};
use crate::surface::SurfaceId;
use crate::time::HostTime;

/// Emitted when a frame begins executing.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Host-supplied frame timestamp.
    pub now: HostTime,
    /// The bound surface.
    pub surface: SurfaceId,
}

/// Emitted when a frame finishes (including aborted frames).
#[derive(Clone, Copy, Debug)]
pub struct FrameEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Renderers that completed successfully.
    pub rendered: usize,
    /// Renderers whose setup or render failed.
    pub failed: usize,
    /// The cadence directive returned to the host.
    pub schedule: Schedule,
}

/// Emitted when a lifecycle hook fails.
#[derive(Debug)]
pub struct HookErrorEvent<'e> {
    /// Frame counter.
    pub frame_index: u64,
    /// Which hook failed.
    pub phase: HookPhase,
    /// The failure.
    pub error: &'e FrameError,
}

/// Emitted when a single renderer's setup or render fails.
#[derive(Debug)]
pub struct RendererErrorEvent<'e> {
    /// Frame counter.
    pub frame_index: u64,
    /// The failing renderer.
    pub renderer: RendererId,
    /// Which phase failed.
    pub phase: RendererPhase,
    /// The failure.
    pub error: &'e FrameError,
}

/// Emitted when the clock closes a sampling window.
#[derive(Clone, Copy, Debug)]
pub struct StatSampleEvent {
    /// Frame counter of the closing frame.
    pub frame_index: u64,
    /// The new FPS sample.
    pub fps: u32,
    /// Running maximum over all samples.
    pub max: u32,
}

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called when a frame begins executing.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called when a frame finishes.
    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = e;
    }

    /// Called when a lifecycle hook fails.
    fn on_hook_error(&mut self, e: &HookErrorEvent<'_>) {
        _ = e;
    }

    /// Called when a renderer's setup or render fails.
    fn on_renderer_error(&mut self, e: &RendererErrorEvent<'_>) {
        _ = e;
    }

    /// Called when a new FPS sample is produced.
    fn on_stat_sample(&mut self, e: &StatSampleEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameEndEvent`].
    #[inline]
    pub fn frame_end(&mut self, e: &FrameEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`HookErrorEvent`].
    #[inline]
    pub fn hook_error(&mut self, e: &HookErrorEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_hook_error(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RendererErrorEvent`].
    #[inline]
    pub fn renderer_error(&mut self, e: &RendererErrorEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_renderer_error(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`StatSampleEvent`].
    #[inline]
    pub fn stat_sample(&mut self, e: &StatSampleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_stat_sample(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

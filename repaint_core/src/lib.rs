// Copyright 2026 the Repaint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sans-io render-loop scheduler binding drawing surfaces to renderers.
//!
//! `repaint_core` drives a set of prioritized per-frame drawing callbacks
//! over a host-owned drawing surface, with memoized one-time context setup,
//! rolling FPS statistics, and a pluggable cadence. It is `no_std`
//! compatible (with `alloc`) and owns no event loop: the single entry point
//! [`LoopDriver::run_frame`](driver::LoopDriver::run_frame) executes exactly
//! one frame and returns a [`Schedule`](driver::Schedule) directive telling
//! the host when to call again.
//!
//! # Architecture
//!
//! ```text
//!   Host (timer / frame callback)
//!       │  run_frame(now)
//!       ▼
//!   LoopDriver ──► root ContextCell ──► before hook
//!       │
//!       ▼
//!   RendererRegistry dispatch (priority order, per-slot ContextCell)
//!       │
//!       ▼
//!   FrameClock::tick ──► after hook ──► FrameReport { outcome, schedule }
//! ```
//!
//! **[`driver`]** — The frame state machine: cadence policy, lifecycle
//! hooks, failure isolation, single-shot re-entry stamps.
//!
//! **[`registry`]** — The [`Renderer`](registry::Renderer) trait and the
//! priority-ordered registry of drawing callbacks.
//!
//! **[`surface`]** — The [`Surface`](surface::Surface) seam hosts implement,
//! and the binding that ties the active surface to the root context.
//!
//! **[`memo`]** — [`ContextCell`](memo::ContextCell), the explicit
//! uninitialized/pending/resolved state machine behind every memoized setup.
//!
//! **[`clock`]** — Rolling FPS aggregation over fixed 1-second windows with
//! a bounded, zero-backfilled history.
//!
//! **[`transform`]** — Rect-to-rect fitting transforms for drawing at a
//! virtual resolution, per drawing-context coordinate convention.
//!
//! **[`time`]** — Millisecond-tick [`HostTime`](time::HostTime) and
//! [`Duration`](time::Duration); the core never reads a platform clock.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies and
//!   `std::error::Error` for [`FrameError`](error::FrameError).
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod clock;
pub mod driver;
pub mod error;
pub mod memo;
pub mod registry;
pub mod surface;
pub mod time;
pub mod trace;
pub mod transform;

// Copyright 2026 the Repaint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render-loop driver.
//!
//! [`LoopDriver`] orchestrates one full frame — root-context setup, before
//! hook, priority-ordered renderer dispatch, stat tick, after hook — through
//! a single entry point, [`run_frame`]. It never schedules itself: each call
//! returns a [`Schedule`] directive that the external host interprets with
//! whatever timer or frame-callback primitive it has. This keeps the core
//! free of any concurrency runtime; an animation-frame callback, a fixed
//! timer, and a test harness all drive the same state machine.
//!
//! # Frame pipeline
//!
//! ```text
//! run_frame(now)
//!   ├─ idle checks: running flag, bound surface, single-shot stamp
//!   ├─ frame-setup: root context (memoized per surface instance)
//!   ├─ before hook        — failure aborts the frame, not the loop
//!   ├─ dispatch           — registry snapshot, sequential, per-renderer
//!   │                       failures isolated
//!   ├─ clock tick         — exactly once, with the frame timestamp
//!   ├─ after hook         — failure recorded, not fatal
//!   └─ Schedule directive per the configured cadence
//! ```
//!
//! # Failure policy
//!
//! A failing before hook aborts the current frame's dispatch and after
//! phases but never stops the cadence: the next scheduled frame runs
//! normally. Every failure is emitted as a trace event, so a persistently
//! failing hook is observable rather than a silent spin. The after hook and
//! individual renderers get the same isolation.
//!
//! [`run_frame`]: LoopDriver::run_frame

use alloc::boxed::Box;
use core::fmt;

use crate::clock::{FrameClock, StatSnapshot};
use crate::error::FrameError;
use crate::registry::{FrameInfo, Renderer, RendererId, RendererRegistry};
use crate::surface::{Surface, SurfaceBinding};
use crate::time::{Duration, HostTime};
use crate::trace::{
    FrameBeginEvent, FrameEndEvent, HookErrorEvent, RendererErrorEvent, StatSampleEvent, Tracer,
};

/// Which lifecycle hook failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookPhase {
    /// The root context setup hook.
    Setup,
    /// The before-frame hook.
    Before,
    /// The after-frame hook.
    After,
}

/// Root-context setup hook: runs at most once per bound surface instance.
pub type SetupFn<S, C> = Box<dyn FnMut(&mut S) -> Result<C, FrameError>>;

/// Before/after frame hook, invoked with the surface and root context.
pub type HookFn<S, C> = Box<dyn FnMut(&mut S, &C) -> Result<(), FrameError>>;

/// Custom cadence: maps (next frame index, now) to a [`Schedule`].
pub type ScheduleFn = Box<dyn FnMut(u64, HostTime) -> Schedule>;

/// When the host should run the next frame.
///
/// Returned from [`LoopDriver::run_frame`]; the host interprets it with its
/// platform primitive (frame callback, timer) or, for [`Idle`](Self::Idle),
/// stops calling until a configuration change warrants re-entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Schedule {
    /// Run again on the next frame opportunity (animation-frame pacing).
    NextFrame,
    /// Run again after the given delay.
    After(Duration),
    /// Do not schedule another frame.
    Idle,
}

/// Frame-rate driven dispatch strategy.
pub enum Cadence {
    /// Exactly one frame per configuration; re-runs only when the surface,
    /// the renderer composition, or the hooks change.
    SingleShot,
    /// One frame per host frame callback.
    AnimationFrame,
    /// One frame every fixed delay.
    ///
    /// A zero delay is the degenerate configuration and degrades to
    /// [`SingleShot`](Self::SingleShot) behavior (no scheduling).
    FixedDelay(Duration),
    /// Host-supplied scheduling function.
    Custom(ScheduleFn),
}

impl fmt::Debug for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleShot => f.write_str("SingleShot"),
            Self::AnimationFrame => f.write_str("AnimationFrame"),
            Self::FixedDelay(delay) => f.debug_tuple("FixedDelay").field(delay).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Loop configuration: cadence plus the optional lifecycle hooks.
pub struct RunLoopConfig<S, C> {
    /// The dispatch strategy.
    pub cadence: Cadence,
    setup: Option<SetupFn<S, C>>,
    before: Option<HookFn<S, C>>,
    after: Option<HookFn<S, C>>,
}

impl<S, C> RunLoopConfig<S, C> {
    /// Creates a configuration with the given cadence and no hooks.
    #[must_use]
    pub fn new(cadence: Cadence) -> Self {
        Self {
            cadence,
            setup: None,
            before: None,
            after: None,
        }
    }

    /// Sets the root-context setup hook.
    #[must_use]
    pub fn with_setup(mut self, setup: SetupFn<S, C>) -> Self {
        self.setup = Some(setup);
        self
    }

    /// Sets the before-frame hook.
    #[must_use]
    pub fn with_before(mut self, before: HookFn<S, C>) -> Self {
        self.before = Some(before);
        self
    }

    /// Sets the after-frame hook.
    #[must_use]
    pub fn with_after(mut self, after: HookFn<S, C>) -> Self {
        self.after = Some(after);
        self
    }
}

impl<S, C> fmt::Debug for RunLoopConfig<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunLoopConfig")
            .field("cadence", &self.cadence)
            .field("setup", &self.setup.is_some())
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// What one [`run_frame`](LoopDriver::run_frame) call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No work: driver stopped, no surface bound, or single-shot already
    /// satisfied. Not an error.
    Idle,
    /// Root-context setup failed. The root cell stays uninitialized, so the
    /// next scheduled frame retries.
    SetupFailed(FrameError),
    /// The before hook failed; dispatch and the after hook were skipped.
    Aborted(FrameError),
    /// Dispatch ran to completion.
    Completed {
        /// Renderers that completed successfully.
        rendered: usize,
        /// Renderers whose setup or render failed (isolated).
        failed: usize,
        /// After-hook failure, if any (isolated).
        after_error: Option<FrameError>,
    },
}

/// Result of one frame: the outcome plus the cadence directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// What the frame did.
    pub outcome: FrameOutcome,
    /// When the host should run the next frame.
    pub schedule: Schedule,
}

impl FrameReport {
    const IDLE: Self = Self {
        outcome: FrameOutcome::Idle,
        schedule: Schedule::Idle,
    };
}

/// Generations of the three re-entry triggers: surface binding, renderer
/// composition, hooks/cadence.
type Stamp = (u64, u64, u64);

/// Orchestrates frames over a bound surface and a renderer registry.
///
/// `S` is the concrete surface type, `C` the context type shared by the root
/// setup hook and all renderers (`C::default()` is the root context when no
/// setup hook is configured).
pub struct LoopDriver<S, C> {
    config: RunLoopConfig<S, C>,
    binding: SurfaceBinding<S, C>,
    registry: RendererRegistry<S, C>,
    clock: FrameClock,
    last_stats: StatSnapshot,
    running: bool,
    started: bool,
    frame_index: u64,
    hooks_generation: u64,
    last_run: Option<Stamp>,
}

impl<S, C> fmt::Debug for LoopDriver<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopDriver")
            .field("running", &self.running)
            .field("frame_index", &self.frame_index)
            .field("renderers", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl<S: Surface, C: Clone + Default> LoopDriver<S, C> {
    /// Creates a driver with the given configuration, no surface bound, and
    /// an empty registry.
    #[must_use]
    pub fn new(config: RunLoopConfig<S, C>) -> Self {
        let clock = FrameClock::new(HostTime::default());
        let last_stats = clock.snapshot();
        Self {
            config,
            binding: SurfaceBinding::new(),
            registry: RendererRegistry::new(),
            clock,
            last_stats,
            running: true,
            started: false,
            frame_index: 0,
            hooks_generation: 0,
            last_run: None,
        }
    }

    /// Runs one frame, untraced.
    pub fn run_frame(&mut self, now: HostTime) -> FrameReport {
        self.run_frame_traced(now, &mut Tracer::none())
    }

    /// Runs one frame, emitting trace events to `tracer`.
    pub fn run_frame_traced(&mut self, now: HostTime, tracer: &mut Tracer<'_>) -> FrameReport {
        if !self.running {
            return FrameReport::IDLE;
        }
        let Some(surface_id) = self.binding.surface().map(Surface::id) else {
            return FrameReport::IDLE;
        };
        let stamp = self.stamp();
        if self.is_single_shot() && self.last_run == Some(stamp) {
            return FrameReport::IDLE;
        }

        // The stat lifecycle begins at loop start.
        if !self.started {
            self.clock.restart(now);
            self.last_stats = self.clock.snapshot();
            self.started = true;
        }
        let frame_index = self.frame_index;
        self.frame_index += 1;
        self.last_run = Some(stamp);
        tracer.frame_begin(&FrameBeginEvent {
            frame_index,
            now,
            surface: surface_id,
        });

        let Some((surface, root_cell)) = self.binding.parts_mut() else {
            return FrameReport::IDLE;
        };

        // frame-setup: root context, at most once per surface instance.
        let setup = self.config.setup.as_mut();
        let root = match root_cell.get_or_init(|| match setup {
            Some(setup) => setup(surface),
            None => Ok(C::default()),
        }) {
            Ok(root) => root.clone(),
            Err(error) => {
                tracer.hook_error(&HookErrorEvent {
                    frame_index,
                    phase: HookPhase::Setup,
                    error: &error,
                });
                let schedule = self.next_schedule(now);
                tracer.frame_end(&FrameEndEvent {
                    frame_index,
                    rendered: 0,
                    failed: 0,
                    schedule,
                });
                return FrameReport {
                    outcome: FrameOutcome::SetupFailed(error),
                    schedule,
                };
            }
        };

        // before-hook: failure aborts this frame but not the cadence.
        if let Some(before) = self.config.before.as_mut() {
            if let Err(error) = before(surface, &root) {
                tracer.hook_error(&HookErrorEvent {
                    frame_index,
                    phase: HookPhase::Before,
                    error: &error,
                });
                let schedule = self.next_schedule(now);
                tracer.frame_end(&FrameEndEvent {
                    frame_index,
                    rendered: 0,
                    failed: 0,
                    schedule,
                });
                return FrameReport {
                    outcome: FrameOutcome::Aborted(error),
                    schedule,
                };
            }
        }

        // dispatch: the snapshot fixes this frame's order and membership;
        // registrations made mid-frame start next frame.
        let ids = self.registry.snapshot();
        let mut rendered = 0;
        let mut failed = 0;
        {
            let info = FrameInfo {
                frame_index,
                now,
                stats: &self.last_stats,
            };
            for id in ids {
                let Some(slot) = self.registry.slot_mut(id) else {
                    continue;
                };
                match slot.run(surface, &root, &info) {
                    Ok(()) => rendered += 1,
                    Err((phase, error)) => {
                        failed += 1;
                        tracer.renderer_error(&RendererErrorEvent {
                            frame_index,
                            renderer: id,
                            phase,
                            error: &error,
                        });
                    }
                }
            }
        }

        // The clock is ticked exactly once per frame, after dispatch.
        if let Some(fps) = self.clock.tick(now) {
            tracer.stat_sample(&StatSampleEvent {
                frame_index,
                fps,
                max: self.clock.max_fps(),
            });
        }
        self.last_stats = self.clock.snapshot();

        // after-hook: isolated like the before hook, but the frame already
        // rendered, so the failure rides along in the outcome.
        let mut after_error = None;
        if let Some(after) = self.config.after.as_mut() {
            if let Err(error) = after(surface, &root) {
                tracer.hook_error(&HookErrorEvent {
                    frame_index,
                    phase: HookPhase::After,
                    error: &error,
                });
                after_error = Some(error);
            }
        }

        let schedule = self.next_schedule(now);
        tracer.frame_end(&FrameEndEvent {
            frame_index,
            rendered,
            failed,
            schedule,
        });
        FrameReport {
            outcome: FrameOutcome::Completed {
                rendered,
                failed,
                after_error,
            },
            schedule,
        }
    }

    /// Replaces the bound surface (see [`SurfaceBinding::bind`]).
    pub fn bind_surface(&mut self, surface: Option<S>) {
        self.binding.bind(surface);
    }

    /// Registers a renderer (see [`RendererRegistry::register`]).
    pub fn register(
        &mut self,
        id: RendererId,
        priority: i32,
        renderer: Box<dyn Renderer<S, C>>,
    ) -> bool {
        self.registry.register(id, priority, renderer)
    }

    /// Unregisters a renderer (see [`RendererRegistry::unregister`]).
    pub fn unregister(&mut self, id: RendererId) -> bool {
        self.registry.unregister(id)
    }

    /// Replaces the cadence policy.
    pub fn set_cadence(&mut self, cadence: Cadence) {
        self.config.cadence = cadence;
        self.hooks_generation += 1;
    }

    /// Replaces the root-context setup hook.
    ///
    /// A new setup callable is a new memoization identity: the root context
    /// cell is invalidated and the next frame re-runs setup.
    pub fn set_setup(&mut self, setup: Option<SetupFn<S, C>>) {
        self.config.setup = setup;
        self.binding.root_mut().invalidate();
        self.hooks_generation += 1;
    }

    /// Replaces the before-frame hook.
    pub fn set_before(&mut self, before: Option<HookFn<S, C>>) {
        self.config.before = before;
        self.hooks_generation += 1;
    }

    /// Replaces the after-frame hook.
    pub fn set_after(&mut self, after: Option<HookFn<S, C>>) {
        self.config.after = after;
        self.hooks_generation += 1;
    }

    /// Clears the running flag.
    ///
    /// Cooperative: an already-scheduled host callback may still call
    /// [`run_frame`](Self::run_frame) once more and will cleanly no-op.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Sets the running flag, beginning a fresh loop lifecycle (statistics
    /// restart with the first frame).
    pub fn start(&mut self) {
        self.running = true;
        self.started = false;
    }

    /// Whether the loop is running (stopped loops never do frame work).
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Index of the next frame to execute.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Statistics as of the last completed frame.
    #[must_use]
    pub fn stats(&self) -> &StatSnapshot {
        &self.last_stats
    }

    /// The surface binding.
    #[must_use]
    pub fn binding(&self) -> &SurfaceBinding<S, C> {
        &self.binding
    }

    /// The surface binding, for hosts that resolve the root context
    /// externally via [`SurfaceBinding::root_mut`] and the cell's
    /// `begin`/`fulfill` protocol. While the root cell is pending, frames
    /// report [`FrameOutcome::SetupFailed`] and the cadence keeps
    /// scheduling.
    pub fn binding_mut(&mut self) -> &mut SurfaceBinding<S, C> {
        &mut self.binding
    }

    /// The renderer registry.
    #[must_use]
    pub fn registry(&self) -> &RendererRegistry<S, C> {
        &self.registry
    }

    /// The renderer registry, for composition changes.
    pub fn registry_mut(&mut self) -> &mut RendererRegistry<S, C> {
        &mut self.registry
    }

    fn stamp(&self) -> Stamp {
        (
            self.binding.generation(),
            self.registry.generation(),
            self.hooks_generation,
        )
    }

    fn is_single_shot(&self) -> bool {
        match &self.config.cadence {
            Cadence::SingleShot => true,
            Cadence::FixedDelay(delay) => delay.millis() == 0,
            Cadence::AnimationFrame | Cadence::Custom(_) => false,
        }
    }

    fn next_schedule(&mut self, now: HostTime) -> Schedule {
        match &mut self.config.cadence {
            Cadence::SingleShot => Schedule::Idle,
            Cadence::AnimationFrame => Schedule::NextFrame,
            Cadence::FixedDelay(delay) => {
                if delay.millis() == 0 {
                    // Degenerate delay: no scheduling.
                    Schedule::Idle
                } else {
                    Schedule::After(*delay)
                }
            }
            Cadence::Custom(schedule) => schedule(self.frame_index, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SurfaceId;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    struct TestSurface {
        id: SurfaceId,
    }

    impl Surface for TestSurface {
        fn id(&self) -> SurfaceId {
            self.id
        }
        fn width(&self) -> u32 {
            320
        }
        fn height(&self) -> u32 {
            240
        }
    }

    fn surface(id: u32) -> TestSurface {
        TestSurface { id: SurfaceId(id) }
    }

    /// Renderer fixture recording setup/render counts, dispatch order, and
    /// the context it rendered with.
    #[derive(Default)]
    struct Probe {
        setups: Cell<u32>,
        renders: Cell<u32>,
        last_ctx: Cell<u32>,
        fail_setup: Cell<bool>,
        fail_render: Cell<bool>,
        order: RefCell<Vec<u32>>,
    }

    struct ProbeRenderer {
        probe: Rc<Probe>,
        tag: u32,
    }

    impl Renderer<TestSurface, u32> for ProbeRenderer {
        fn setup(&mut self, _surface: &mut TestSurface, parent: &u32) -> Result<u32, FrameError> {
            self.probe.setups.set(self.probe.setups.get() + 1);
            if self.probe.fail_setup.get() {
                return Err(FrameError::new("setup failed"));
            }
            Ok(parent + 1)
        }

        fn render(
            &mut self,
            _surface: &mut TestSurface,
            ctx: &u32,
            _frame: &FrameInfo<'_>,
        ) -> Result<(), FrameError> {
            if self.probe.fail_render.get() {
                return Err(FrameError::new("render failed"));
            }
            self.probe.renders.set(self.probe.renders.get() + 1);
            self.probe.last_ctx.set(*ctx);
            self.probe.order.borrow_mut().push(self.tag);
            Ok(())
        }
    }

    fn renderer(probe: &Rc<Probe>, tag: u32) -> Box<dyn Renderer<TestSurface, u32>> {
        Box::new(ProbeRenderer {
            probe: Rc::clone(probe),
            tag,
        })
    }

    fn driver(cadence: Cadence) -> LoopDriver<TestSurface, u32> {
        LoopDriver::new(RunLoopConfig::new(cadence))
    }

    #[test]
    fn idle_without_surface() {
        let mut drv = driver(Cadence::AnimationFrame);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 1));

        let report = drv.run_frame(HostTime(0));
        assert_eq!(report, FrameReport::IDLE);
        assert_eq!(probe.renders.get(), 0);
        assert_eq!(drv.frame_index(), 0, "idle frames do not count");
    }

    #[test]
    fn setup_runs_once_across_frames() {
        let mut drv = driver(Cadence::AnimationFrame);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 1));
        drv.bind_surface(Some(surface(1)));

        for i in 0..3 {
            let report = drv.run_frame(HostTime(i * 16));
            assert_eq!(report.schedule, Schedule::NextFrame);
        }
        assert_eq!(probe.setups.get(), 1, "setup memoized across frames");
        assert_eq!(probe.renders.get(), 3);
    }

    #[test]
    fn replacing_the_renderer_instance_reruns_setup() {
        let mut drv = driver(Cadence::AnimationFrame);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 1));
        drv.bind_surface(Some(surface(1)));
        drv.run_frame(HostTime(0));
        assert_eq!(probe.setups.get(), 1);

        // Same probe, new identity: fresh memoization cell.
        drv.unregister(RendererId(1));
        drv.register(RendererId(2), 0, renderer(&probe, 1));
        drv.run_frame(HostTime(16));
        assert_eq!(probe.setups.get(), 2);
    }

    #[test]
    fn root_context_flows_into_renderer_setup() {
        let config = RunLoopConfig::new(Cadence::AnimationFrame)
            .with_setup(Box::new(|_s: &mut TestSurface| Ok(7_u32)));
        let mut drv = LoopDriver::new(config);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 1));
        drv.bind_surface(Some(surface(1)));

        drv.run_frame(HostTime(0));
        assert_eq!(probe.last_ctx.get(), 8, "renderer setup saw root 7");
    }

    #[test]
    fn default_root_context_without_setup_hook() {
        let mut drv = driver(Cadence::AnimationFrame);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 1));
        drv.bind_surface(Some(surface(1)));
        drv.run_frame(HostTime(0));
        assert_eq!(probe.last_ctx.get(), 1, "parent = u32::default() = 0");
    }

    #[test]
    fn dispatch_order_follows_priority() {
        let mut drv = driver(Cadence::AnimationFrame);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 10));
        drv.register(RendererId(2), 5, renderer(&probe, 20));
        drv.register(RendererId(3), 0, renderer(&probe, 30));
        drv.bind_surface(Some(surface(1)));

        drv.run_frame(HostTime(0));
        assert_eq!(*probe.order.borrow(), [20, 10, 30]);
    }

    #[test]
    fn renderer_failure_is_isolated() {
        let mut drv = driver(Cadence::AnimationFrame);
        let failing = Rc::new(Probe::default());
        failing.fail_render.set(true);
        let healthy = Rc::new(Probe::default());
        drv.register(RendererId(1), 10, renderer(&failing, 1));
        drv.register(RendererId(2), 0, renderer(&healthy, 2));
        drv.bind_surface(Some(surface(1)));

        let report = drv.run_frame(HostTime(0));
        assert_eq!(
            report.outcome,
            FrameOutcome::Completed {
                rendered: 1,
                failed: 1,
                after_error: None,
            }
        );
        assert_eq!(healthy.renders.get(), 1, "later renderer still ran");
    }

    #[test]
    fn renderer_setup_failure_retries_next_frame() {
        let mut drv = driver(Cadence::AnimationFrame);
        let probe = Rc::new(Probe::default());
        probe.fail_setup.set(true);
        drv.register(RendererId(1), 0, renderer(&probe, 1));
        drv.bind_surface(Some(surface(1)));

        drv.run_frame(HostTime(0));
        assert_eq!(probe.renders.get(), 0);

        probe.fail_setup.set(false);
        drv.run_frame(HostTime(16));
        assert_eq!(probe.setups.get(), 2, "failed setup retried");
        assert_eq!(probe.renders.get(), 1);
    }

    #[test]
    fn pending_renderer_cell_stalls_only_that_renderer() {
        let mut drv = driver(Cadence::AnimationFrame);
        let scene = Rc::new(Probe::default());
        let deferred = Rc::new(Probe::default());
        drv.register(RendererId(1), 10, renderer(&scene, 1));
        drv.register(RendererId(2), 0, renderer(&deferred, 2));
        drv.bind_surface(Some(surface(1)));

        // The host issues renderer 2's setup externally.
        assert!(drv.registry_mut().cell_mut(RendererId(2)).unwrap().begin());

        let report = drv.run_frame(HostTime(0));
        assert_eq!(
            report.outcome,
            FrameOutcome::Completed {
                rendered: 1,
                failed: 1,
                after_error: None,
            }
        );
        assert_eq!(scene.renders.get(), 1, "other renderers still ran");
        assert_eq!(deferred.renders.get(), 0);
        assert_eq!(
            deferred.setups.get(),
            0,
            "pending cell does not re-issue setup"
        );

        assert!(drv.registry_mut().cell_mut(RendererId(2)).unwrap().fulfill(42));
        let report = drv.run_frame(HostTime(16));
        assert_eq!(
            report.outcome,
            FrameOutcome::Completed {
                rendered: 2,
                failed: 0,
                after_error: None,
            }
        );
        assert_eq!(
            deferred.setups.get(),
            0,
            "fulfilled context skips the setup hook"
        );
        assert_eq!(deferred.last_ctx.get(), 42);
    }

    #[test]
    fn root_context_can_be_resolved_externally() {
        let mut drv = driver(Cadence::AnimationFrame);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 1));
        drv.bind_surface(Some(surface(1)));
        assert!(drv.binding_mut().root_mut().begin());

        let report = drv.run_frame(HostTime(0));
        assert!(matches!(report.outcome, FrameOutcome::SetupFailed(_)));
        assert_eq!(report.schedule, Schedule::NextFrame, "cadence continues");
        assert_eq!(probe.renders.get(), 0);

        assert!(drv.binding_mut().root_mut().fulfill(6));
        drv.run_frame(HostTime(16));
        assert_eq!(probe.renders.get(), 1);
        assert_eq!(probe.last_ctx.get(), 7, "renderer setup saw root 6");
    }

    #[test]
    fn before_hook_failure_aborts_frame_but_not_loop() {
        let fail = Rc::new(Cell::new(true));
        let fail_hook = Rc::clone(&fail);
        let config = RunLoopConfig::new(Cadence::AnimationFrame).with_before(Box::new(
            move |_s: &mut TestSurface, _root: &u32| {
                if fail_hook.get() {
                    Err(FrameError::new("before failed"))
                } else {
                    Ok(())
                }
            },
        ));
        let mut drv = LoopDriver::new(config);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 1));
        drv.bind_surface(Some(surface(1)));

        let report = drv.run_frame(HostTime(0));
        assert_eq!(
            report.outcome,
            FrameOutcome::Aborted(FrameError::new("before failed"))
        );
        assert_eq!(
            report.schedule,
            Schedule::NextFrame,
            "cadence keeps scheduling after an aborted frame"
        );
        assert_eq!(probe.renders.get(), 0, "dispatch skipped");

        fail.set(false);
        let report = drv.run_frame(HostTime(16));
        assert!(matches!(report.outcome, FrameOutcome::Completed { .. }));
        assert_eq!(probe.renders.get(), 1);
    }

    #[test]
    fn root_setup_failure_is_retried() {
        let fail = Rc::new(Cell::new(true));
        let fail_setup = Rc::clone(&fail);
        let calls = Rc::new(Cell::new(0));
        let calls_setup = Rc::clone(&calls);
        let config =
            RunLoopConfig::new(Cadence::AnimationFrame).with_setup(Box::new(move |_s| {
                calls_setup.set(calls_setup.get() + 1);
                if fail_setup.get() {
                    Err(FrameError::new("no root"))
                } else {
                    Ok(5_u32)
                }
            }));
        let mut drv = LoopDriver::new(config);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 1));
        drv.bind_surface(Some(surface(1)));

        let report = drv.run_frame(HostTime(0));
        assert_eq!(
            report.outcome,
            FrameOutcome::SetupFailed(FrameError::new("no root"))
        );
        assert_eq!(report.schedule, Schedule::NextFrame);
        assert_eq!(probe.renders.get(), 0);

        fail.set(false);
        drv.run_frame(HostTime(16));
        assert_eq!(calls.get(), 2, "uninitialized cell retried setup");
        assert_eq!(probe.last_ctx.get(), 6);

        drv.run_frame(HostTime(32));
        assert_eq!(calls.get(), 2, "resolved root memoized");
    }

    #[test]
    fn after_hook_failure_is_recorded() {
        let config = RunLoopConfig::new(Cadence::AnimationFrame)
            .with_after(Box::new(|_s, _root: &u32| Err(FrameError::new("after failed"))));
        let mut drv = LoopDriver::new(config);
        drv.bind_surface(Some(surface(1)));

        let report = drv.run_frame(HostTime(0));
        assert_eq!(
            report.outcome,
            FrameOutcome::Completed {
                rendered: 0,
                failed: 0,
                after_error: Some(FrameError::new("after failed")),
            }
        );
        assert_eq!(report.schedule, Schedule::NextFrame, "loop continues");
    }

    #[test]
    fn single_shot_runs_exactly_once() {
        let mut drv = driver(Cadence::SingleShot);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 1));
        drv.bind_surface(Some(surface(1)));

        let report = drv.run_frame(HostTime(0));
        assert!(matches!(report.outcome, FrameOutcome::Completed { .. }));
        assert_eq!(report.schedule, Schedule::Idle);

        let report = drv.run_frame(HostTime(16));
        assert_eq!(report, FrameReport::IDLE);
        assert_eq!(probe.renders.get(), 1);
    }

    #[test]
    fn single_shot_reenters_on_composition_change() {
        let mut drv = driver(Cadence::SingleShot);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 1));
        drv.bind_surface(Some(surface(1)));
        drv.run_frame(HostTime(0));
        assert_eq!(drv.run_frame(HostTime(16)), FrameReport::IDLE);

        drv.register(RendererId(2), 0, renderer(&probe, 2));
        let report = drv.run_frame(HostTime(32));
        assert!(matches!(report.outcome, FrameOutcome::Completed { .. }));
        assert_eq!(probe.renders.get(), 3, "both renderers ran in the re-run");
    }

    #[test]
    fn single_shot_reenters_on_surface_change() {
        let mut drv = driver(Cadence::SingleShot);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 1));
        drv.bind_surface(Some(surface(1)));
        drv.run_frame(HostTime(0));

        // Identical surface id: no re-entry.
        drv.bind_surface(Some(surface(1)));
        assert_eq!(drv.run_frame(HostTime(16)), FrameReport::IDLE);

        // New surface instance: re-entry.
        drv.bind_surface(Some(surface(2)));
        let report = drv.run_frame(HostTime(32));
        assert!(matches!(report.outcome, FrameOutcome::Completed { .. }));
    }

    #[test]
    fn single_shot_reenters_on_hook_change() {
        let mut drv = driver(Cadence::SingleShot);
        drv.bind_surface(Some(surface(1)));
        drv.run_frame(HostTime(0));
        assert_eq!(drv.run_frame(HostTime(16)), FrameReport::IDLE);

        drv.set_before(Some(Box::new(|_s, _root| Ok(()))));
        let report = drv.run_frame(HostTime(32));
        assert!(matches!(report.outcome, FrameOutcome::Completed { .. }));
    }

    #[test]
    fn fixed_delay_schedules_after_delay() {
        let mut drv = driver(Cadence::FixedDelay(Duration(100)));
        drv.bind_surface(Some(surface(1)));
        let report = drv.run_frame(HostTime(0));
        assert_eq!(report.schedule, Schedule::After(Duration(100)));
    }

    #[test]
    fn zero_delay_degrades_to_single_shot() {
        let mut drv = driver(Cadence::FixedDelay(Duration::ZERO));
        drv.bind_surface(Some(surface(1)));
        let report = drv.run_frame(HostTime(0));
        assert!(matches!(report.outcome, FrameOutcome::Completed { .. }));
        assert_eq!(report.schedule, Schedule::Idle);
        assert_eq!(drv.run_frame(HostTime(16)), FrameReport::IDLE);
    }

    #[test]
    fn custom_cadence_consults_the_host_function() {
        let mut drv = driver(Cadence::Custom(Box::new(|frame_index, _now| {
            if frame_index < 2 {
                Schedule::NextFrame
            } else {
                Schedule::Idle
            }
        })));
        drv.bind_surface(Some(surface(1)));
        assert_eq!(drv.run_frame(HostTime(0)).schedule, Schedule::NextFrame);
        assert_eq!(drv.run_frame(HostTime(16)).schedule, Schedule::Idle);
    }

    #[test]
    fn stop_is_cooperative() {
        let mut drv = driver(Cadence::AnimationFrame);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 1));
        drv.bind_surface(Some(surface(1)));
        drv.run_frame(HostTime(0));

        drv.stop();
        // The already-scheduled callback fires once more and no-ops.
        assert_eq!(drv.run_frame(HostTime(16)), FrameReport::IDLE);
        assert_eq!(probe.renders.get(), 1);

        drv.start();
        drv.run_frame(HostTime(32));
        assert_eq!(probe.renders.get(), 2);
    }

    #[test]
    fn clock_ticks_once_per_frame() {
        let mut drv = driver(Cadence::AnimationFrame);
        drv.bind_surface(Some(surface(1)));
        for i in 0..60 {
            drv.run_frame(HostTime(i * 16));
        }
        // 60 frames before the boundary tick at 1000 ms.
        drv.run_frame(HostTime(1000));
        let stats = drv.stats();
        assert_eq!(stats.fps.last(), Some(&60));
        assert_eq!(stats.max, 60);
    }

    #[test]
    fn unbinding_surface_suspends() {
        let mut drv = driver(Cadence::AnimationFrame);
        let probe = Rc::new(Probe::default());
        drv.register(RendererId(1), 0, renderer(&probe, 1));
        drv.bind_surface(Some(surface(1)));
        drv.run_frame(HostTime(0));

        drv.bind_surface(None);
        assert_eq!(drv.run_frame(HostTime(16)), FrameReport::IDLE);
        assert_eq!(probe.renders.get(), 1);
    }
}

// Copyright 2026 the Repaint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered registry of per-frame drawing callbacks.
//!
//! A [`Renderer`] is the seam hosts implement to draw: an optional fallible
//! `setup` that produces the renderer's context from the root context (run
//! at most once per registered instance, memoized in a [`ContextCell`]), and
//! a mandatory `render` invoked every frame.
//!
//! [`RendererRegistry`] keeps renderers stably sorted by descending
//! priority; ties preserve insertion order. Identity is the [`RendererId`]
//! supplied at registration: registering a present id and unregistering an
//! absent one are both no-ops. The registry's composition generation feeds
//! the loop driver's single-shot re-entry check.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::clock::StatSnapshot;
use crate::error::FrameError;
use crate::memo::ContextCell;
use crate::time::HostTime;

/// Identifies a registered renderer.
///
/// Two renderers are "the same" iff their ids are equal; replacing a
/// renderer under a fresh id discards its memoized context.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RendererId(pub u32);

impl fmt::Debug for RendererId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RendererId({})", self.0)
    }
}

/// Which phase of a renderer's frame failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RendererPhase {
    /// One-time context setup.
    Setup,
    /// Per-frame render.
    Render,
}

/// Per-frame data passed to every [`Renderer::render`] call.
#[derive(Debug)]
pub struct FrameInfo<'a> {
    /// Monotonically increasing frame counter.
    pub frame_index: u64,
    /// Host-supplied timestamp for this frame.
    pub now: HostTime,
    /// Statistics as of the previously completed frame.
    pub stats: &'a StatSnapshot,
}

/// A per-frame drawing callback with identity and priority.
///
/// `S` is the concrete surface type, `C` the context type shared by the
/// root setup hook and all renderers.
pub trait Renderer<S, C: Clone> {
    /// One-time context setup, run on this renderer's first frame and
    /// memoized until the renderer is replaced.
    ///
    /// The default implementation passes the parent (root) context through
    /// unchanged.
    ///
    /// # Errors
    ///
    /// A failed setup is reported for the frame and retried on the next one.
    fn setup(&mut self, surface: &mut S, parent: &C) -> Result<C, FrameError> {
        let _ = surface;
        Ok(parent.clone())
    }

    /// Draws one frame with the memoized context.
    ///
    /// Renderers run sequentially in priority order; later renderers observe
    /// the side effects of earlier ones on the shared surface.
    ///
    /// # Errors
    ///
    /// A failed render is reported for the frame; remaining renderers still
    /// run.
    fn render(&mut self, surface: &mut S, ctx: &C, frame: &FrameInfo<'_>) -> Result<(), FrameError>;
}

/// One registered renderer plus its memoized context.
pub(crate) struct Slot<S, C> {
    id: RendererId,
    priority: i32,
    renderer: Box<dyn Renderer<S, C>>,
    cell: ContextCell<C>,
}

impl<S, C: Clone> Slot<S, C> {
    /// Resolves the memoized context (running setup if needed) and renders.
    pub(crate) fn run(
        &mut self,
        surface: &mut S,
        root: &C,
        frame: &FrameInfo<'_>,
    ) -> Result<(), (RendererPhase, FrameError)> {
        let renderer = &mut self.renderer;
        let ctx = self
            .cell
            .get_or_init(|| renderer.setup(surface, root))
            .map_err(|err| (RendererPhase::Setup, err))?;
        self.renderer
            .render(surface, ctx, frame)
            .map_err(|err| (RendererPhase::Render, err))
    }
}

/// Ordered collection of registered frame callbacks.
pub struct RendererRegistry<S, C> {
    slots: Vec<Slot<S, C>>,
    generation: u64,
}

impl<S, C> Default for RendererRegistry<S, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C> fmt::Debug for RendererRegistry<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("len", &self.slots.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl<S, C> RendererRegistry<S, C> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generation: 0,
        }
    }

    /// Adds a renderer under `id` with the given priority.
    ///
    /// Priority is captured here; it cannot be changed without replacing the
    /// renderer. Returns `false` (a no-op) if `id` is already registered.
    pub fn register(
        &mut self,
        id: RendererId,
        priority: i32,
        renderer: Box<dyn Renderer<S, C>>,
    ) -> bool {
        if self.contains(id) {
            return false;
        }
        self.slots.push(Slot {
            id,
            priority,
            renderer,
            cell: ContextCell::Uninitialized,
        });
        // Stable sort: equal priorities keep insertion order.
        self.slots.sort_by_key(|slot| core::cmp::Reverse(slot.priority));
        self.generation += 1;
        true
    }

    /// Removes the renderer registered under `id`, discarding its memoized
    /// context. Returns `false` (a no-op) if `id` is not present.
    pub fn unregister(&mut self, id: RendererId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.id != id);
        if self.slots.len() == before {
            return false;
        }
        self.generation += 1;
        true
    }

    /// Returns the ids in current dispatch order.
    ///
    /// The loop driver takes this snapshot when dispatch begins; renderers
    /// registered or unregistered mid-frame take effect the next frame.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RendererId> {
        self.slots.iter().map(|slot| slot.id).collect()
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: RendererId) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    /// Number of registered renderers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Incremented on every effective composition change (add or remove,
    /// never reorder).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the context cell for `id`, for hosts driving setup
    /// externally.
    pub fn cell_mut(&mut self, id: RendererId) -> Option<&mut ContextCell<C>> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id)
            .map(|slot| &mut slot.cell)
    }

    pub(crate) fn slot_mut(&mut self, id: RendererId) -> Option<&mut Slot<S, C>> {
        self.slots.iter_mut().find(|slot| slot.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    struct Noop;

    impl Renderer<(), u32> for Noop {
        fn render(
            &mut self,
            _surface: &mut (),
            _ctx: &u32,
            _frame: &FrameInfo<'_>,
        ) -> Result<(), FrameError> {
            Ok(())
        }
    }

    fn registry() -> RendererRegistry<(), u32> {
        RendererRegistry::new()
    }

    #[test]
    fn register_is_idempotent() {
        let mut reg = registry();
        assert!(reg.register(RendererId(1), 0, Box::new(Noop)));
        assert!(!reg.register(RendererId(1), 10, Box::new(Noop)));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.generation(), 1, "no-op register leaves generation");
    }

    #[test]
    fn order_is_descending_priority_stable_on_ties() {
        let mut reg = registry();
        reg.register(RendererId(1), 0, Box::new(Noop));
        reg.register(RendererId(2), 10, Box::new(Noop));
        reg.register(RendererId(3), 0, Box::new(Noop));
        reg.register(RendererId(4), -5, Box::new(Noop));
        reg.register(RendererId(5), 10, Box::new(Noop));

        assert_eq!(
            reg.snapshot(),
            vec![
                RendererId(2),
                RendererId(5),
                RendererId(1),
                RendererId(3),
                RendererId(4),
            ]
        );
    }

    #[test]
    fn unregister_absent_is_a_noop() {
        let mut reg = registry();
        reg.register(RendererId(1), 0, Box::new(Noop));
        let generation = reg.generation();
        assert!(!reg.unregister(RendererId(9)));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.generation(), generation);
    }

    #[test]
    fn unregister_preserves_remaining_order() {
        let mut reg = registry();
        reg.register(RendererId(1), 3, Box::new(Noop));
        reg.register(RendererId(2), 2, Box::new(Noop));
        reg.register(RendererId(3), 1, Box::new(Noop));
        assert!(reg.unregister(RendererId(2)));
        assert_eq!(reg.snapshot(), vec![RendererId(1), RendererId(3)]);
    }

    #[test]
    fn composition_changes_bump_generation() {
        let mut reg = registry();
        reg.register(RendererId(1), 0, Box::new(Noop));
        reg.register(RendererId(2), 0, Box::new(Noop));
        assert_eq!(reg.generation(), 2);
        reg.unregister(RendererId(1));
        assert_eq!(reg.generation(), 3);
    }
}

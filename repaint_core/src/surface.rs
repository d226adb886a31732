// Copyright 2026 the Repaint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing-surface handle and binding.
//!
//! The core never allocates or destroys a drawing surface; the host UI tree
//! owns it and replaces it wholesale on change. [`Surface`] is the minimal
//! contract the loop needs — an identity plus dimensions. Whatever 2D/3D
//! drawing context the concrete surface exposes stays on the host's side of
//! the trait: renderers receive `&mut S` and downcast to the inherent API
//! they were written against.
//!
//! [`SurfaceBinding`] associates the currently bound surface with the root
//! [`ContextCell`]. Binding a different surface invalidates the root cell so
//! the next frame runs root setup afresh; re-binding the identical surface
//! is a no-op; binding `None` suspends the loop driver.

use core::fmt;

use crate::memo::ContextCell;

/// Identifies a specific drawing surface instance.
///
/// Hosts assign surface IDs; the core only compares them to detect
/// replacement. A host that re-creates its surface object must assign a new
/// ID for the binding to notice.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SurfaceId(pub u32);

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({})", self.0)
    }
}

/// A live drawing-target handle.
pub trait Surface {
    /// Stable identity of this surface instance.
    fn id(&self) -> SurfaceId;

    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;
}

/// The loop driver's non-owning association with the active surface.
///
/// Owns the root context cell: the root context is produced at most once per
/// bound surface instance.
#[derive(Debug)]
pub struct SurfaceBinding<S, C> {
    surface: Option<S>,
    root: ContextCell<C>,
    generation: u64,
}

impl<S: Surface, C> SurfaceBinding<S, C> {
    /// Creates an empty (suspended) binding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            surface: None,
            root: ContextCell::Uninitialized,
            generation: 0,
        }
    }

    /// Replaces the bound surface.
    ///
    /// Binding a surface whose [`SurfaceId`] matches the current one is a
    /// no-op (the root context survives), as is clearing an already-empty
    /// binding. Any effective change invalidates the root context cell and
    /// bumps the binding generation.
    pub fn bind(&mut self, surface: Option<S>) {
        let current = self.surface.as_ref().map(Surface::id);
        let next = surface.as_ref().map(Surface::id);
        if current == next {
            return;
        }
        self.surface = surface;
        self.root.invalidate();
        self.generation += 1;
    }

    /// Returns the bound surface, if any.
    #[must_use]
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Splits the binding into the bound surface and the root context cell.
    ///
    /// Returns `None` while no surface is bound.
    pub(crate) fn parts_mut(&mut self) -> Option<(&mut S, &mut ContextCell<C>)> {
        match self.surface.as_mut() {
            Some(surface) => Some((surface, &mut self.root)),
            None => None,
        }
    }

    /// Returns the root context cell.
    #[must_use]
    pub fn root(&self) -> &ContextCell<C> {
        &self.root
    }

    /// Returns the root context cell for external (asynchronous) setup.
    pub fn root_mut(&mut self) -> &mut ContextCell<C> {
        &mut self.root
    }

    /// Incremented on every effective surface replacement.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

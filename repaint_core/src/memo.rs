// Copyright 2026 the Repaint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-time context setup memoization.
//!
//! [`ContextCell`] is the owned slot that caches the result of a renderer's
//! (or the surface binding's) setup hook. It is an explicit tagged state
//! machine:
//!
//! ```text
//! Uninitialized ──begin/get_or_init──▶ Pending ──fulfill──▶ Resolved(value)
//!       ▲                                 │
//!       └────────────reject──────────────┘
//! ```
//!
//! Once resolved, the value is reused for every subsequent frame without
//! re-running setup, until the cell is invalidated or its owning slot is
//! replaced. A failed setup returns the cell to `Uninitialized`, so the next
//! frame retries.
//!
//! Hosts that run setup synchronously use [`get_or_init`]; hosts that issue
//! setup to an external executor inspect the state synchronously first via
//! [`begin`] and later call [`fulfill`] or [`reject`].
//!
//! [`get_or_init`]: ContextCell::get_or_init
//! [`begin`]: ContextCell::begin
//! [`fulfill`]: ContextCell::fulfill
//! [`reject`]: ContextCell::reject

use crate::error::FrameError;

/// A memoized setup result for one renderer (or the root context).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ContextCell<C> {
    /// Setup has not run (or its last attempt failed).
    #[default]
    Uninitialized,
    /// Setup was issued to an external host and has not completed.
    Pending,
    /// Setup completed; the value is reused for all future frames.
    Resolved(C),
}

impl<C> ContextCell<C> {
    /// Returns the resolved value, running `init` first if the cell is
    /// uninitialized.
    ///
    /// # Errors
    ///
    /// Propagates the error from `init` (leaving the cell uninitialized so a
    /// later call retries), or reports an in-flight externally-issued setup.
    pub fn get_or_init(
        &mut self,
        init: impl FnOnce() -> Result<C, FrameError>,
    ) -> Result<&C, FrameError> {
        if matches!(self, Self::Uninitialized) {
            *self = Self::Pending;
            match init() {
                Ok(value) => *self = Self::Resolved(value),
                Err(err) => {
                    *self = Self::Uninitialized;
                    return Err(err);
                }
            }
        }
        match self {
            Self::Resolved(value) => Ok(value),
            Self::Pending | Self::Uninitialized => Err(FrameError::setup_in_flight()),
        }
    }

    /// Transitions `Uninitialized → Pending`.
    ///
    /// Returns `true` if the caller should now issue the setup work; `false`
    /// if setup is already pending or resolved.
    pub fn begin(&mut self) -> bool {
        if matches!(self, Self::Uninitialized) {
            *self = Self::Pending;
            true
        } else {
            false
        }
    }

    /// Completes a pending setup with `value`.
    ///
    /// Returns `false` (and discards `value`) if the cell was not pending —
    /// a stale completion after the cell was invalidated.
    pub fn fulfill(&mut self, value: C) -> bool {
        if matches!(self, Self::Pending) {
            *self = Self::Resolved(value);
            true
        } else {
            false
        }
    }

    /// Fails a pending setup, returning the cell to `Uninitialized`.
    pub fn reject(&mut self) {
        if matches!(self, Self::Pending) {
            *self = Self::Uninitialized;
        }
    }

    /// Discards any resolved or pending state.
    ///
    /// The next frame re-runs setup from scratch. A completion for a setup
    /// issued before the invalidation will be ignored by [`fulfill`].
    ///
    /// [`fulfill`]: Self::fulfill
    pub fn invalidate(&mut self) {
        *self = Self::Uninitialized;
    }

    /// Returns the resolved value, if any.
    #[must_use]
    pub fn get(&self) -> Option<&C> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Uninitialized | Self::Pending => None,
        }
    }

    /// Whether the cell holds a resolved value.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

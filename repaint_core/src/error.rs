// Copyright 2026 the Repaint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-scoped error type.
//!
//! Every fallible seam in the loop — root setup, the before/after hooks, a
//! renderer's setup or render — reports failure as a [`FrameError`]. Nothing
//! in this crate treats a `FrameError` as fatal: failures are scoped to a
//! frame or to a single renderer and the cadence keeps scheduling.

use alloc::borrow::Cow;
use core::fmt;

/// An error raised by a setup hook, a lifecycle hook, or a renderer.
///
/// Carries only a message; callers that need structured error data should
/// keep it on their side of the [`Renderer`](crate::registry::Renderer) seam
/// and report a summary here.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameError {
    message: Cow<'static, str>,
}

impl FrameError {
    /// Creates an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Error returned when a context cell is awaiting an externally-issued
    /// setup and cannot resolve synchronously.
    #[must_use]
    pub(crate) fn setup_in_flight() -> Self {
        Self::new("context setup still in flight")
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameError({:?})", self.message)
    }
}

impl From<&'static str> for FrameError {
    fn from(message: &'static str) -> Self {
        Self::new(message)
    }
}

impl From<alloc::string::String> for FrameError {
    fn from(message: alloc::string::String) -> Self {
        Self::new(message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn message_round_trip() {
        let err = FrameError::new("texture upload failed");
        assert_eq!(err.message(), "texture upload failed");
        assert_eq!(format!("{err}"), "texture upload failed");
    }

    #[test]
    fn from_string_and_str() {
        let a: FrameError = "boom".into();
        let b: FrameError = String::from("boom").into();
        assert_eq!(a, b);
    }
}

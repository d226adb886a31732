// Copyright 2026 the Repaint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-statistics overlay widget.
//!
//! [`StatOverlay`] is a [`Renderer`] that draws the loop's FPS statistics on
//! top of whatever the other renderers produced: a bar chart of the FPS
//! history (one bar per 1-second sample) and a current/max label. Drawing
//! goes through the [`OverlayTarget`] seam so the widget works against any
//! surface that can fill rectangles and place text; the layout math lives
//! here, the pixels on the host's side.
//!
//! Register it at [`OVERLAY_PRIORITY`] so it dispatches after every
//! ordinary renderer.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use repaint_core::clock::StatSnapshot;
use repaint_core::error::FrameError;
use repaint_core::registry::{FrameInfo, Renderer};
use repaint_core::surface::Surface;

/// Registration priority that places the overlay after all ordinary
/// renderers, so it draws on top of their output.
pub const OVERLAY_PRIORITY: i32 = i32::MIN;

/// Drawing operations the overlay needs from a surface.
///
/// Coordinates are pixels in the surface's own space; the overlay computes
/// layout from [`Surface::width`] and [`Surface::height`].
pub trait OverlayTarget {
    /// Fills an axis-aligned rectangle.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Draws a single-line text label with its top-left corner at (x, y).
    fn draw_label(&mut self, text: &str, x: f64, y: f64);
}

/// Formats the "current / max" FPS label.
///
/// The current value is the most recent completed sample, not the count of
/// the still-open window.
#[must_use]
pub fn fps_label(stats: &StatSnapshot) -> String {
    let current = stats.fps.last().copied().unwrap_or(0);
    format!("{current} fps (max {max})", max = stats.max)
}

/// Normalizes the FPS history into bar heights in `[0, 1]`.
///
/// Bars are scaled against the all-time maximum so the chart's proportions
/// stay stable as samples scroll through. An all-zero history yields
/// all-zero heights.
#[must_use]
pub fn bar_heights(stats: &StatSnapshot) -> Vec<f32> {
    if stats.max == 0 {
        return alloc::vec![0.0; stats.fps.len()];
    }
    let max = stats.max as f32;
    stats
        .fps
        .iter()
        .map(|&sample| sample as f32 / max)
        .collect()
}

/// Renders the FPS history as a one-character-per-sample ASCII strip, for
/// text-mode hosts and test output.
#[must_use]
pub fn sparkline_ascii(stats: &StatSnapshot) -> String {
    const LEVELS: &[u8] = b" .:-=+*#%@";
    let mut out = String::with_capacity(stats.fps.len());
    for height in bar_heights(stats) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "height is in [0, 1], so the index is within the level ramp"
        )]
        let level = (f64::from(height) * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
        out.push(LEVELS[level] as char);
    }
    out
}

/// Layout parameters for [`StatOverlay`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayLayout {
    /// Chart width as a fraction of the surface width.
    pub width_frac: f64,
    /// Chart height in pixels.
    pub chart_height: f64,
    /// Margin from the surface's top-left corner, in pixels.
    pub margin: f64,
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self {
            width_frac: 0.25,
            chart_height: 48.0,
            margin: 8.0,
        }
    }
}

/// Renderer that draws the loop's FPS statistics over the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatOverlay {
    layout: OverlayLayout,
}

impl StatOverlay {
    /// Creates an overlay with the default layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an overlay with an explicit layout.
    #[must_use]
    pub fn with_layout(layout: OverlayLayout) -> Self {
        Self { layout }
    }
}

impl<S, C> Renderer<S, C> for StatOverlay
where
    S: Surface + OverlayTarget,
    C: Clone,
{
    fn render(
        &mut self,
        surface: &mut S,
        _ctx: &C,
        frame: &FrameInfo<'_>,
    ) -> Result<(), FrameError> {
        let stats = frame.stats;
        let heights = bar_heights(stats);
        if heights.is_empty() {
            return Ok(());
        }

        let layout = self.layout;
        let chart_width = f64::from(surface.width()) * layout.width_frac;
        let bar_width = chart_width / heights.len() as f64;
        let base_y = layout.margin + layout.chart_height;

        for (i, height) in heights.iter().enumerate() {
            let bar_height = f64::from(*height) * layout.chart_height;
            if bar_height <= 0.0 {
                continue;
            }
            surface.fill_rect(
                layout.margin + i as f64 * bar_width,
                base_y - bar_height,
                bar_width,
                bar_height,
            );
        }
        surface.draw_label(&fps_label(stats), layout.margin, base_y + layout.margin);
        Ok(())
    }
}

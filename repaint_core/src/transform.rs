// Copyright 2026 the Repaint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rect-to-rect fitting transforms.
//!
//! [`fit_rect`] computes the 4×4 transform that maps drawing done against a
//! source rectangle onto a destination rectangle, in the coordinate
//! convention of the target drawing context ([`Projection`]). Renderers use
//! it to draw in a virtual resolution independent of the actual surface
//! size.
//!
//! [`Transform3d`] is the minimal column-major matrix this needs — identity,
//! scale, translation, multiply — without pulling in a full linear-algebra
//! crate.

use core::ops::Mul;

use kurbo::Rect;

/// Coordinate convention of the drawing context a transform targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Projection {
    /// Pixel space: origin top-left, y grows downward, units are pixels.
    TwoD,
    /// GL clip space: origin at center, axes span [-1, 1], y grows upward.
    WebGl,
    /// Same clip-space convention as [`WebGl`](Self::WebGl).
    WebGl2,
}

impl Projection {
    /// Whether this projection uses normalized y-up clip space.
    #[must_use]
    pub const fn is_clip_space(self) -> bool {
        matches!(self, Self::WebGl | Self::WebGl2)
    }
}

/// A column-major 4×4 affine transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, matching the memory
/// layout GPU APIs consume directly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from a column-major 2-D array.
    #[inline]
    #[must_use]
    pub const fn from_cols_array_2d(cols: [[f64; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Returns the columns as a 2-D array.
    #[inline]
    #[must_use]
    pub const fn to_cols_array_2d(self) -> [[f64; 4]; 4] {
        self.cols
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        let c = &self.cols;
        c[0][0].is_finite()
            && c[0][1].is_finite()
            && c[0][2].is_finite()
            && c[0][3].is_finite()
            && c[1][0].is_finite()
            && c[1][1].is_finite()
            && c[1][2].is_finite()
            && c[1][3].is_finite()
            && c[2][0].is_finite()
            && c[2][1].is_finite()
            && c[2][2].is_finite()
            && c[2][3].is_finite()
            && c[3][0].is_finite()
            && c[3][1].is_finite()
            && c[3][2].is_finite()
            && c[3][3].is_finite()
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}

/// Computes the transform mapping drawing in `from` coordinates onto `to`.
///
/// Scale is `to`'s size over `from`'s size per axis; translation carries the
/// center of `from` onto the center of `to`. In [`Projection::TwoD`] the
/// translation is in pixels. In the clip-space projections the same center
/// delta spans a [-1, 1] axis instead of a [0, size] one, so it doubles, and
/// y inverts because clip space grows upward.
#[must_use]
pub fn fit_rect(from: Rect, to: Rect, projection: Projection) -> Transform3d {
    let sx = to.width() / from.width();
    let sy = to.height() / from.height();
    let dx = to.center().x - from.center().x;
    let dy = to.center().y - from.center().y;
    let (tx, ty) = if projection.is_clip_space() {
        (2.0 * dx, -2.0 * dy)
    } else {
        (dx, dy)
    };
    Transform3d::from_translation(tx, ty, 0.0) * Transform3d::from_scale(sx, sy, 1.0)
}

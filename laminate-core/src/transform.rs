// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 4×4 transform.
//!
//! This type covers the subset of 3-D affine transforms that the aggregator
//! actually needs (identity, multiply, point and rect mapping, 2-D
//! axis-alignment classification) without pulling in a full linear-algebra
//! crate. Transform equality means exact equality of the column arrays after
//! composition, not geometric equivalence.

use core::ops::Mul;

use kurbo::{Point, Rect};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A column-major 4×4 affine transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, matching the memory layout
/// used by GPU APIs.
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

    /// Creates a pure 2-D translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, 0.0, 1.0],
            ],
        }
    }

    /// Creates a non-uniform 2-D scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        #[cfg(feature = "std")]
        let (s, c) = radians.sin_cos();
        #[cfg(not(feature = "std"))]
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Maps a 2-D point through this transform, performing the perspective
    /// divide when the resulting `w` is non-zero.
    #[must_use]
    pub fn transform_point(&self, p: Point) -> Point {
        let c = &self.cols;
        let x = c[0][0] * p.x + c[1][0] * p.y + c[3][0];
        let y = c[0][1] * p.x + c[1][1] * p.y + c[3][1];
        let w = c[0][3] * p.x + c[1][3] * p.y + c[3][3];
        if w != 0.0 && w != 1.0 {
            Point::new(x / w, y / w)
        } else {
            Point::new(x, y)
        }
    }

    /// Maps an axis-aligned rect through this transform and returns the
    /// bounding box of the result.
    #[must_use]
    pub fn map_rect(&self, rect: Rect) -> Rect {
        let corners = [
            self.transform_point(Point::new(rect.x0, rect.y0)),
            self.transform_point(Point::new(rect.x1, rect.y0)),
            self.transform_point(Point::new(rect.x0, rect.y1)),
            self.transform_point(Point::new(rect.x1, rect.y1)),
        ];
        let mut x0 = corners[0].x;
        let mut y0 = corners[0].y;
        let mut x1 = corners[0].x;
        let mut y1 = corners[0].y;
        for p in &corners[1..] {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Rect::new(x0, y0, x1, y1)
    }

    /// Returns whether this transform maps axis-aligned rects to axis-aligned
    /// rects in 2-D (translations, scales, and 90° rotations qualify).
    ///
    /// Tolerates rounding residue near zero, so computed quarter turns
    /// classify the same way as exact ones.
    #[must_use]
    pub fn preserves_2d_axis_alignment(&self) -> bool {
        const EPSILON: f64 = 1e-9;
        let near_zero = |v: f64| v > -EPSILON && v < EPSILON;
        let c = &self.cols;
        let no_perspective = near_zero(c[0][3])
            && near_zero(c[1][3])
            && near_zero(c[2][3])
            && near_zero(c[3][3] - 1.0);
        let diagonal = near_zero(c[0][1]) && near_zero(c[1][0]);
        let anti_diagonal = near_zero(c[0][0]) && near_zero(c[1][1]);
        no_perspective && (diagonal || anti_diagonal)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_multiply() {
        let t = Transform3d::from_translation(3.0, 4.0);
        assert_eq!(Transform3d::IDENTITY * t, t);
        assert_eq!(t * Transform3d::IDENTITY, t);
    }

    #[test]
    fn translations_compose() {
        let a = Transform3d::from_translation(1.0, 0.0);
        let b = Transform3d::from_translation(0.0, 2.0);
        let c = a * b;
        assert_eq!(c.col(3), [1.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn scale_then_translate() {
        let s = Transform3d::from_scale(2.0, 2.0);
        let t = Transform3d::from_translation(3.0, 4.0);
        // Scale first, then translate: T * S.
        let combined = t * s;
        assert_eq!(combined.col(0), [2.0, 0.0, 0.0, 0.0]);
        assert_eq!(combined.col(3), [3.0, 4.0, 0.0, 1.0]);
    }

    #[test]
    fn point_mapping() {
        let t = Transform3d::from_translation(0.0, 10.0) * Transform3d::from_scale(2.0, 3.0);
        let p = t.transform_point(Point::new(1.0, 1.0));
        assert_eq!(p, Point::new(2.0, 13.0));
    }

    #[test]
    fn rect_mapping_translates() {
        let t = Transform3d::from_translation(0.0, 10.0);
        let r = t.map_rect(Rect::new(10.0, 10.0, 20.0, 20.0));
        assert_eq!(r, Rect::new(10.0, 20.0, 20.0, 30.0));
    }

    #[test]
    fn rect_mapping_rotation_takes_bounding_box() {
        let t = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_2);
        let r = t.map_rect(Rect::new(0.0, 0.0, 10.0, 20.0));
        let eps = 1e-9;
        assert!((r.x0 - -20.0).abs() < eps);
        assert!((r.y0 - 0.0).abs() < eps);
        assert!((r.x1 - 0.0).abs() < eps);
        assert!((r.y1 - 10.0).abs() < eps);
    }

    #[test]
    fn axis_alignment_classification() {
        assert!(Transform3d::IDENTITY.preserves_2d_axis_alignment());
        assert!(Transform3d::from_translation(5.0, -3.0).preserves_2d_axis_alignment());
        assert!(Transform3d::from_scale(2.0, 3.0).preserves_2d_axis_alignment());

        // Quarter turns qualify whether built from literals or from trig,
        // which leaves ~1e-17 residue on the diagonal.
        let quarter_turn = Transform3d::from_cols_array_2d([
            [0.0, 1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert!(quarter_turn.preserves_2d_axis_alignment());
        let computed = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_2);
        assert!(computed.preserves_2d_axis_alignment());

        let eighth_turn = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_4);
        assert!(!eighth_turn.preserves_2d_axis_alignment());
    }
}

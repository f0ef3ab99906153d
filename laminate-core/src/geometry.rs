// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Empty-aware rectangle algebra.
//!
//! Damage accumulation treats `Rect::ZERO` (and any zero-area rect) as "no
//! damage", which [`kurbo::Rect::union`] does not understand: the union of an
//! empty rect at the origin with a distant rect would otherwise stretch back
//! to the origin. These helpers skip empty operands.

use kurbo::Rect;

/// Returns whether `rect` covers no pixels.
#[inline]
#[must_use]
pub fn is_empty(rect: Rect) -> bool {
    rect.width() <= 0.0 || rect.height() <= 0.0
}

/// Union of two rects, ignoring empty operands.
#[must_use]
pub fn union(a: Rect, b: Rect) -> Rect {
    if is_empty(a) {
        b
    } else if is_empty(b) {
        a
    } else {
        a.union(b)
    }
}

/// Intersection of two optional clips, where `None` means "unclipped".
///
/// The result may be a zero-area rect when the clips do not overlap; callers
/// treat that as "fully clipped out".
#[must_use]
pub fn intersect_clips(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    match (a, b) {
        (None, None) => None,
        (Some(r), None) | (None, Some(r)) => Some(r),
        (Some(a), Some(b)) => Some(a.intersect(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_detection() {
        assert!(is_empty(Rect::ZERO));
        assert!(is_empty(Rect::new(10.0, 10.0, 10.0, 30.0)));
        assert!(!is_empty(Rect::new(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn union_skips_empty_operands() {
        let r = Rect::new(50.0, 50.0, 60.0, 60.0);
        assert_eq!(union(Rect::ZERO, r), r);
        assert_eq!(union(r, Rect::ZERO), r);
        assert_eq!(
            union(r, Rect::new(0.0, 0.0, 10.0, 10.0)),
            Rect::new(0.0, 0.0, 60.0, 60.0)
        );
    }

    #[test]
    fn clip_intersection() {
        assert_eq!(intersect_clips(None, None), None);
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(intersect_clips(Some(r), None), Some(r));
        assert_eq!(intersect_clips(None, Some(r)), Some(r));
        assert_eq!(
            intersect_clips(Some(r), Some(Rect::new(5.0, 5.0, 20.0, 20.0))),
            Some(Rect::new(5.0, 5.0, 10.0, 10.0))
        );
    }
}

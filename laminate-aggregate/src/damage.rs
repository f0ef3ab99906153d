// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage accumulation across aggregations.
//!
//! The tracker remembers, per surface, which frame index was aggregated last
//! and where that surface landed in root-target space. Each aggregation then
//! contributes per-surface damage in root space:
//!
//! - a surface seen for the first time damages its full output rect,
//! - a resubmitted frame damages its declared damage rect,
//! - an unchanged frame damages nothing,
//! - a surface that disappeared damages the bounds it previously covered.
//!
//! Pixel-moving filters and explicit full-damage requests widen a surface's
//! contribution to its full output rect, since filtered output can change
//! outside the declared damage.

use hashbrown::{HashMap, HashSet};
use kurbo::Rect;
use laminate_core::geometry;
use laminate_core::surface::SurfaceId;
use laminate_core::transform::Transform3d;

#[derive(Clone, Copy, Debug)]
struct SurfaceState {
    frame_index: u64,
    bounds_in_root: Rect,
}

/// Per-surface damage bookkeeping, owned by the aggregator.
#[derive(Debug, Default)]
pub(crate) struct DamageTracker {
    /// State captured by the previous aggregation.
    previous: HashMap<SurfaceId, SurfaceState>,
    /// State being captured by the aggregation in flight.
    pending: HashMap<SurfaceId, SurfaceState>,
    /// Surfaces whose next contribution is forced to full damage.
    forced_full: HashSet<SurfaceId>,
    accumulated: Rect,
}

impl DamageTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin(&mut self) {
        self.pending.clear();
        self.accumulated = Rect::ZERO;
    }

    /// Marks `id` fully damaged the next time it is aggregated.
    pub(crate) fn force_full_damage(&mut self, id: SurfaceId) {
        self.forced_full.insert(id);
    }

    /// Records one surface's part in the aggregation in flight and folds its
    /// damage into the accumulated root-space total. Returns the damage in
    /// the surface's own root-target space, for draw notifications.
    ///
    /// `to_root` maps the surface's root target space into the aggregated
    /// root target space. Undrawn surfaces (`drawn == false`) are tracked so
    /// they are not reported as disappeared, but contribute no damage.
    #[expect(clippy::too_many_arguments, reason = "one call site, in the prewalk")]
    pub(crate) fn contribute(
        &mut self,
        id: SurfaceId,
        frame_index: u64,
        damage_rect: Rect,
        output_rect: Rect,
        to_root: Transform3d,
        forces_full: bool,
        drawn: bool,
    ) -> Rect {
        let forced = drawn && self.forced_full.remove(&id);
        let local = if !drawn {
            Rect::ZERO
        } else if forced || forces_full {
            output_rect
        } else {
            match self.previous.get(&id) {
                None => output_rect,
                Some(prev) if prev.frame_index != frame_index => damage_rect,
                Some(_) => Rect::ZERO,
            }
        };
        let bounds_in_root = if drawn {
            to_root.map_rect(output_rect)
        } else {
            Rect::ZERO
        };
        self.pending.insert(
            id,
            SurfaceState {
                frame_index,
                bounds_in_root,
            },
        );
        if !geometry::is_empty(local) {
            self.accumulated = geometry::union(self.accumulated, to_root.map_rect(local));
        }
        local
    }

    /// Folds in disappearance damage for surfaces present last time but not
    /// this time, commits the in-flight state, and returns the total damage
    /// in root-target space.
    pub(crate) fn finish(&mut self) -> Rect {
        for (id, state) in &self.previous {
            if !self.pending.contains_key(id) {
                self.accumulated = geometry::union(self.accumulated, state.bounds_in_root);
            }
        }
        core::mem::swap(&mut self.previous, &mut self.pending);
        self.accumulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laminate_core::surface::{FrameSinkId, LocalFrameId};

    fn surface(n: u32) -> SurfaceId {
        SurfaceId::new(FrameSinkId::new(n, 1), LocalFrameId::new(1, 1))
    }

    const OUTPUT: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

    #[test]
    fn first_sight_damages_full_output() {
        let mut tracker = DamageTracker::new();
        tracker.begin();
        let local = tracker.contribute(
            surface(1),
            1,
            Rect::new(5.0, 5.0, 6.0, 6.0),
            OUTPUT,
            Transform3d::IDENTITY,
            false,
            true,
        );
        assert_eq!(local, OUTPUT);
        assert_eq!(tracker.finish(), OUTPUT);
    }

    #[test]
    fn unchanged_frame_damages_nothing() {
        let mut tracker = DamageTracker::new();
        tracker.begin();
        tracker.contribute(
            surface(1),
            1,
            OUTPUT,
            OUTPUT,
            Transform3d::IDENTITY,
            false,
            true,
        );
        tracker.finish();

        tracker.begin();
        let local = tracker.contribute(
            surface(1),
            1,
            OUTPUT,
            OUTPUT,
            Transform3d::IDENTITY,
            false,
            true,
        );
        assert!(geometry::is_empty(local));
        assert!(geometry::is_empty(tracker.finish()));
    }

    #[test]
    fn resubmission_damage_is_mapped_by_the_embed_transform() {
        let mut tracker = DamageTracker::new();
        tracker.begin();
        tracker.contribute(
            surface(1),
            1,
            OUTPUT,
            OUTPUT,
            Transform3d::from_translation(0.0, 10.0),
            false,
            true,
        );
        tracker.finish();

        tracker.begin();
        let local = tracker.contribute(
            surface(1),
            2,
            Rect::new(10.0, 10.0, 20.0, 20.0),
            OUTPUT,
            Transform3d::from_translation(0.0, 10.0),
            false,
            true,
        );
        assert_eq!(local, Rect::new(10.0, 10.0, 20.0, 20.0));
        assert_eq!(tracker.finish(), Rect::new(10.0, 20.0, 20.0, 30.0));
    }

    #[test]
    fn disappearance_damages_previous_bounds() {
        let mut tracker = DamageTracker::new();
        tracker.begin();
        tracker.contribute(
            surface(1),
            1,
            OUTPUT,
            Rect::new(0.0, 0.0, 30.0, 30.0),
            Transform3d::from_translation(50.0, 0.0),
            false,
            true,
        );
        tracker.finish();

        tracker.begin();
        assert_eq!(tracker.finish(), Rect::new(50.0, 0.0, 80.0, 30.0));
    }

    #[test]
    fn forced_full_damage_is_consumed_once() {
        let mut tracker = DamageTracker::new();
        tracker.begin();
        tracker.contribute(
            surface(1),
            1,
            OUTPUT,
            OUTPUT,
            Transform3d::IDENTITY,
            false,
            true,
        );
        tracker.finish();

        tracker.force_full_damage(surface(1));
        tracker.begin();
        let local = tracker.contribute(
            surface(1),
            1,
            OUTPUT,
            OUTPUT,
            Transform3d::IDENTITY,
            false,
            true,
        );
        assert_eq!(local, OUTPUT);
        tracker.finish();

        tracker.begin();
        let local = tracker.contribute(
            surface(1),
            1,
            OUTPUT,
            OUTPUT,
            Transform3d::IDENTITY,
            false,
            true,
        );
        assert!(geometry::is_empty(local));
    }

    #[test]
    fn undrawn_surfaces_are_tracked_but_silent() {
        let mut tracker = DamageTracker::new();
        tracker.begin();
        let local = tracker.contribute(
            surface(1),
            1,
            OUTPUT,
            OUTPUT,
            Transform3d::IDENTITY,
            false,
            false,
        );
        assert!(geometry::is_empty(local));
        assert!(geometry::is_empty(tracker.finish()));

        // Not reported as disappeared next time either.
        tracker.begin();
        assert!(geometry::is_empty(tracker.finish()));
    }
}

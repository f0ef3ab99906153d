// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resource lifetime tracking across aggregations.
//!
//! Each aggregated surface pins the resources its quads sample. Resources
//! are counted per `(frame sink, resource)` pair so the same id from two
//! different clients never collides. When a surface stops referencing a
//! resource, or leaves the aggregation entirely, the count drops; a count
//! reaching zero queues the resource for return to its owning sink.

use alloc::vec::Vec;

use hashbrown::HashMap;
use laminate_core::frame::{CompositorFrame, ResourceId, ReturnedResource, TransferableResource};
use laminate_core::surface::{FrameSinkId, SurfaceId};

/// Decides which transferable resources the display can use.
///
/// A frame carrying any resource the provider rejects is elided wholesale;
/// partial frames would show holes where the rejected resources were drawn.
pub trait ResourceProvider {
    /// Whether `resource` can be used by the display.
    fn accepts(&self, resource: &TransferableResource) -> bool;
}

/// Returns whether every declared resource of `frame` is usable.
pub(crate) fn validate(provider: Option<&dyn ResourceProvider>, frame: &CompositorFrame) -> bool {
    match provider {
        None => true,
        Some(p) => frame.resource_list.iter().all(|r| p.accepts(r)),
    }
}

/// Refcounts resources pinned by aggregated surfaces.
#[derive(Default)]
pub(crate) struct ResourceTracker {
    counts: HashMap<(FrameSinkId, ResourceId), u32>,
    per_surface: HashMap<SurfaceId, Vec<ResourceId>>,
    pending_returns: Vec<(FrameSinkId, Vec<ReturnedResource>)>,
}

impl ResourceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replaces `surface`'s pinned set with `referenced`, adjusting counts
    /// and queueing returns for resources it no longer uses.
    pub(crate) fn retain(&mut self, surface: SurfaceId, referenced: &[ResourceId]) {
        let sink = surface.sink();
        let old = self
            .per_surface
            .insert(surface, referenced.to_vec())
            .unwrap_or_default();
        for id in referenced {
            if !old.contains(id) {
                *self.counts.entry((sink, *id)).or_insert(0) += 1;
            }
        }
        let mut returned = Vec::new();
        for id in &old {
            if !referenced.contains(id) {
                self.release_one(sink, *id, &mut returned);
            }
        }
        self.queue(sink, returned);
    }

    /// Drops every resource pinned on behalf of `surface`.
    pub(crate) fn release_surface(&mut self, surface: SurfaceId) {
        let Some(old) = self.per_surface.remove(&surface) else {
            return;
        };
        let sink = surface.sink();
        let mut returned = Vec::new();
        for id in old {
            self.release_one(sink, id, &mut returned);
        }
        self.queue(sink, returned);
    }

    /// Takes the per-sink return batches accumulated since the last call.
    pub(crate) fn take_returns(&mut self) -> Vec<(FrameSinkId, Vec<ReturnedResource>)> {
        core::mem::take(&mut self.pending_returns)
    }

    fn release_one(&mut self, sink: FrameSinkId, id: ResourceId, returned: &mut Vec<ReturnedResource>) {
        let key = (sink, id);
        let Some(count) = self.counts.get_mut(&key) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&key);
            returned.push(ReturnedResource { id, count: 1 });
        }
    }

    fn queue(&mut self, sink: FrameSinkId, returned: Vec<ReturnedResource>) {
        if returned.is_empty() {
            return;
        }
        match self.pending_returns.iter_mut().find(|(s, _)| *s == sink) {
            Some((_, batch)) => batch.extend(returned),
            None => self.pending_returns.push((sink, returned)),
        }
    }
}

impl core::fmt::Debug for ResourceTracker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResourceTracker")
            .field("pinned", &self.counts.len())
            .field("surfaces", &self.per_surface.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use laminate_core::surface::LocalFrameId;

    fn surface(sink: u32, n: u32) -> SurfaceId {
        SurfaceId::new(FrameSinkId::new(sink, 1), LocalFrameId::new(n, 1))
    }

    #[test]
    fn dropped_reference_returns_the_resource() {
        let mut tracker = ResourceTracker::new();
        tracker.retain(surface(1, 1), &[ResourceId(7), ResourceId(8)]);
        assert!(tracker.take_returns().is_empty());

        tracker.retain(surface(1, 1), &[ResourceId(8)]);
        let returns = tracker.take_returns();
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].0, FrameSinkId::new(1, 1));
        assert_eq!(returns[0].1, vec![ReturnedResource {
            id: ResourceId(7),
            count: 1
        }]);
    }

    #[test]
    fn shared_resource_survives_one_holder_leaving() {
        let mut tracker = ResourceTracker::new();
        tracker.retain(surface(1, 1), &[ResourceId(7)]);
        tracker.retain(surface(1, 2), &[ResourceId(7)]);

        tracker.release_surface(surface(1, 1));
        assert!(tracker.take_returns().is_empty());

        tracker.release_surface(surface(1, 2));
        let returns = tracker.take_returns();
        assert_eq!(returns[0].1[0].id, ResourceId(7));
    }

    #[test]
    fn sinks_do_not_share_resource_ids() {
        let mut tracker = ResourceTracker::new();
        tracker.retain(surface(1, 1), &[ResourceId(7)]);
        tracker.retain(surface(2, 1), &[ResourceId(7)]);

        tracker.release_surface(surface(1, 1));
        let returns = tracker.take_returns();
        // Sink 1's copy comes back even though sink 2 still holds id 7.
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].0, FrameSinkId::new(1, 1));
    }

    #[test]
    fn validation_rejects_any_bad_resource() {
        struct SoftwareOnly;
        impl ResourceProvider for SoftwareOnly {
            fn accepts(&self, resource: &TransferableResource) -> bool {
                resource.is_software
            }
        }
        let mut frame = CompositorFrame::default();
        frame
            .resource_list
            .push(TransferableResource::new(ResourceId(1), true));
        assert!(validate(Some(&SoftwareOnly), &frame));
        frame
            .resource_list
            .push(TransferableResource::new(ResourceId(2), false));
        assert!(!validate(Some(&SoftwareOnly), &frame));
        assert!(validate(None, &frame));
    }
}

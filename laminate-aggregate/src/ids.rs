// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-pass id renumbering.
//!
//! Every frame numbers its passes privately, so the aggregator rewrites each
//! `(surface, local pass id)` pair to an id that is unique within the output
//! frame. Mappings persist across aggregations so a surface that keeps
//! resubmitting the same pass ids keeps receiving the same output ids, which
//! lets the display renderer reuse cached pass backings.

use hashbrown::HashMap;
use laminate_core::frame::RenderPassId;
use laminate_core::surface::SurfaceId;

#[derive(Clone, Copy, Debug)]
struct Entry {
    id: RenderPassId,
    used: bool,
}

/// Stable map from per-surface pass ids to output pass ids.
#[derive(Debug, Default)]
pub(crate) struct PassIdMap {
    entries: HashMap<(SurfaceId, RenderPassId), Entry>,
    next: u64,
}

impl PassIdMap {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next: 1,
        }
    }

    /// Clears usage marks ahead of an aggregation. Pairs remapped before the
    /// matching [`end_aggregation`](Self::end_aggregation) survive; the rest
    /// are dropped there.
    pub(crate) fn begin_aggregation(&mut self) {
        for entry in self.entries.values_mut() {
            entry.used = false;
        }
    }

    /// Returns the output id for `local` within `surface`, allocating a
    /// fresh one on first sight and marking the pair live.
    pub(crate) fn remap(&mut self, surface: SurfaceId, local: RenderPassId) -> RenderPassId {
        let next = &mut self.next;
        let entry = self.entries.entry((surface, local)).or_insert_with(|| {
            let id = RenderPassId(*next);
            *next += 1;
            Entry { id, used: false }
        });
        entry.used = true;
        entry.id
    }

    /// Drops every mapping not used since
    /// [`begin_aggregation`](Self::begin_aggregation).
    pub(crate) fn end_aggregation(&mut self) {
        self.entries.retain(|_, entry| entry.used);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Callback seam from the aggregator back to clients.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::frame::ReturnedResource;

use super::id::{FrameSinkId, LocalFrameId};

/// Receives end-of-aggregation notifications on behalf of clients.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about. Both methods are invoked synchronously
/// at the end of an aggregation, on the aggregator's thread.
pub trait FrameSinkClient {
    /// Called when previously-referenced resources are no longer reachable
    /// from any aggregated frame and should be handed back to the sink that
    /// submitted them.
    ///
    /// Ordering across sinks is unspecified; ordering within one call is
    /// stable.
    fn return_resources(&mut self, sink: FrameSinkId, resources: Vec<ReturnedResource>) {
        _ = (sink, resources);
    }

    /// Called once per aggregation for each surface that will contribute
    /// pixels, carrying that surface's contribution to the root damage in
    /// its own local space.
    fn will_draw_surface(&mut self, surface: LocalFrameId, damage: Rect) {
        _ = (surface, damage);
    }
}

/// A [`FrameSinkClient`] that discards all notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopClient;

impl FrameSinkClient for NoopClient {}

// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface and frame-sink identity types.

use core::fmt;

/// Identifies one client-owned frame sink.
///
/// The client id is assigned by the privileged process; the sink id is
/// client-local. Together they are globally unique.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameSinkId {
    /// Privileged-process-assigned client id.
    pub client_id: u32,
    /// Client-local sink id.
    pub sink_id: u32,
}

impl FrameSinkId {
    /// Creates a frame-sink id.
    #[inline]
    #[must_use]
    pub const fn new(client_id: u32, sink_id: u32) -> Self {
        Self { client_id, sink_id }
    }
}

impl fmt::Debug for FrameSinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameSinkId({}:{})", self.client_id, self.sink_id)
    }
}

/// Identifies one generation of a frame sink's surface.
///
/// The token is an unguessable value minted with the id; an embedder can only
/// reference a surface whose token it was handed, which prevents forging
/// surface references across clients.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalFrameId {
    index: u32,
    token: u64,
}

impl LocalFrameId {
    /// Creates a local frame id. Index 0 is the invalid sentinel.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, token: u64) -> Self {
        Self { index, token }
    }

    /// Returns the generation index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the embed token.
    #[inline]
    #[must_use]
    pub const fn token(self) -> u64 {
        self.token
    }

    /// Returns whether this id is non-sentinel.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.index != 0
    }
}

impl fmt::Debug for LocalFrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalFrameId({}, {:#x})", self.index, self.token)
    }
}

/// Globally unique key for a surface.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId {
    sink: FrameSinkId,
    local: LocalFrameId,
}

impl SurfaceId {
    /// Creates a surface id.
    #[inline]
    #[must_use]
    pub const fn new(sink: FrameSinkId, local: LocalFrameId) -> Self {
        Self { sink, local }
    }

    /// Returns the owning frame sink.
    #[inline]
    #[must_use]
    pub const fn sink(self) -> FrameSinkId {
        self.sink
    }

    /// Returns the sink-local id.
    #[inline]
    #[must_use]
    pub const fn local(self) -> LocalFrameId {
        self.local
    }

    /// Returns whether this id is non-sentinel.
    ///
    /// Validity in the registry sense (an un-evicted frame being present) is
    /// a property of the [`SurfaceManager`](super::SurfaceManager), not of
    /// the id.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.local.is_valid()
    }
}

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SurfaceId({}:{}, {}@{:#x})",
            self.sink.client_id,
            self.sink.sink_id,
            self.local.index(),
            self.local.token()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_detection() {
        let sink = FrameSinkId::new(1, 2);
        assert!(!SurfaceId::new(sink, LocalFrameId::new(0, 0xabc)).is_valid());
        assert!(SurfaceId::new(sink, LocalFrameId::new(1, 0xabc)).is_valid());
    }

    #[test]
    fn token_distinguishes_ids() {
        let sink = FrameSinkId::new(1, 2);
        let a = SurfaceId::new(sink, LocalFrameId::new(1, 0xaaa));
        let b = SurfaceId::new(sink, LocalFrameId::new(1, 0xbbb));
        assert_ne!(a, b);
    }
}

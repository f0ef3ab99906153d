// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transferable GPU resources and their return path.

use core::fmt;

/// Identifies a resource within one frame sink's id space.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub u32);

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.0)
    }
}

/// A GPU resource handle transferred alongside a frame.
///
/// The aggregator does not interpret the handle; it validates it against the
/// display's resource provider and reference-counts it while any aggregated
/// frame still samples it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferableResource {
    /// Sink-local resource id.
    pub id: ResourceId,
    /// Whether this is a software (shared-memory) resource rather than a
    /// GPU texture.
    pub is_software: bool,
    /// Whether quads sampling this resource may only reach secure outputs.
    pub secure_output_only: bool,
}

impl TransferableResource {
    /// Creates a resource handle with no secure-output restriction.
    #[must_use]
    pub fn new(id: ResourceId, is_software: bool) -> Self {
        Self {
            id,
            is_software,
            secure_output_only: false,
        }
    }
}

/// A resource handed back to its submitting client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReturnedResource {
    /// Sink-local resource id.
    pub id: ResourceId,
    /// Number of references released.
    pub count: u32,
}

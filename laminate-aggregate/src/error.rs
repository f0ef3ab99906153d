// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conditions under which a surface's content is withheld from the output.
//!
//! Aggregation itself never fails: a surface that cannot contribute is
//! elided and the traversal continues. These values name the reasons, both
//! for logging and for callers that want to inspect why an embedding came
//! up empty.

use laminate_core::surface::SurfaceId;
use thiserror::Error;

/// Why a surface was elided during aggregation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    /// The surface id is unknown to the manager or has no active frame.
    #[error("surface {0:?} does not exist or has no active frame")]
    InvalidSurface(SurfaceId),
    /// Embedding the surface would close a cycle in the embedding graph.
    #[error("surface {0:?} closes an embedding cycle")]
    CycleDetected(SurfaceId),
    /// The frame references resources the display cannot accept.
    #[error("surface {0:?} references resources the display cannot accept")]
    ResourceValidationFailed(SurfaceId),
    /// A protected quad sits under a pending copy-output request and was
    /// masked for this aggregation.
    #[error("surface {0:?} has protected content under a pending capture")]
    ProtectedContentWithCopyRequest(SurfaceId),
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use laminate_core::surface::{FrameSinkId, LocalFrameId};

    #[test]
    fn messages_name_the_surface() {
        let id = SurfaceId::new(FrameSinkId::new(3, 1), LocalFrameId::new(7, 99));
        let message = AggregateError::CycleDetected(id).to_string();
        assert!(message.contains("cycle"), "{message}");
        assert!(message.contains("3:1"), "{message}");
    }
}

// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot copy-output requests.

use core::fmt;

/// A one-shot request to capture the pixels of a render pass.
///
/// Deliberately not `Clone`: at most one aggregation may consume a given
/// request, and consumption is a *move* out of the source frame. The id is
/// chosen by the submitting client and carried through aggregation
/// unchanged, so a capture result can be routed back to its requester.
pub struct CopyOutputRequest {
    id: u64,
}

impl CopyOutputRequest {
    /// Creates a request with a client-chosen identity.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    /// Returns the client-chosen identity.
    #[must_use]
    pub fn request_id(&self) -> u64 {
        self.id
    }
}

impl fmt::Debug for CopyOutputRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CopyOutputRequest({})", self.id)
    }
}

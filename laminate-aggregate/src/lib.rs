// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface aggregation: flattening a forest of compositor frames into one.
//!
//! Clients submit [`CompositorFrame`](laminate_core::frame::CompositorFrame)s
//! for their own surfaces independently; frames embed other surfaces by id
//! without ever seeing their content. Each display interval, an
//! [`Aggregator`] resolves those embeddings against the
//! [`SurfaceManager`](laminate_core::surface::SurfaceManager) and produces a
//! single frame the display renderer can draw directly:
//!
//! - surface quads are replaced by the embedded surface's content, either
//!   inlined into the embedder's pass or referenced as a separate pass,
//! - render-pass ids are renumbered to be unique within the output, stably
//!   across aggregations,
//! - per-surface damage is accumulated into one root-space damage rect,
//! - copy-output requests are moved into the output exactly once,
//! - resources are validated, refcounted, and returned to their owning
//!   clients when no aggregated surface references them anymore,
//! - protected content is masked on insecure outputs and under pending
//!   captures.
//!
//! Embedding cycles are tolerated: the quad that would close a cycle is
//! dropped and everything else renders normally.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod aggregator;
mod compose;
mod damage;
mod error;
mod ids;
mod resources;

pub use aggregator::Aggregator;
pub use error::AggregateError;
pub use resources::ResourceProvider;

// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface and compositor-frame data model for laminate.
//!
//! `laminate-core` provides the foundational data structures for a surface
//! compositor: identities for surfaces and frame sinks, the compositor-frame
//! submission format (render passes, quads, shared quad state, transferable
//! resources), and the [`SurfaceManager`](surface::SurfaceManager) name
//! service that maps a [`SurfaceId`](surface::SurfaceId) to the most recently
//! submitted frame. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! Clients produce frames independently; the aggregator (in
//! `laminate-aggregate`) flattens them for display:
//!
//! ```text
//!   Client ──► CompositorFrame ──► SurfaceManager::submit_frame()
//!                                        │
//!                                        ▼
//!   Aggregator::aggregate(root) ──► SurfaceManager::frame(id)
//!         │
//!         ▼
//!   aggregated CompositorFrame ──► display renderer
//! ```
//!
//! **[`surface`]** — [`SurfaceId`](surface::SurfaceId) identity types, the
//! [`SurfaceManager`](surface::SurfaceManager) registry, and the
//! [`FrameSinkClient`](surface::FrameSinkClient) callback seam through which
//! resources are returned to clients.
//!
//! **[`frame`]** — The submission format: [`CompositorFrame`](frame::CompositorFrame),
//! [`RenderPass`](frame::RenderPass), [`DrawQuad`](frame::DrawQuad),
//! [`SharedQuadState`](frame::SharedQuadState), and the transferable-resource
//! and copy-output-request types.
//!
//! **[`transform`]** — Column-major 4×4 affine transform for quad and pass
//! positioning, with rect mapping and axis-alignment classification.
//!
//! **[`geometry`]** — Empty-aware rectangle algebra over [`kurbo::Rect`].
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod frame;
pub mod geometry;
pub mod surface;
pub mod transform;

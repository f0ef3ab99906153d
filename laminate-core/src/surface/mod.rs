// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface identity and the surface registry.
//!
//! A *surface* is a named, independently-updatable source of compositor
//! frames, produced by one client. Each surface is keyed by a [`SurfaceId`]:
//! a ([`FrameSinkId`], [`LocalFrameId`]) pair where the local id carries an
//! unguessable embed token so that ids cannot be forged by other clients.
//!
//! The [`SurfaceManager`] is the name service: it owns the most recently
//! submitted frame per surface and stamps every submission with a
//! monotonically increasing index, which the aggregator uses to detect
//! re-submissions when diffing damage across aggregations.
//!
//! [`FrameSinkClient`] is the callback seam back to clients: resource
//! returns and per-surface draw notifications. All methods default to no-ops
//! so implementations only override the events they care about.

mod client;
mod id;
mod manager;

pub use client::{FrameSinkClient, NoopClient};
pub use id::{FrameSinkId, LocalFrameId, SurfaceId};
pub use manager::SurfaceManager;

// Copyright 2026 the Laminate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics for laminate frames.
//!
//! Development-only tooling for inspecting what the aggregator produced:
//!
//! - [`pretty`] writes an indented, human-readable dump of a
//!   [`CompositorFrame`](laminate_core::frame::CompositorFrame) to any
//!   [`Write`](std::io::Write) destination.
//! - [`json`] exports a frame as JSON for diffing between aggregations or
//!   attaching to bug reports.
//!
//! This crate requires `std` and is not published.

pub mod json;
pub mod pretty;

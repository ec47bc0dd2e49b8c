// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing and inspection tools for arbor diagnostics.
//!
//! Lifecycle events reach these tools through
//! [`TraceSink`](arbor_core::trace::TraceSink) implementations:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//!
//! The tree itself can be inspected at any point:
//!
//! - [`dump::dump`]: indented text outline of every root and its subtree.
//! - [`snapshot::to_json`]: the same structure as a JSON document.

pub mod dump;
pub mod pretty;
pub mod recorder;
pub mod snapshot;

// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for presenting head-mounted display frames.
//!
//! `vantage_core` holds the data model and the contracts shared by every
//! other Vantage crate. It is `no_std` compatible (with `alloc`) so the
//! display model can be embedded in drivers and tools that do not link the
//! standard library.
//!
//! # Architecture
//!
//! A frame flows from the application's render API to a display device that
//! is driven by a different API:
//!
//! ```text
//!   DisplayConfiguration ──► viewport / projection per eye
//!                                   │
//!                                   ▼
//!   application draws into API-A buffers (display-setup callback)
//!                                   │
//!                                   ▼
//!   shared surface unlocked ──► Presenter::present_eye() ──► relocked
//!                                   │
//!                                   ▼
//!   TraceSink (phase begin/end, ownership, frame summary)
//! ```
//!
//! **[`config`]** — Immutable description of the display: resolutions,
//! field of view, distortion model and per-eye info.
//!
//! **[`viewport`]** — Per-eye viewports and projection transforms derived
//! from the configuration.
//!
//! **[`backend`]** — The [`Presenter`](backend::Presenter) trait that
//! display backends implement, plus the per-eye present parameters.
//!
//! **[`transform`]** — Column-major 4×4 transform used for projections and
//! time-warp matrices.
//!
//! **[`pose`]** — Head/eye pose handed to application callbacks.
//!
//! **[`time`]** — Monotonic host time, used for presentation deadlines and
//! trace timestamps.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-pipeline instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod config;
pub mod output;
pub mod pose;
pub mod time;
pub mod trace;
pub mod transform;
pub mod viewport;

// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON display descriptors for Vantage.
//!
//! Turns a headset's display descriptor into a
//! [`DisplayConfiguration`](vantage_core::config::DisplayConfiguration):
//!
//! ```rust,ignore
//! let config = vantage_config::from_path("displays/hdk_20.json")?
//!     .with_active_inputs(1);
//! println!("{config}");
//! ```
//!
//! The descriptor root holds an `hmd` object with `field_of_view`,
//! `resolutions` and `eyes` (required), plus optional `device`, `rendering`
//! and `distortion` sections. Point-sample distortion meshes may be kept in a
//! separate file, named by `mono_point_samples_external_file` or
//! `rgb_point_samples_external_file` and resolved against the working
//! directory.
//!
//! Parsing never panics; every malformed input maps to a [`ConfigError`].
//! Recoverable oddities (unknown display mode, legacy device layout) are
//! reported through `log` warnings.

mod distortion;
mod error;
mod parse;

use std::path::Path;

pub use error::ConfigError;
use vantage_core::config::DisplayConfiguration;

/// Parses a descriptor from JSON text.
pub fn parse(descriptor: &str) -> Result<DisplayConfiguration, ConfigError> {
    let root: serde_json::Value = serde_json::from_str(descriptor)?;
    parse::parse_root(&root)
}

/// Reads and parses a descriptor file.
pub fn from_path(path: impl AsRef<Path>) -> Result<DisplayConfiguration, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

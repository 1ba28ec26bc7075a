// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Descriptor parse errors.

use std::path::PathBuf;

use vantage_core::config::ModelError;

/// Why a display descriptor could not be turned into a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The descriptor is not valid JSON.
    #[error("display descriptor is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The descriptor file could not be read.
    #[error("could not read display descriptor {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A required object or array is absent.
    #[error("missing required section `{0}`")]
    MissingSection(&'static str),

    /// A required field is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field has the wrong JSON type or an out-of-range value.
    #[error("field `{field}` must be {expected}")]
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// What the field should have been.
        expected: &'static str,
    },

    /// `distortion.type` names a model this crate does not know.
    #[error("unrecognized distortion type: {0}")]
    UnknownDistortionType(String),

    /// A distortion coefficient or sample list is missing or empty.
    #[error("couldn't find non-empty distortion data `{0}`")]
    EmptyDistortion(String),

    /// A sample list entry is not `[[x, y], [x, y]]`.
    #[error("malformed distortion sample in `{0}`")]
    MalformedSample(String),

    /// An external distortion file could not be opened.
    #[error("couldn't open external distortion file {path}: {source}")]
    ExternalFile {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An external distortion file is not valid JSON.
    #[error("couldn't parse external distortion file {path}: {source}")]
    ExternalJson {
        /// File that failed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The parsed values do not form a valid configuration.
    #[error(transparent)]
    Model(#[from] ModelError),
}

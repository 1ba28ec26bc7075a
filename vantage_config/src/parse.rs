// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `hmd` object: field of view, device, resolutions, rendering, eyes.

use log::warn;
use serde_json::Value;
use vantage_core::config::{
    DeviceInfo, DisplayConfiguration, DisplayMode, DisplayParts, EyeInfo, Resolution,
};

use crate::distortion::parse_distortion;
use crate::error::ConfigError;

pub(crate) fn parse_root(root: &Value) -> Result<DisplayConfiguration, ConfigError> {
    let hmd = root.get("hmd").ok_or(ConfigError::MissingSection("hmd"))?;

    let fov = hmd
        .get("field_of_view")
        .ok_or(ConfigError::MissingSection("hmd.field_of_view"))?;
    let monocular_horizontal_fov = required_f64(fov, "monocular_horizontal")?;
    let monocular_vertical_fov = required_f64(fov, "monocular_vertical")?;
    let overlap = optional_f64(fov, "overlap_percent", 100.0)? / 100.0;
    let pitch_tilt = optional_f64(fov, "pitch_tilt", 0.0)?;

    let device = parse_device(hmd.get("device"));

    let resolutions = hmd
        .get("resolutions")
        .and_then(Value::as_array)
        .ok_or(ConfigError::MissingSection("hmd.resolutions"))?;
    if resolutions.is_empty() {
        return Err(ConfigError::MissingSection("hmd.resolutions"));
    }
    let mut swap_eyes = false;
    let resolutions = resolutions
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let (res, swap) = parse_resolution(r)?;
            if i == 0 {
                swap_eyes = swap;
            }
            Ok(res)
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let rendering = hmd.get("rendering").unwrap_or(&Value::Null);
    let right_roll = optional_f64(rendering, "right_roll", 0.0)?;
    let left_roll = optional_f64(rendering, "left_roll", 0.0)?;

    let (distortion, distortion_type) = parse_distortion(hmd.get("distortion"))?;

    let eyes = hmd
        .get("eyes")
        .and_then(Value::as_array)
        .ok_or(ConfigError::MissingSection("hmd.eyes"))?
        .iter()
        .map(parse_eye)
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let parts = DisplayParts {
        monocular_horizontal_fov,
        monocular_vertical_fov,
        overlap,
        pitch_tilt,
        resolutions,
        swap_eyes,
        distortion,
        distortion_type,
        eyes,
        device,
        left_roll,
        right_roll,
    };
    Ok(DisplayConfiguration::new(parts)?)
}

fn parse_device(device: Option<&Value>) -> DeviceInfo {
    let Some(device) = device else {
        return DeviceInfo::default();
    };
    let props = match device.get("properties") {
        Some(sub) if sub.as_object().is_some_and(|o| !o.is_empty()) => {
            warn!(
                "display descriptor uses the outdated `device.properties` layout; \
                 ask the vendor for a descriptor matching the current schema"
            );
            sub
        }
        _ => device,
    };
    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| props.get(*k).and_then(Value::as_str))
            .unwrap_or_default()
            .to_owned()
    };
    DeviceInfo {
        vendor: text(&["vendor"]),
        model: text(&["model"]),
        version: text(&["Version", "version"]),
        note: text(&["Note", "note"]),
    }
}

fn parse_resolution(res: &Value) -> Result<(Resolution, bool), ConfigError> {
    let video_inputs = optional_u32(res, "video_inputs", 1)?;
    let width = required_u32(res, "width")?;
    let height = required_u32(res, "height")?;
    let mut resolution = Resolution::new(width, height, video_inputs);

    if let Some(mode) = res.get("display_mode").and_then(Value::as_str) {
        match DisplayMode::from_descriptor(mode) {
            Some(mode) => resolution.display_mode = mode,
            None => warn!(
                "unknown display mode `{mode}`, using {}",
                resolution.display_mode.as_str()
            ),
        }
    }
    let swap = flag(res, "swap_eyes")?;
    Ok((resolution, swap))
}

fn parse_eye(eye: &Value) -> Result<EyeInfo, ConfigError> {
    Ok(EyeInfo {
        center_proj_x: optional_f64(eye, "center_proj_x", 0.5)?,
        center_proj_y: optional_f64(eye, "center_proj_y", 0.5)?,
        rotate_180: flag(eye, "rotate_180")?,
    })
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn required_f64(obj: &Value, key: &'static str) -> Result<f64, ConfigError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(ConfigError::MissingField(key)),
        Some(v) => v.as_f64().ok_or(ConfigError::InvalidValue {
            field: key,
            expected: "a number",
        }),
    }
}

fn optional_f64(obj: &Value, key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(_) => required_f64(obj, key),
    }
}

fn required_u32(obj: &Value, key: &'static str) -> Result<u32, ConfigError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(ConfigError::MissingField(key)),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(ConfigError::InvalidValue {
                field: key,
                expected: "a non-negative integer",
            }),
    }
}

fn optional_u32(obj: &Value, key: &'static str, default: u32) -> Result<u32, ConfigError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(_) => required_u32(obj, key),
    }
}

/// A boolean that may also be written as an integer (non-zero is true).
fn flag(obj: &Value, key: &'static str) -> Result<bool, ConfigError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(v) => v.as_i64().map(|n| n != 0).ok_or(ConfigError::InvalidValue {
            field: key,
            expected: "a boolean or integer",
        }),
    }
}

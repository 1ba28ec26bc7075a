// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `hmd.distortion` section.
//!
//! The model is chosen by the `type` string when present, otherwise by which
//! members exist. Sample meshes may live in an external JSON file whose
//! `display.hmd.distortion` object has the same shape as the inline section.

use std::borrow::Cow;
use std::path::Path;

use log::{debug, error, info};
use serde_json::Value;
use vantage_core::config::{
    DistortionModel, PointMesh, PointSample, PolynomialDistortion, RgbMeshes,
};

use crate::error::ConfigError;

const MONO_EXTERNAL: &str = "mono_point_samples_external_file";
const RGB_EXTERNAL: &str = "rgb_point_samples_external_file";

/// Parses `hmd.distortion` (absent is fine). Returns the model and the raw
/// `type` string.
pub(crate) fn parse_distortion(
    distortion: Option<&Value>,
) -> Result<(DistortionModel, String), ConfigError> {
    let empty = Value::Null;
    let distortion = distortion.unwrap_or(&empty);
    let kind = distortion
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    let has = |key: &str| distortion.get(key).is_some();

    let model = if kind == "rgb_symmetric_polynomials" || has("polynomial_coeffs_red") {
        info!("using polynomial distortion");
        DistortionModel::RgbSymmetricPolynomials(PolynomialDistortion {
            distance_scale_x: scale(distortion, "distance_scale_x")?,
            distance_scale_y: scale(distortion, "distance_scale_y")?,
            red: coefficients(distortion, "red")?,
            green: coefficients(distortion, "green")?,
            blue: coefficients(distortion, "blue")?,
        })
    } else if kind == "mono_point_samples" || has("mono_point_samples") || has(MONO_EXTERNAL) {
        info!("using mono point sample distortion");
        let source = resolve_external(distortion, MONO_EXTERNAL)?;
        DistortionModel::MonoPointSamples(meshes(&source, "mono_point_samples")?)
    } else if kind == "rgb_point_samples" || has("rgb_point_samples") || has(RGB_EXTERNAL) {
        info!("using rgb point sample distortion");
        let source = resolve_external(distortion, RGB_EXTERNAL)?;
        DistortionModel::RgbPointSamples(RgbMeshes {
            red: meshes(&source, "red_point_samples")?,
            green: meshes(&source, "green_point_samples")?,
            blue: meshes(&source, "blue_point_samples")?,
        })
    } else if kind == "rgb_k1_coefficients" {
        // k1 terms are not applied; treated as no distortion.
        debug!("rgb_k1_coefficients distortion mapped to identity polynomial");
        DistortionModel::default()
    } else if !kind.is_empty() {
        error!("unrecognized distortion type: {kind}");
        return Err(ConfigError::UnknownDistortionType(kind));
    } else {
        info!("no distortion parameters found, using identity polynomial");
        DistortionModel::default()
    };
    Ok((model, kind))
}

fn scale(distortion: &Value, key: &'static str) -> Result<f32, ConfigError> {
    match distortion.get(key) {
        None | Some(Value::Null) => Ok(1.0),
        Some(v) => v.as_f64().map(single).ok_or(ConfigError::InvalidValue {
            field: key,
            expected: "a number",
        }),
    }
}

fn coefficients(distortion: &Value, color: &str) -> Result<Vec<f32>, ConfigError> {
    let key = format!("polynomial_coeffs_{color}");
    let list = distortion
        .get(&key)
        .and_then(Value::as_array)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ConfigError::EmptyDistortion(key.clone()))?;
    list.iter()
        .map(|c| {
            c.as_f64()
                .map(single)
                .ok_or_else(|| ConfigError::MalformedSample(key.clone()))
        })
        .collect()
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "distortion parameters are stored single precision"
)]
fn single(v: f64) -> f32 {
    v as f32
}

/// Returns the distortion object to read samples from: the inline one, or
/// `display.hmd.distortion` of the external file named by `file_key`.
fn resolve_external<'a>(
    distortion: &'a Value,
    file_key: &str,
) -> Result<Cow<'a, Value>, ConfigError> {
    let Some(file) = distortion.get(file_key).and_then(Value::as_str) else {
        return Ok(Cow::Borrowed(distortion));
    };
    let path = Path::new(file);
    debug!("reading external distortion samples from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|source| {
        error!("couldn't open external distortion file {}", path.display());
        ConfigError::ExternalFile {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let mut root: Value =
        serde_json::from_str(&text).map_err(|source| ConfigError::ExternalJson {
            path: path.to_path_buf(),
            source,
        })?;
    let inner = root
        .pointer_mut("/display/hmd/distortion")
        .map(Value::take)
        .unwrap_or(Value::Null);
    Ok(Cow::Owned(inner))
}

/// Parses a list of per-eye meshes stored under `key`.
fn meshes(distortion: &Value, key: &str) -> Result<Vec<PointMesh>, ConfigError> {
    let eyes = distortion
        .get(key)
        .and_then(Value::as_array)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ConfigError::EmptyDistortion(key.to_owned()))?;
    eyes.iter()
        .map(|eye| {
            let points = eye
                .as_array()
                .filter(|p| !p.is_empty())
                .ok_or_else(|| ConfigError::EmptyDistortion(format!("{key} (eye)")))?;
            points
                .iter()
                .map(|p| sample(p).ok_or_else(|| ConfigError::MalformedSample(key.to_owned())))
                .collect()
        })
        .collect()
}

fn sample(entry: &Value) -> Option<PointSample> {
    let [from, to] = entry.as_array()?.as_slice() else {
        return None;
    };
    Some(PointSample {
        undistorted: pair(from)?,
        distorted: pair(to)?,
    })
}

fn pair(v: &Value) -> Option<[f64; 2]> {
    let [x, y] = v.as_array()?.as_slice() else {
        return None;
    };
    Some([x.as_f64()?, y.as_f64()?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_section_is_identity() {
        let (model, kind) = parse_distortion(None).unwrap();
        assert_eq!(model, DistortionModel::default());
        assert!(kind.is_empty());
    }

    #[test]
    fn polynomial_detected_by_member() {
        let d = json!({
            "distance_scale_x": 2.0,
            "polynomial_coeffs_red": [0, 1, 0.5],
            "polynomial_coeffs_green": [0, 1],
            "polynomial_coeffs_blue": [0, 1, -0.25],
        });
        let (model, kind) = parse_distortion(Some(&d)).unwrap();
        let poly = model.polynomial().unwrap();
        assert_eq!(poly.distance_scale_x, 2.0);
        assert_eq!(poly.distance_scale_y, 1.0);
        assert_eq!(poly.red, vec![0.0, 1.0, 0.5]);
        assert_eq!(poly.blue, vec![0.0, 1.0, -0.25]);
        assert!(kind.is_empty());
    }

    #[test]
    fn polynomial_with_empty_channel_fails() {
        let d = json!({
            "type": "rgb_symmetric_polynomials",
            "polynomial_coeffs_red": [0, 1],
            "polynomial_coeffs_green": [],
            "polynomial_coeffs_blue": [0, 1],
        });
        let err = parse_distortion(Some(&d)).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyDistortion(k) if k == "polynomial_coeffs_green"));
    }

    #[test]
    fn k1_coefficients_map_to_identity() {
        let d = json!({ "type": "rgb_k1_coefficients", "k1_red": 0.1 });
        let (model, kind) = parse_distortion(Some(&d)).unwrap();
        assert_eq!(model, DistortionModel::default());
        assert_eq!(kind, "rgb_k1_coefficients");
    }

    #[test]
    fn unknown_type_rejected() {
        let d = json!({ "type": "fisheye_magic" });
        let err = parse_distortion(Some(&d)).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDistortionType(t) if t == "fisheye_magic"));
    }

    #[test]
    fn mono_meshes_inline() {
        let d = json!({
            "mono_point_samples": [
                [[[0.0, 0.0], [0.1, 0.1]], [[1.0, 1.0], [0.9, 0.9]]],
                [[[0.5, 0.5], [0.5, 0.5]]],
            ]
        });
        let (model, _) = parse_distortion(Some(&d)).unwrap();
        let DistortionModel::MonoPointSamples(meshes) = model else {
            panic!("expected mono samples");
        };
        assert_eq!(meshes.len(), 2);
        assert_eq!(meshes[0][1].distorted, [0.9, 0.9]);
    }

    #[test]
    fn malformed_sample_rejected() {
        let d = json!({
            "type": "mono_point_samples",
            "mono_point_samples": [[[[0.0, 0.0], [0.1]]]],
        });
        let err = parse_distortion(Some(&d)).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedSample(_)));
    }

    #[test]
    fn empty_eye_mesh_rejected() {
        let d = json!({ "mono_point_samples": [[]] });
        assert!(matches!(
            parse_distortion(Some(&d)),
            Err(ConfigError::EmptyDistortion(_))
        ));
    }

    #[test]
    fn rgb_meshes_from_external_file() {
        let path = std::env::temp_dir().join(format!(
            "vantage_config_rgb_samples_{}.json",
            std::process::id()
        ));
        let mesh = json!([[[[0.0, 0.0], [0.0, 0.0]]]]);
        let file = json!({
            "display": { "hmd": { "distortion": {
                "red_point_samples": mesh,
                "green_point_samples": mesh,
                "blue_point_samples": mesh,
            }}}
        });
        std::fs::write(&path, file.to_string()).unwrap();

        let d = json!({ "rgb_point_samples_external_file": path.to_str().unwrap() });
        let result = parse_distortion(Some(&d));
        std::fs::remove_file(&path).unwrap();

        let (model, _) = result.unwrap();
        let DistortionModel::RgbPointSamples(rgb) = model else {
            panic!("expected rgb samples");
        };
        assert_eq!(rgb.green.len(), 1);
        assert_eq!(rgb.blue[0][0].undistorted, [0.0, 0.0]);
    }

    #[test]
    fn missing_external_file_reported() {
        let d = json!({ "mono_point_samples_external_file": "/nonexistent/vantage/mesh.json" });
        assert!(matches!(
            parse_distortion(Some(&d)),
            Err(ConfigError::ExternalFile { .. })
        ));
    }
}

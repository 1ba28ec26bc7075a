// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display configuration model.
//!
//! A [`DisplayConfiguration`] describes one head-mounted display: the
//! monocular field of view, the video resolutions it accepts, the lens
//! distortion model, and per-eye projection info. It is built once (usually
//! by `vantage_config` from a JSON descriptor) and never mutated afterwards,
//! apart from choosing which resolution is active.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::output::{DisplayId, EyeId};

// ---------------------------------------------------------------------------
// Display mode and resolution
// ---------------------------------------------------------------------------

/// How eye images are laid out across the video input(s).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    /// Both eyes share one input, left half and right half.
    HorizontalSideBySide,
    /// Both eyes share one input, top half and bottom half.
    VerticalSideBySide,
    /// Each eye fills its own input.
    FullScreen,
}

impl DisplayMode {
    /// Parses a descriptor mode string (`"horz_side_by_side"`,
    /// `"vert_side_by_side"`, `"full_screen"`).
    #[must_use]
    pub fn from_descriptor(s: &str) -> Option<Self> {
        match s {
            "horz_side_by_side" => Some(Self::HorizontalSideBySide),
            "vert_side_by_side" => Some(Self::VerticalSideBySide),
            "full_screen" => Some(Self::FullScreen),
            _ => None,
        }
    }

    /// Returns the descriptor string for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HorizontalSideBySide => "horz_side_by_side",
            Self::VerticalSideBySide => "vert_side_by_side",
            Self::FullScreen => "full_screen",
        }
    }

    /// The mode assumed when a resolution entry names none.
    #[must_use]
    pub const fn default_for_inputs(video_inputs: u32) -> Self {
        if video_inputs > 1 {
            Self::FullScreen
        } else {
            Self::HorizontalSideBySide
        }
    }
}

/// One supported video resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Width in pixels of one video input.
    pub width: u32,
    /// Height in pixels of one video input.
    pub height: u32,
    /// Number of video inputs driven at this resolution.
    pub video_inputs: u32,
    /// Eye layout across the inputs.
    pub display_mode: DisplayMode,
}

impl Resolution {
    /// Creates a resolution using the default mode for `video_inputs`.
    #[must_use]
    pub const fn new(width: u32, height: u32, video_inputs: u32) -> Self {
        Self {
            width,
            height,
            video_inputs,
            display_mode: DisplayMode::default_for_inputs(video_inputs),
        }
    }
}

// ---------------------------------------------------------------------------
// Distortion
// ---------------------------------------------------------------------------

/// One distortion-mesh sample: where a point lands before and after the lens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointSample {
    /// Normalized position in the rendered image.
    pub undistorted: [f64; 2],
    /// Normalized position on the panel.
    pub distorted: [f64; 2],
}

/// Distortion samples for one eye.
pub type PointMesh = Vec<PointSample>;

/// Radially symmetric per-channel polynomial distortion.
#[derive(Clone, Debug, PartialEq)]
pub struct PolynomialDistortion {
    /// Horizontal scale applied to the radius before evaluation.
    pub distance_scale_x: f32,
    /// Vertical scale applied to the radius before evaluation.
    pub distance_scale_y: f32,
    /// Red channel coefficients, lowest order first.
    pub red: Vec<f32>,
    /// Green channel coefficients, lowest order first.
    pub green: Vec<f32>,
    /// Blue channel coefficients, lowest order first.
    pub blue: Vec<f32>,
}

impl PolynomialDistortion {
    /// `r' = r` on every channel.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            distance_scale_x: 1.0,
            distance_scale_y: 1.0,
            red: vec![0.0, 1.0],
            green: vec![0.0, 1.0],
            blue: vec![0.0, 1.0],
        }
    }
}

/// Per-channel point meshes, one mesh per eye in each channel.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RgbMeshes {
    /// Red channel meshes.
    pub red: Vec<PointMesh>,
    /// Green channel meshes.
    pub green: Vec<PointMesh>,
    /// Blue channel meshes.
    pub blue: Vec<PointMesh>,
}

/// Lens distortion description carried by the display.
#[derive(Clone, Debug, PartialEq)]
pub enum DistortionModel {
    /// Per-channel radial polynomials.
    RgbSymmetricPolynomials(PolynomialDistortion),
    /// One sample mesh per eye, shared by all channels.
    MonoPointSamples(Vec<PointMesh>),
    /// One sample mesh per eye for each color channel.
    RgbPointSamples(RgbMeshes),
}

impl DistortionModel {
    /// Descriptor name of this model kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RgbSymmetricPolynomials(_) => "rgb_symmetric_polynomials",
            Self::MonoPointSamples(_) => "mono_point_samples",
            Self::RgbPointSamples(_) => "rgb_point_samples",
        }
    }

    /// Returns the polynomial parameters, if this is a polynomial model.
    #[must_use]
    pub fn polynomial(&self) -> Option<&PolynomialDistortion> {
        match self {
            Self::RgbSymmetricPolynomials(p) => Some(p),
            _ => None,
        }
    }
}

impl Default for DistortionModel {
    fn default() -> Self {
        Self::RgbSymmetricPolynomials(PolynomialDistortion::identity())
    }
}

// ---------------------------------------------------------------------------
// Eyes and device
// ---------------------------------------------------------------------------

/// Per-eye projection info.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeInfo {
    /// Horizontal center of projection, as a fraction of the eye's viewport.
    pub center_proj_x: f64,
    /// Vertical center of projection, as a fraction of the eye's viewport.
    pub center_proj_y: f64,
    /// The panel for this eye is mounted upside down.
    pub rotate_180: bool,
}

impl Default for EyeInfo {
    fn default() -> Self {
        Self {
            center_proj_x: 0.5,
            center_proj_y: 0.5,
            rotate_180: false,
        }
    }
}

/// Free-form identification of the headset.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DeviceInfo {
    /// Manufacturer name.
    pub vendor: String,
    /// Model name.
    pub model: String,
    /// Descriptor or hardware version.
    pub version: String,
    /// Vendor note.
    pub note: String,
}

// ---------------------------------------------------------------------------
// DisplayConfiguration
// ---------------------------------------------------------------------------

/// Errors from assembling a [`DisplayConfiguration`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// No resolution entries were supplied.
    #[error("display configuration has no resolutions")]
    NoResolutions,
    /// No eye entries were supplied.
    #[error("display configuration has no eyes")]
    NoEyes,
}

/// Everything needed to build a [`DisplayConfiguration`].
///
/// Angles are in degrees. `overlap` is a fraction (`1.0` is full overlap).
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayParts {
    /// Horizontal field of view of one eye, in degrees.
    pub monocular_horizontal_fov: f64,
    /// Vertical field of view of one eye, in degrees.
    pub monocular_vertical_fov: f64,
    /// Binocular overlap fraction.
    pub overlap: f64,
    /// Downward tilt of the displays, in degrees.
    pub pitch_tilt: f64,
    /// Supported resolutions, in descriptor order.
    pub resolutions: Vec<Resolution>,
    /// Whether left and right images are swapped on the panel.
    pub swap_eyes: bool,
    /// Lens distortion description.
    pub distortion: DistortionModel,
    /// The raw `distortion.type` string, empty when absent.
    pub distortion_type: String,
    /// Per-eye info, in eye order.
    pub eyes: Vec<EyeInfo>,
    /// Headset identification.
    pub device: DeviceInfo,
    /// Roll applied to the left eye at present time, in degrees.
    pub left_roll: f64,
    /// Roll applied to the right eye at present time, in degrees.
    pub right_roll: f64,
}

impl Default for DisplayParts {
    fn default() -> Self {
        Self {
            monocular_horizontal_fov: 90.0,
            monocular_vertical_fov: 90.0,
            overlap: 1.0,
            pitch_tilt: 0.0,
            resolutions: Vec::new(),
            swap_eyes: false,
            distortion: DistortionModel::default(),
            distortion_type: String::new(),
            eyes: Vec::new(),
            device: DeviceInfo::default(),
            left_roll: 0.0,
            right_roll: 0.0,
        }
    }
}

/// Immutable description of a head-mounted display.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayConfiguration {
    parts: DisplayParts,
    active: usize,
}

impl DisplayConfiguration {
    /// Validates `parts` and selects the first resolution as active.
    pub fn new(parts: DisplayParts) -> Result<Self, ModelError> {
        if parts.resolutions.is_empty() {
            return Err(ModelError::NoResolutions);
        }
        if parts.eyes.is_empty() {
            return Err(ModelError::NoEyes);
        }
        Ok(Self { parts, active: 0 })
    }

    /// Selects the active resolution by video input count.
    ///
    /// The first resolution with exactly `video_inputs` inputs wins; with no
    /// match the first resolution stays active.
    #[must_use]
    pub fn with_active_inputs(mut self, video_inputs: u32) -> Self {
        self.active = self
            .parts
            .resolutions
            .iter()
            .position(|r| r.video_inputs == video_inputs)
            .unwrap_or(0);
        self
    }

    /// The currently active resolution.
    #[must_use]
    pub fn active_resolution(&self) -> &Resolution {
        &self.parts.resolutions[self.active]
    }

    /// All resolutions, in descriptor order.
    #[must_use]
    pub fn resolutions(&self) -> &[Resolution] {
        &self.parts.resolutions
    }

    /// Number of eyes.
    #[must_use]
    pub fn num_eyes(&self) -> usize {
        self.parts.eyes.len()
    }

    /// Number of physical displays the eyes are spread over.
    #[must_use]
    pub fn num_displays(&self) -> usize {
        if self.num_eyes() < 2 {
            return 1;
        }
        if self.display_mode() == DisplayMode::FullScreen {
            2
        } else {
            1
        }
    }

    /// Eyes shown on `display`, in eye order.
    #[must_use]
    pub fn eyes_for_display(&self, display: DisplayId) -> Vec<EyeId> {
        let displays = self.num_displays();
        if display.index() >= displays {
            return Vec::new();
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "eye counts are tiny; descriptors list at most a handful"
        )]
        let eyes = (0..self.num_eyes())
            .filter(|e| displays == 1 || *e == display.index())
            .map(|e| EyeId(e as u32))
            .collect();
        eyes
    }

    /// The display an eye is shown on.
    #[must_use]
    pub fn display_for_eye(&self, eye: EyeId) -> DisplayId {
        if self.num_displays() == 1 {
            DisplayId(0)
        } else {
            DisplayId(eye.0)
        }
    }

    /// Layout of the active resolution.
    #[must_use]
    pub fn display_mode(&self) -> DisplayMode {
        self.active_resolution().display_mode
    }

    /// Width in pixels of one display at the active resolution.
    #[must_use]
    pub fn display_width(&self) -> u32 {
        self.active_resolution().width
    }

    /// Height in pixels of one display at the active resolution.
    #[must_use]
    pub fn display_height(&self) -> u32 {
        self.active_resolution().height
    }

    /// Top edge of the display; always 0.
    #[must_use]
    pub fn display_top(&self) -> u32 {
        0
    }

    /// Left edge of the display; always 0.
    #[must_use]
    pub fn display_left(&self) -> u32 {
        0
    }

    /// Whether left and right images are swapped on the panel.
    #[must_use]
    pub fn swap_eyes(&self) -> bool {
        self.parts.swap_eyes
    }

    /// Monocular horizontal field of view in degrees.
    #[must_use]
    pub fn horizontal_fov(&self) -> f64 {
        self.parts.monocular_horizontal_fov
    }

    /// Monocular vertical field of view in degrees.
    #[must_use]
    pub fn vertical_fov(&self) -> f64 {
        self.parts.monocular_vertical_fov
    }

    /// Monocular horizontal field of view in radians.
    #[must_use]
    pub fn horizontal_fov_radians(&self) -> f64 {
        self.parts.monocular_horizontal_fov.to_radians()
    }

    /// Monocular vertical field of view in radians.
    #[must_use]
    pub fn vertical_fov_radians(&self) -> f64 {
        self.parts.monocular_vertical_fov.to_radians()
    }

    /// Binocular overlap as a fraction.
    #[must_use]
    pub fn overlap(&self) -> f64 {
        self.parts.overlap
    }

    /// Pitch tilt in degrees.
    #[must_use]
    pub fn pitch_tilt(&self) -> f64 {
        self.parts.pitch_tilt
    }

    /// Lens distortion model.
    #[must_use]
    pub fn distortion(&self) -> &DistortionModel {
        &self.parts.distortion
    }

    /// The `distortion.type` string as written in the descriptor.
    #[must_use]
    pub fn distortion_type_string(&self) -> &str {
        &self.parts.distortion_type
    }

    /// Per-eye info, in eye order.
    #[must_use]
    pub fn eyes(&self) -> &[EyeInfo] {
        &self.parts.eyes
    }

    /// Info for one eye.
    #[must_use]
    pub fn eye(&self, eye: EyeId) -> Option<&EyeInfo> {
        self.parts.eyes.get(eye.index())
    }

    /// Headset identification.
    #[must_use]
    pub fn device(&self) -> &DeviceInfo {
        &self.parts.device
    }

    /// Left eye roll in degrees.
    #[must_use]
    pub fn left_roll(&self) -> f64 {
        self.parts.left_roll
    }

    /// Right eye roll in degrees.
    #[must_use]
    pub fn right_roll(&self) -> f64 {
        self.parts.right_roll
    }

    /// Roll for `eye`: eye 0 is the left eye, every other eye uses the right
    /// eye's roll.
    #[must_use]
    pub fn roll_for(&self, eye: EyeId) -> f64 {
        if eye.0 == 0 {
            self.parts.left_roll
        } else {
            self.parts.right_roll
        }
    }
}

impl fmt::Display for DisplayConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let res = self.active_resolution();
        writeln!(f, "Monocular horizontal FOV: {} deg", self.horizontal_fov())?;
        writeln!(f, "Monocular vertical FOV: {} deg", self.vertical_fov())?;
        writeln!(f, "Overlap: {}%", self.overlap() * 100.0)?;
        writeln!(f, "Pitch tilt: {} deg", self.pitch_tilt())?;
        writeln!(f, "Resolution: {} x {}", res.width, res.height)?;
        writeln!(f, "Video inputs: {}", res.video_inputs)?;
        writeln!(f, "Display mode: {}", res.display_mode.as_str())?;
        writeln!(f, "Distortion: {}", self.distortion().kind())?;
        writeln!(f, "Right roll: {}", self.right_roll())?;
        writeln!(f, "Left roll: {}", self.left_roll())?;
        write!(f, "Number of eyes: {}", self.num_eyes())?;
        for (i, eye) in self.eyes().iter().enumerate() {
            write!(
                f,
                "\nEye {i}: center of projection ({}, {}), rotate 180: {}",
                eye.center_proj_x, eye.center_proj_y, eye.rotate_180
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn two_eye_parts(resolutions: Vec<Resolution>) -> DisplayParts {
        DisplayParts {
            resolutions,
            eyes: vec![EyeInfo::default(), EyeInfo::default()],
            ..DisplayParts::default()
        }
    }

    #[test]
    fn empty_resolutions_rejected() {
        let parts = two_eye_parts(Vec::new());
        assert_eq!(
            DisplayConfiguration::new(parts),
            Err(ModelError::NoResolutions)
        );
    }

    #[test]
    fn side_by_side_is_one_display() {
        let cfg = DisplayConfiguration::new(two_eye_parts(vec![Resolution::new(1920, 1080, 1)]))
            .unwrap();
        assert_eq!(cfg.num_displays(), 1);
        assert_eq!(cfg.display_mode(), DisplayMode::HorizontalSideBySide);
        assert_eq!(cfg.eyes_for_display(DisplayId(0)), vec![EyeId(0), EyeId(1)]);
        assert!(cfg.eyes_for_display(DisplayId(1)).is_empty());
    }

    #[test]
    fn full_screen_two_eyes_is_two_displays() {
        let cfg = DisplayConfiguration::new(two_eye_parts(vec![Resolution::new(1080, 1200, 2)]))
            .unwrap();
        assert_eq!(cfg.display_mode(), DisplayMode::FullScreen);
        assert_eq!(cfg.num_displays(), 2);
        assert_eq!(cfg.eyes_for_display(DisplayId(1)), vec![EyeId(1)]);
        assert_eq!(cfg.display_for_eye(EyeId(1)), DisplayId(1));
    }

    #[test]
    fn single_eye_is_one_display_even_full_screen() {
        let parts = DisplayParts {
            resolutions: vec![Resolution::new(800, 600, 2)],
            eyes: vec![EyeInfo::default()],
            ..DisplayParts::default()
        };
        let cfg = DisplayConfiguration::new(parts).unwrap();
        assert_eq!(cfg.num_displays(), 1);
    }

    #[test]
    fn active_resolution_by_input_count() {
        let parts = two_eye_parts(vec![
            Resolution::new(1920, 1080, 1),
            Resolution::new(960, 1080, 2),
        ]);
        let cfg = DisplayConfiguration::new(parts).unwrap();
        assert_eq!(cfg.display_width(), 1920);

        let cfg = cfg.with_active_inputs(2);
        assert_eq!(cfg.display_width(), 960);
        assert_eq!(cfg.num_displays(), 2);

        let cfg = cfg.with_active_inputs(3);
        assert_eq!(cfg.display_width(), 1920, "no match falls back to first");
    }

    #[test]
    fn roll_per_eye() {
        let parts = DisplayParts {
            left_roll: 90.0,
            right_roll: -90.0,
            ..two_eye_parts(vec![Resolution::new(1920, 1080, 1)])
        };
        let cfg = DisplayConfiguration::new(parts).unwrap();
        assert_eq!(cfg.roll_for(EyeId(0)), 90.0);
        assert_eq!(cfg.roll_for(EyeId(1)), -90.0);
    }

    #[test]
    fn mode_strings_round_trip() {
        for mode in [
            DisplayMode::HorizontalSideBySide,
            DisplayMode::VerticalSideBySide,
            DisplayMode::FullScreen,
        ] {
            assert_eq!(DisplayMode::from_descriptor(mode.as_str()), Some(mode));
        }
        assert_eq!(DisplayMode::from_descriptor("diagonal"), None);
    }

    #[test]
    fn summary_mentions_mode_and_eyes() {
        let cfg = DisplayConfiguration::new(two_eye_parts(vec![Resolution::new(1920, 1080, 1)]))
            .unwrap();
        let text = cfg.to_string();
        assert!(text.contains("Display mode: horz_side_by_side"));
        assert!(text.contains("Number of eyes: 2"));
        assert!(text.contains("Eye 1: center of projection (0.5, 0.5)"));
    }
}

// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rigid pose: translation plus unit-quaternion rotation.

use crate::transform::Transform3d;

/// Position and orientation of a head or eye in room space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Translation in meters.
    pub translation: [f64; 3],
    /// Rotation as a unit quaternion `[x, y, z, w]`.
    pub rotation: [f64; 4],
}

impl Pose {
    /// No translation, no rotation.
    pub const IDENTITY: Self = Self {
        translation: [0.0; 3],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };

    /// Returns the rigid transform `T * R` for this pose.
    #[must_use]
    pub fn to_transform(&self) -> Transform3d {
        let [x, y, z, w] = self.rotation;
        let [tx, ty, tz] = self.translation;
        Transform3d::from_cols(
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y + z * w),
                2.0 * (x * z - y * w),
                0.0,
            ],
            [
                2.0 * (x * y - z * w),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z + x * w),
                0.0,
            ],
            [
                2.0 * (x * z + y * w),
                2.0 * (y * z - x * w),
                1.0 - 2.0 * (x * x + y * y),
                0.0,
            ],
            [tx, ty, tz, 1.0],
        )
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_pose_is_identity_transform() {
        assert_eq!(Pose::IDENTITY.to_transform(), Transform3d::IDENTITY);
    }

    #[test]
    fn translation_lands_in_last_column() {
        let pose = Pose {
            translation: [0.1, 1.7, -0.3],
            ..Pose::IDENTITY
        };
        assert_eq!(pose.to_transform().col(3), [0.1, 1.7, -0.3, 1.0]);
    }

    #[test]
    fn half_turn_about_y() {
        let pose = Pose {
            translation: [0.0; 3],
            rotation: [0.0, 1.0, 0.0, 0.0],
        };
        let m = pose.to_transform();
        assert_eq!(m.col(0), [-1.0, 0.0, 0.0, 0.0]);
        assert_eq!(m.col(2), [0.0, 0.0, -1.0, 0.0]);
    }
}

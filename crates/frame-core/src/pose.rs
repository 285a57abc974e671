//! Rigid 6-DOF transforms

use std::ops::Mul;

use glam::{DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

/// Pose (position and orientation)
///
/// A pose of `X` declared relative to `Y` maps coordinates expressed in `X`
/// into coordinates expressed in `Y`. Composition reads right to left:
/// `a_from_b * b_from_c == a_from_c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PoseData", into = "PoseData")]
pub struct Pose {
    pub position: DVec3,
    pub rotation: DQuat,
}

/// Authored form: position plus roll, pitch, yaw in radians
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct PoseData {
    #[serde(default)]
    xyz: [f64; 3],
    #[serde(default)]
    rpy: [f64; 3],
}

impl From<Pose> for PoseData {
    fn from(pose: Pose) -> Self {
        Self {
            xyz: pose.xyz(),
            rpy: pose.rpy(),
        }
    }
}

impl From<PoseData> for Pose {
    fn from(data: PoseData) -> Self {
        Pose::from_xyz_rpy(data.xyz, data.rpy)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    pub fn new(position: DVec3, rotation: DQuat) -> Self {
        Self { position, rotation }
    }

    /// Create from position and roll, pitch, yaw in radians
    ///
    /// Angles are applied about the fixed X, Y then Z axes.
    pub fn from_xyz_rpy(xyz: [f64; 3], rpy: [f64; 3]) -> Self {
        Self {
            position: DVec3::from(xyz),
            rotation: DQuat::from_euler(EulerRot::ZYX, rpy[2], rpy[1], rpy[0]),
        }
    }

    pub fn from_position(xyz: [f64; 3]) -> Self {
        Self {
            position: DVec3::from(xyz),
            rotation: DQuat::IDENTITY,
        }
    }

    /// Roll, pitch, yaw in radians
    pub fn rpy(&self) -> [f64; 3] {
        let (yaw, pitch, roll) = self.rotation.to_euler(EulerRot::ZYX);
        [roll, pitch, yaw]
    }

    /// Position as an array
    pub fn xyz(&self) -> [f64; 3] {
        self.position.to_array()
    }

    /// Compose with a pose expressed in this pose's frame
    pub fn compose(&self, child: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * child.position,
            rotation: self.rotation * child.rotation,
        }
    }

    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose {
            position: -(rotation * self.position),
            rotation,
        }
    }

    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.position + self.rotation * point
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Compare within an absolute tolerance (q and -q are the same rotation)
    pub fn approx_eq(&self, other: &Pose, tolerance: f64) -> bool {
        self.position.abs_diff_eq(other.position, tolerance)
            && (self.rotation.abs_diff_eq(other.rotation, tolerance)
                || self.rotation.abs_diff_eq(-other.rotation, tolerance))
    }
}

impl Mul for Pose {
    type Output = Pose;

    fn mul(self, rhs: Pose) -> Pose {
        self.compose(&rhs)
    }
}

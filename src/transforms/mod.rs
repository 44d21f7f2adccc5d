//! Hierarchical kinematic transforms.
//!
//! The [`TransformTree`] caches field-relative poses of articulated
//! components under a movable robot root. Helpers convert between the
//! planar [`Pose2D`](crate::core::types::Pose2D) used by estimation
//! and the 3D isometries used here.

mod tree;

pub use tree::{TransformSource, TransformTree};

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

use crate::core::types::Pose2D;

/// Lift a planar pose into a 3D isometry on the floor plane.
pub fn pose2d_to_isometry(pose: &Pose2D) -> Isometry3<f32> {
    Isometry3::from_parts(
        Translation3::new(pose.x, pose.y, 0.0),
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), pose.theta),
    )
}

/// Project a 3D isometry onto the floor plane (x, y, yaw).
pub fn isometry_to_pose2d(isometry: &Isometry3<f32>) -> Pose2D {
    let translation = isometry.translation;
    let (_, _, yaw) = isometry.rotation.euler_angles();
    Pose2D::new(translation.x, translation.y, yaw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_pose2d_roundtrip() {
        let pose = Pose2D::new(1.5, -2.0, FRAC_PI_2);
        let back = isometry_to_pose2d(&pose2d_to_isometry(&pose));
        assert_relative_eq!(back.x, pose.x, epsilon = 1e-6);
        assert_relative_eq!(back.y, pose.y, epsilon = 1e-6);
        assert_relative_eq!(back.theta, pose.theta, epsilon = 1e-6);
    }

    #[test]
    fn test_lift_is_planar() {
        let iso = pose2d_to_isometry(&Pose2D::new(3.0, 4.0, 0.3));
        assert_relative_eq!(iso.translation.z, 0.0);
        let (roll, pitch, _) = iso.rotation.euler_angles();
        assert_relative_eq!(roll, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pitch, 0.0, epsilon = 1e-6);
    }
}

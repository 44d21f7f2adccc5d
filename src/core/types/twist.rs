//! Instantaneous relative motion.

use serde::{Deserialize, Serialize};

/// Relative motion over one control period.
///
/// `dx`/`dy` are local-frame displacements in meters, `dtheta` the
/// heading change in radians. A pose advances by a twist through
/// [`Pose2D::exp`](super::Pose2D::exp), which treats the three
/// components as a constant-curvature arc rather than a straight
/// offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Twist2D {
    /// Forward displacement in meters
    pub dx: f32,
    /// Leftward displacement in meters
    pub dy: f32,
    /// Heading change in radians
    pub dtheta: f32,
}

impl Twist2D {
    /// Create a new twist.
    #[inline]
    pub fn new(dx: f32, dy: f32, dtheta: f32) -> Self {
        Self { dx, dy, dtheta }
    }

    /// Same translation with a different heading change.
    ///
    /// Used when an absolute gyro heading overrides the wheel-derived
    /// rotation component.
    #[inline]
    pub fn with_dtheta(&self, dtheta: f32) -> Self {
        Self {
            dx: self.dx,
            dy: self.dy,
            dtheta,
        }
    }
}

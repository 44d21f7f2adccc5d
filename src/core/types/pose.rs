//! Planar pose and point types.

use serde::{Deserialize, Serialize};

use super::Twist2D;

/// A 2D point in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate in meters
    pub x: f32,
    /// Y coordinate in meters
    pub y: f32,
}

impl Point2D {
    /// Create a new point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point (avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, other: &Point2D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point2D) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

impl Default for Point2D {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// Field-relative robot pose in 2D.
///
/// Position (x, y) in meters and heading (theta) in radians, theta
/// normalized to (-π, π]. The same type doubles as a relative
/// transform: [`compose`](Self::compose) chains transforms and
/// [`delta_to`](Self::delta_to) recovers the transform between two
/// poses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters
    pub x: f32,
    /// Y position in meters
    pub y: f32,
    /// Heading in radians, normalized to (-π, π]
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose with theta normalized to (-π, π].
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: crate::core::math::normalize_angle(theta),
        }
    }

    /// Identity pose at origin with zero heading.
    #[inline]
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Planar position of this pose.
    #[inline]
    pub fn translation(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Compose two poses: self ⊕ other
    ///
    /// Applies `other` as a transform in `self`'s frame.
    /// ```text
    /// C = A ⊕ B:
    ///   C.x = A.x + B.x * cos(A.θ) - B.y * sin(A.θ)
    ///   C.y = A.y + B.x * sin(A.θ) + B.y * cos(A.θ)
    ///   C.θ = normalize(A.θ + B.θ)
    /// ```
    #[inline]
    pub fn compose(&self, other: &Pose2D) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            self.x + other.x * cos_t - other.y * sin_t,
            self.y + other.x * sin_t + other.y * cos_t,
            self.theta + other.theta,
        )
    }

    /// Inverse of this pose.
    ///
    /// Returns the transform that undoes this pose.
    #[inline]
    pub fn inverse(&self) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            -self.x * cos_t - self.y * sin_t,
            self.x * sin_t - self.y * cos_t,
            -self.theta,
        )
    }

    /// Relative transform from this pose to `other`: self ⊖ other.
    ///
    /// The result, composed onto `self`, yields `other`. Its x/y are
    /// expressed in `self`'s frame.
    #[inline]
    pub fn delta_to(&self, other: &Pose2D) -> Pose2D {
        self.inverse().compose(other)
    }

    /// Advance this pose along the constant-curvature arc described by
    /// a twist (pose exponential map).
    ///
    /// A twist with zero `dtheta` is a straight-line displacement in
    /// the local frame; a nonzero `dtheta` bends the displacement into
    /// an arc so that integrating many small twists matches the true
    /// ground path.
    pub fn exp(&self, twist: &Twist2D) -> Pose2D {
        let dtheta = twist.dtheta;
        let (sin_t, cos_t) = dtheta.sin_cos();

        // Second-order series near zero rotation avoids 0/0.
        let (s, c) = if dtheta.abs() < 1e-6 {
            (1.0 - dtheta * dtheta / 6.0, dtheta / 2.0)
        } else {
            (sin_t / dtheta, (1.0 - cos_t) / dtheta)
        };

        let delta = Pose2D::new(
            twist.dx * s - twist.dy * c,
            twist.dx * c + twist.dy * s,
            dtheta,
        );
        self.compose(&delta)
    }

    /// Transform a point from this pose's local frame to the global frame.
    #[inline]
    pub fn transform_point(&self, point: &Point2D) -> Point2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Point2D::new(
            self.x + point.x * cos_t - point.y * sin_t,
            self.y + point.x * sin_t + point.y * cos_t,
        )
    }

    /// Transform a point from the global frame into this pose's local frame.
    #[inline]
    pub fn inverse_transform_point(&self, point: &Point2D) -> Point2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        let dx = point.x - self.x;
        let dy = point.y - self.y;
        Point2D::new(dx * cos_t + dy * sin_t, -dx * sin_t + dy * cos_t)
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::identity()
    }
}

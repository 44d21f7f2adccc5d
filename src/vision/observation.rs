//! Vision observation types.

use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};

use crate::core::types::Pose2D;

/// One multi-landmark pose solve from a camera, in the field frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPoseObservation {
    /// Capture timestamp in microseconds
    pub timestamp_us: u64,
    /// Solved camera pose in the field frame
    pub camera_in_field: Isometry3<f32>,
    /// Solver ambiguity score; high values mean the solve may be a
    /// mirror solution
    pub ambiguity: f32,
    /// Number of landmarks contributing to the solve
    pub landmark_count: u32,
    /// Average range to the contributing landmarks in meters
    pub avg_range: f32,
}

/// Bearing-only sighting of one known landmark.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LandmarkSighting {
    /// Capture timestamp in microseconds
    pub timestamp_us: u64,
    /// Landmark identifier for the field-pose lookup
    pub landmark_id: u32,
    /// Horizontal bearing from the camera axis in radians
    pub bearing: f32,
    /// Vertical elevation from the camera axis in radians
    pub elevation: f32,
    /// Straight-line range to the landmark in meters
    pub range: f32,
}

/// A filtered, weighted pose measurement ready for fusion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VisionObservation {
    /// Capture timestamp in microseconds
    pub timestamp_us: u64,
    /// Measured robot pose in the field frame
    pub pose: Pose2D,
    /// Per-axis measurement standard deviations [x, y, theta].
    ///
    /// `f32::INFINITY` marks an axis carrying no information.
    pub std_devs: [f32; 3],
}

//! Vision filtering and camera-mount configuration.

use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};

/// One camera's identity and static mount transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Camera name for diagnostics
    pub name: String,
    /// Camera pose in the robot frame (mount calibration)
    pub mount: Isometry3<f32>,
}

/// Filtering thresholds and noise model coefficients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Observations above this ambiguity are dropped outright.
    pub max_ambiguity: f32,

    /// Playing area length (x extent) in meters.
    pub field_length: f32,

    /// Playing area width (y extent) in meters.
    pub field_width: f32,

    /// Margin beyond the field bounds still accepted, in meters.
    ///
    /// Absorbs mount calibration error near the walls.
    pub border_margin: f32,

    /// Accepted |z| band for the reconstructed robot pose, in meters.
    ///
    /// A ground robot floating or buried is a reflection/multipath
    /// artifact.
    pub z_band: f32,

    /// XY std-dev per meter² of average range per landmark.
    pub xy_stddev_coeff: f32,

    /// Heading std-dev per meter² of average range per landmark.
    ///
    /// Only applied for multi-landmark solves; a single landmark
    /// yields no usable heading.
    pub theta_stddev_coeff: f32,

    /// XY std-dev per meter² of range for single-landmark poses.
    ///
    /// Deliberately looser than `xy_stddev_coeff`; this path is a
    /// fallback.
    pub single_landmark_stddev_coeff: f32,

    /// Single-landmark sightings beyond this range are ignored.
    pub max_single_landmark_range: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            max_ambiguity: 0.4,
            // FRC field footprint.
            field_length: 17.548,
            field_width: 8.052,
            border_margin: 0.5,
            z_band: 0.5,
            xy_stddev_coeff: 0.005,
            theta_stddev_coeff: 0.01,
            single_landmark_stddev_coeff: 0.05,
            max_single_landmark_range: 2.0,
        }
    }
}

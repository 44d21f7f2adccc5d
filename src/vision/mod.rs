//! Landmark-vision observation filtering and pose reconstruction.
//!
//! Raw solver output (multi-landmark camera poses and bearing-only
//! single-landmark sightings) is filtered, transformed into the robot
//! frame, given a distance/count noise model, and handed to the
//! [`PoseEstimator`](crate::estimation::PoseEstimator) as weighted
//! observations.

mod config;
mod observation;
mod pipeline;

pub use config::{CameraConfig, VisionConfig};
pub use observation::{LandmarkSighting, RawPoseObservation, VisionObservation};
pub use pipeline::{LandmarkMap, VisionPipeline, VisionStats};

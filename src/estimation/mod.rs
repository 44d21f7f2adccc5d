//! Odometry integration and vision fusion.

mod pose_estimator;

pub use pose_estimator::{EstimatorConfig, PoseEstimator, ProcessNoise, DEFAULT_POSE_HISTORY_US};

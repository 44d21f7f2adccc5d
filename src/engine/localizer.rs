//! Per-tick localization orchestration.
//!
//! [`Localizer`] is the single owned context tying the layers together:
//! the pose estimator, the per-camera vision pipeline, the transform
//! tree, and the camera/landmark configuration. Callers hand it one
//! [`TickInput`] per control period and read poses back; nothing in
//! this crate reaches for shared or global state.

use log::debug;
use nalgebra::Isometry3;
use serde::Serialize;

use crate::core::types::{Pose2D, Twist2D};
use crate::error::ConfigError;
use crate::estimation::{EstimatorConfig, PoseEstimator};
use crate::transforms::{pose2d_to_isometry, TransformSource, TransformTree};
use crate::vision::{
    CameraConfig, LandmarkMap, LandmarkSighting, RawPoseObservation, VisionConfig, VisionPipeline,
    VisionStats,
};

/// One odometry reading for a tick.
#[derive(Debug, Clone, Copy)]
pub struct OdometryInput {
    /// Capture time in microseconds
    pub timestamp_us: u64,
    /// Local-frame motion since the previous tick
    pub twist: Twist2D,
    /// Absolute gyro yaw in radians, when the gyro is healthy
    pub yaw: Option<f32>,
}

/// One camera's output for a tick.
#[derive(Debug, Clone, Default)]
pub struct CameraFrame {
    /// Index into the configured camera list
    pub camera: usize,
    /// Multi-landmark pose solves
    pub poses: Vec<RawPoseObservation>,
    /// Single-landmark bearing/elevation/range sightings
    pub sightings: Vec<LandmarkSighting>,
}

/// Everything observed since the previous tick.
///
/// Every field is optional in effect: missing data is a no-op, never
/// an error.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Odometry reading, if the drivetrain reported one
    pub odometry: Option<OdometryInput>,
    /// Camera outputs, possibly empty
    pub vision: Vec<CameraFrame>,
}

/// Counters surfaced for diagnostics display.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Diagnostics {
    /// Vision observations the estimator dropped (no usable history)
    pub rejected_observations: u64,
    /// Vision pipeline counters
    pub vision: VisionStats,
}

/// Configuration for [`Localizer`].
pub struct LocalizerConfig {
    /// Pose estimator configuration
    pub estimator: EstimatorConfig,
    /// Vision filtering configuration
    pub vision: VisionConfig,
    /// Cameras, indexed by [`CameraFrame::camera`]
    pub cameras: Vec<CameraConfig>,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorConfig::default(),
            vision: VisionConfig::default(),
            cameras: Vec::new(),
        }
    }
}

/// Field-relative localization context.
pub struct Localizer {
    estimator: PoseEstimator,
    pipeline: VisionPipeline,
    tree: TransformTree,
    cameras: Vec<CameraConfig>,
    landmarks: Box<dyn LandmarkMap>,
}

impl Localizer {
    /// Build a localizer from configuration and a landmark map.
    ///
    /// Fails on a zero history retention or a duplicate camera name;
    /// both are construction-time mistakes, not runtime conditions.
    pub fn new(
        config: LocalizerConfig,
        landmarks: Box<dyn LandmarkMap>,
    ) -> Result<Self, ConfigError> {
        for (i, camera) in config.cameras.iter().enumerate() {
            if config.cameras[..i].iter().any(|other| other.name == camera.name) {
                return Err(ConfigError::DuplicateCamera(camera.name.clone()));
            }
        }

        Ok(Self {
            estimator: PoseEstimator::new(config.estimator)?,
            pipeline: VisionPipeline::new(config.vision),
            tree: TransformTree::new(),
            cameras: config.cameras,
            landmarks,
        })
    }

    /// Run one control tick.
    ///
    /// Ordering is fixed: odometry integration, then vision
    /// correction, then the transform-tree update. Every tree pose
    /// read after `tick` reflects this tick's fused estimate.
    pub fn tick(&mut self, input: &TickInput) {
        self.pipeline.begin_tick();

        if let Some(odometry) = &input.odometry {
            self.estimator
                .integrate_with_yaw(&odometry.twist, odometry.yaw, odometry.timestamp_us);
        }

        for frame in &input.vision {
            let Some(camera) = self.cameras.get(frame.camera) else {
                debug!("frame for unconfigured camera index {}", frame.camera);
                continue;
            };
            self.pipeline.process(
                camera,
                &frame.poses,
                &frame.sightings,
                self.landmarks.as_ref(),
                &mut self.estimator,
            );
        }

        self.tree
            .update(pose2d_to_isometry(&self.estimator.estimated_pose()));
    }

    /// Register a robot component under a slash-separated path.
    pub fn register_component(&mut self, path: &str, source: TransformSource) {
        self.tree.register(path, source);
    }

    /// Register a fixed robot component transform.
    pub fn register_constant_component(&mut self, path: &str, transform: Isometry3<f32>) {
        self.tree.register_constant(path, transform);
    }

    /// Fused field-relative pose.
    pub fn estimated_pose(&self) -> Pose2D {
        self.estimator.estimated_pose()
    }

    /// Pure-odometry pose, for drift comparison.
    pub fn wheeled_pose(&self) -> Pose2D {
        self.estimator.wheeled_pose()
    }

    /// Field pose of a registered component, as of the last tick.
    pub fn component_pose(&self, path: &str) -> Option<Isometry3<f32>> {
        self.tree.pose(path)
    }

    /// The transform tree, for snapshot/display consumers.
    pub fn transform_tree(&self) -> &TransformTree {
        &self.tree
    }

    /// Poses the vision sanity filter rejected this tick.
    pub fn rejected_vision_poses(&self) -> &[Isometry3<f32>] {
        self.pipeline.rejected_poses()
    }

    /// Cumulative drop/fuse counters.
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            rejected_observations: self.estimator.rejected_observations(),
            vision: self.pipeline.stats(),
        }
    }

    /// Place the robot at a known pose, clearing fusion history.
    pub fn set_known_pose(&mut self, pose: Pose2D) {
        self.estimator.set_known_pose(pose);
    }
}

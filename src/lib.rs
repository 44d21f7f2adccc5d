//! KshetraPose - Field-relative localization for mobile competition robots
//!
//! # Architecture
//!
//! The crate is organized into 5 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    engine/                          │  ← Orchestration
//! │           (localizer, tick sequencing)              │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │              estimation/  vision/                   │  ← Fusion
//! │    (pose estimator, camera filtering, landmarks)    │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │             transforms/  tracking/                  │  ← Spatial services
//! │        (component tree, object tracking)            │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │           (types, math, polygon, history)           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Tick model
//!
//! Everything is single-threaded and pull-based: one [`Localizer`] is
//! ticked at the control rate with whatever arrived since the previous
//! tick, and each tick runs odometry integration, vision correction,
//! and the transform-tree update in that fixed order. Missing data is
//! a no-op; implausible data is dropped and counted. Nothing in the
//! steady-state path panics or returns an error.
//!
//! # Latency compensation
//!
//! Camera measurements describe where the robot *was* tens of
//! milliseconds ago. The estimator keeps a rolling history of wheeled
//! odometry snapshots, rewinds the estimate to each observation's
//! capture time, applies a variance-weighted correction there, and
//! replays the motion recorded since. See [`estimation`] for the
//! details.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Spatial services (depends on core)
// ============================================================================
pub mod tracking;
pub mod transforms;

// ============================================================================
// Layer 3: Fusion (depends on core, transforms)
// ============================================================================
pub mod estimation;
pub mod vision;

// ============================================================================
// Layer 4: Orchestration (depends on all layers)
// ============================================================================
pub mod engine;

pub mod error;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::math;
pub use crate::core::polygon::Polygon;
pub use crate::core::types::{HistoryBuffer, Point2D, Pose2D, Twist2D};

// Errors
pub use error::ConfigError;

// Spatial services
pub use tracking::{ObjectTracker, DEFAULT_OBJECT_HISTORY_US};
pub use transforms::{isometry_to_pose2d, pose2d_to_isometry, TransformSource, TransformTree};

// Estimation
pub use estimation::{
    EstimatorConfig, PoseEstimator, ProcessNoise, DEFAULT_POSE_HISTORY_US,
};

// Vision
pub use vision::{
    CameraConfig, LandmarkMap, LandmarkSighting, RawPoseObservation, VisionConfig,
    VisionObservation, VisionPipeline, VisionStats,
};

// Engine
pub use engine::{CameraFrame, Diagnostics, Localizer, LocalizerConfig, OdometryInput, TickInput};

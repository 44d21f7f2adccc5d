//! Dual-chain pose estimation with latency-compensated vision fusion.
//!
//! # Problem
//!
//! Wheel/gyro odometry arrives every tick and drifts; vision pose
//! measurements are accurate but sparse and carry tens of milliseconds
//! of latency. Fusing a late measurement against the *current* pose
//! would smear the correction over motion that happened after the
//! image was captured.
//!
//! # Solution
//!
//! Two pose chains:
//! - `wheeled_pose`: pure odometry, monotonic, never corrected.
//! - `estimated_pose`: odometry plus vision corrections.
//!
//! Every wheeled snapshot goes into a [`HistoryBuffer`] keyed on its
//! timestamp. A vision correction rewinds the estimate to the
//! observation's timestamp (by undoing the odometry motion recorded
//! since), applies a variance-weighted fraction of the residual there,
//! and replays the post-observation motion on top.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::types::{HistoryBuffer, Pose2D, Twist2D};
use crate::error::ConfigError;
use crate::vision::VisionObservation;

/// Default wheeled-pose history retention: 2 s in microseconds.
pub const DEFAULT_POSE_HISTORY_US: u64 = 2_000_000;

/// Per-axis process noise standard deviations for wheeled odometry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProcessNoise {
    /// X standard deviation in meters per tick
    pub x: f32,
    /// Y standard deviation in meters per tick
    pub y: f32,
    /// Heading standard deviation in radians per tick
    pub theta: f32,
}

impl Default for ProcessNoise {
    fn default() -> Self {
        // Measured wheeled drift on carpet; tune per drivetrain.
        Self {
            x: 0.003,
            y: 0.003,
            theta: 0.0002,
        }
    }
}

/// Configuration for [`PoseEstimator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Odometry process noise (std-devs; variances are derived).
    pub process_noise: ProcessNoise,

    /// Wheeled-pose history retention in microseconds.
    ///
    /// Bounds how stale a vision observation may be and still be
    /// fused.
    pub history_retention_us: u64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            process_noise: ProcessNoise::default(),
            history_retention_us: DEFAULT_POSE_HISTORY_US,
        }
    }
}

/// Field-relative pose estimator fusing odometry and vision.
#[derive(Debug)]
pub struct PoseEstimator {
    /// Process noise variances [x, y, theta] (std-dev squared).
    q: [f32; 3],
    wheeled_pose: Pose2D,
    estimated_pose: Pose2D,
    history: HistoryBuffer<Pose2D>,
    last_gyro_yaw: Option<f32>,
    rejected_observations: u64,
}

impl PoseEstimator {
    /// Build an estimator from configuration.
    pub fn new(config: EstimatorConfig) -> Result<Self, ConfigError> {
        let noise = config.process_noise;
        Ok(Self {
            q: [
                noise.x * noise.x,
                noise.y * noise.y,
                noise.theta * noise.theta,
            ],
            wheeled_pose: Pose2D::identity(),
            estimated_pose: Pose2D::identity(),
            history: HistoryBuffer::new(config.history_retention_us)?,
            last_gyro_yaw: None,
            rejected_observations: 0,
        })
    }

    /// Pure-odometry pose, never touched by vision.
    pub fn wheeled_pose(&self) -> Pose2D {
        self.wheeled_pose
    }

    /// Fused pose estimate.
    pub fn estimated_pose(&self) -> Pose2D {
        self.estimated_pose
    }

    /// Vision observations dropped for missing/out-of-window history.
    pub fn rejected_observations(&self) -> u64 {
        self.rejected_observations
    }

    /// Advance both pose chains by one odometry twist.
    ///
    /// The wheeled snapshot is recorded into the history buffer at
    /// `timestamp_us` for later latency compensation.
    pub fn integrate(&mut self, twist: &Twist2D, timestamp_us: u64) {
        self.wheeled_pose = self.wheeled_pose.exp(twist);
        self.estimated_pose = self.estimated_pose.exp(twist);
        self.history.add(self.wheeled_pose, timestamp_us);
    }

    /// Integrate a twist, overriding its rotation with an absolute
    /// gyro heading when one is available.
    ///
    /// Wheel-derived rotation accumulates scrub error; when the gyro
    /// reports an absolute yaw the twist's `dtheta` is replaced by the
    /// yaw delta since the previous reading. The first reading only
    /// seeds the reference.
    pub fn integrate_with_yaw(&mut self, twist: &Twist2D, yaw: Option<f32>, timestamp_us: u64) {
        let twist = match yaw {
            Some(yaw) => {
                let twist = match self.last_gyro_yaw {
                    Some(last) => twist.with_dtheta(crate::core::math::angle_diff(last, yaw)),
                    None => *twist,
                };
                self.last_gyro_yaw = Some(yaw);
                twist
            }
            None => *twist,
        };
        self.integrate(&twist, timestamp_us);
    }

    /// Fuse one vision observation.
    ///
    /// Rejected entirely (counted, no state change) when the history
    /// buffer is empty or the observation is older than the retained
    /// window. Otherwise:
    ///
    /// 1. Rewind: undo the odometry motion recorded since the
    ///    observation's timestamp to get the estimate as of capture.
    /// 2. Weigh: per-axis residual scaled by `k = q / (q + √(q·r))`
    ///    with `r` the measurement variance; an infinite std-dev
    ///    yields `k = 0` exactly, contributing nothing on that axis.
    /// 3. Replay: re-apply the post-observation odometry motion, so a
    ///    stale measurement never discards newer movement.
    pub fn correct(&mut self, observation: &VisionObservation) {
        let Some(newest) = self.history.newest_timestamp() else {
            self.rejected_observations += 1;
            debug!("vision observation dropped: empty pose history");
            return;
        };
        if newest.saturating_sub(self.history.retention_us()) > observation.timestamp_us {
            self.rejected_observations += 1;
            debug!(
                "vision observation dropped: {}us older than retained window",
                newest - observation.timestamp_us
            );
            return;
        }

        // Floor sample: the wheeled snapshot at or before capture.
        let Some(&snapshot) = self.history.sample(observation.timestamp_us, false) else {
            self.rejected_observations += 1;
            return;
        };

        let now_to_old = self.wheeled_pose.delta_to(&snapshot);
        let old_to_now = snapshot.delta_to(&self.wheeled_pose);
        let old_estimate = self.estimated_pose.compose(&now_to_old);

        let residual = old_estimate.delta_to(&observation.pose);
        let scaled = Pose2D::new(
            self.gain(0, observation.std_devs[0]) * residual.x,
            self.gain(1, observation.std_devs[1]) * residual.y,
            self.gain(2, observation.std_devs[2]) * residual.theta,
        );

        self.estimated_pose = old_estimate.compose(&scaled).compose(&old_to_now);
    }

    /// Fixed-point Kalman-style gain for one axis.
    fn gain(&self, axis: usize, std_dev: f32) -> f32 {
        let q = self.q[axis];
        if q == 0.0 || std_dev.is_infinite() {
            return 0.0;
        }
        let r = std_dev * std_dev;
        q / (q + (q * r).sqrt())
    }

    /// Wheeled snapshot at a past timestamp, for latency-compensating
    /// derived measurements outside this estimator.
    pub fn wheeled_pose_at(&self, timestamp_us: u64) -> Option<Pose2D> {
        self.history.sample(timestamp_us, false).copied()
    }

    /// Heading of the estimate rewound to a past timestamp.
    ///
    /// Used by bearing-only reconstruction, which must trust the
    /// odometry heading as of the sighting's capture time.
    pub fn rotation_at(&self, timestamp_us: u64) -> Option<f32> {
        let snapshot = self.wheeled_pose_at(timestamp_us)?;
        let rewound = self
            .estimated_pose
            .compose(&self.wheeled_pose.delta_to(&snapshot));
        Some(rewound.theta)
    }

    /// Reset both chains to a known pose and clear history.
    ///
    /// Used only for explicit placement (e.g. start of match); never
    /// called automatically.
    pub fn set_known_pose(&mut self, pose: Pose2D) {
        self.wheeled_pose = pose;
        self.estimated_pose = pose;
        self.history.clear();
        self.last_gyro_yaw = None;
    }
}

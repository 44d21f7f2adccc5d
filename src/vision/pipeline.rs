//! Per-camera observation filtering and fusion feeding.

use std::collections::{BTreeMap, HashMap};
use std::f32::consts::PI;

use log::debug;
use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use serde::Serialize;

use crate::core::math::normalize_angle;
use crate::core::types::Pose2D;
use crate::estimation::PoseEstimator;
use crate::vision::{CameraConfig, LandmarkSighting, RawPoseObservation, VisionConfig, VisionObservation};

/// Read-only lookup of landmark field poses.
///
/// Supplied by a static field-geometry collaborator; unknown ids are
/// simply absent.
pub trait LandmarkMap {
    /// Field pose of the landmark with this id, if known.
    fn landmark_pose(&self, id: u32) -> Option<Isometry3<f32>>;
}

impl LandmarkMap for HashMap<u32, Isometry3<f32>> {
    fn landmark_pose(&self, id: u32) -> Option<Isometry3<f32>> {
        self.get(&id).copied()
    }
}

/// Cumulative pipeline counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct VisionStats {
    /// Observations handed to the estimator
    pub fused: u64,
    /// Observations dropped for excessive ambiguity
    pub rejected_ambiguity: u64,
    /// Observations dropped by the field-bounds sanity filter
    pub rejected_out_of_field: u64,
    /// Single-landmark sightings skipped (unknown id, over range, or
    /// no history to rewind against)
    pub skipped_sightings: u64,
}

/// Filters raw camera output and feeds the pose estimator.
///
/// Two paths per camera per tick:
/// - Multi-landmark pose solves: ambiguity filter, mount transform to
///   the robot frame, field-bounds sanity filter, distance/count noise
///   model, then fusion in timestamp order.
/// - Single-landmark bearing/elevation/range sightings: deduplicated
///   newest-wins per landmark, reconstructed into a candidate robot
///   pose using the odometry heading rewound to capture time, fused as
///   a low-confidence observation with no heading information.
pub struct VisionPipeline {
    config: VisionConfig,
    stats: VisionStats,
    rejected_poses: Vec<Isometry3<f32>>,
}

impl VisionPipeline {
    /// Build a pipeline from filtering configuration.
    pub fn new(config: VisionConfig) -> Self {
        Self {
            config,
            stats: VisionStats::default(),
            rejected_poses: Vec::new(),
        }
    }

    /// Cumulative counters.
    pub fn stats(&self) -> VisionStats {
        self.stats
    }

    /// Poses rejected by the sanity filter since the last
    /// [`begin_tick`](Self::begin_tick), for diagnostics display.
    pub fn rejected_poses(&self) -> &[Isometry3<f32>] {
        &self.rejected_poses
    }

    /// Clear per-tick diagnostic state. Called once per control tick.
    pub fn begin_tick(&mut self) {
        self.rejected_poses.clear();
    }

    /// Process one camera's batch for this tick.
    pub fn process(
        &mut self,
        camera: &CameraConfig,
        poses: &[RawPoseObservation],
        sightings: &[LandmarkSighting],
        landmarks: &dyn LandmarkMap,
        estimator: &mut PoseEstimator,
    ) {
        let mut accepted = Vec::new();
        let mount_inverse = camera.mount.inverse();

        for observation in poses {
            if observation.ambiguity > self.config.max_ambiguity {
                self.stats.rejected_ambiguity += 1;
                continue;
            }

            let robot_in_field = observation.camera_in_field * mount_inverse;
            if !self.within_field(&robot_in_field) {
                debug!(
                    "{}: pose outside field bounds, rejected",
                    camera.name
                );
                self.rejected_poses.push(robot_in_field);
                self.stats.rejected_out_of_field += 1;
                continue;
            }

            accepted.push(self.weigh(observation, &robot_in_field));
        }

        // Fusing out of order would rewind against the wrong snapshot.
        accepted.sort_by_key(|observation| observation.timestamp_us);
        for observation in &accepted {
            estimator.correct(observation);
            self.stats.fused += 1;
        }

        // Newest sighting wins per landmark id.
        let mut latest: BTreeMap<u32, &LandmarkSighting> = BTreeMap::new();
        for sighting in sightings {
            latest
                .entry(sighting.landmark_id)
                .and_modify(|current| {
                    if sighting.timestamp_us > current.timestamp_us {
                        *current = sighting;
                    }
                })
                .or_insert(sighting);
        }

        for sighting in latest.into_values() {
            match self.reconstruct_single_landmark(camera, sighting, landmarks, estimator) {
                Some(observation) => {
                    estimator.correct(&observation);
                    self.stats.fused += 1;
                }
                None => self.stats.skipped_sightings += 1,
            }
        }
    }

    fn within_field(&self, robot_in_field: &Isometry3<f32>) -> bool {
        let margin = self.config.border_margin;
        let translation = robot_in_field.translation;
        translation.x >= -margin
            && translation.x <= self.config.field_length + margin
            && translation.y >= -margin
            && translation.y <= self.config.field_width + margin
            && translation.z.abs() <= self.config.z_band
    }

    /// Attach the distance/count noise model.
    ///
    /// A single landmark cannot disambiguate heading, so its theta
    /// std-dev is infinite and the heading axis contributes nothing.
    fn weigh(
        &self,
        observation: &RawPoseObservation,
        robot_in_field: &Isometry3<f32>,
    ) -> VisionObservation {
        let count = observation.landmark_count.max(1) as f32;
        let range_sq = observation.avg_range * observation.avg_range;
        let xy = self.config.xy_stddev_coeff * range_sq / count;
        let theta = if observation.landmark_count > 1 {
            self.config.theta_stddev_coeff * range_sq / count
        } else {
            f32::INFINITY
        };

        VisionObservation {
            timestamp_us: observation.timestamp_us,
            pose: crate::transforms::isometry_to_pose2d(robot_in_field),
            std_devs: [xy, xy, theta],
        }
    }

    /// Back out a candidate robot pose from one bearing-only sighting.
    ///
    /// The sighting fixes the camera on a circle around the landmark;
    /// the odometry heading rewound to capture time picks the point on
    /// it. Returns `None` when the sighting is over range, the
    /// landmark id is unknown, or no history exists to rewind against.
    fn reconstruct_single_landmark(
        &self,
        camera: &CameraConfig,
        sighting: &LandmarkSighting,
        landmarks: &dyn LandmarkMap,
        estimator: &PoseEstimator,
    ) -> Option<VisionObservation> {
        if sighting.range > self.config.max_single_landmark_range {
            return None;
        }
        let Some(landmark) = landmarks.landmark_pose(sighting.landmark_id) else {
            debug!("no landmark with id {}", sighting.landmark_id);
            return None;
        };
        let robot_yaw = estimator.rotation_at(sighting.timestamp_us)?;

        let (_, mount_pitch, mount_yaw) = camera.mount.rotation.euler_angles();

        // Spherical to Cartesian in the camera frame, then undo the
        // mount pitch so the vector is level with the floor.
        let direction = UnitQuaternion::from_euler_angles(0.0, sighting.elevation, -sighting.bearing)
            * Vector3::new(sighting.range, 0.0, 0.0);
        let leveled = UnitQuaternion::from_euler_angles(0.0, mount_pitch, 0.0) * direction;

        let planar_range = (leveled.x * leveled.x + leveled.y * leveled.y).sqrt();
        let camera_to_landmark_angle = leveled.y.atan2(leveled.x);

        let camera_heading = normalize_angle(robot_yaw + mount_yaw);
        let field_bearing = normalize_angle(camera_heading + camera_to_landmark_angle);

        // Walk back from the landmark along the reversed bearing to
        // place the camera, then undo the mount offset.
        let camera_x = landmark.translation.x + planar_range * (field_bearing + PI).cos();
        let camera_y = landmark.translation.y + planar_range * (field_bearing + PI).sin();

        let mount_2d = Pose2D::new(
            camera.mount.translation.x,
            camera.mount.translation.y,
            mount_yaw,
        );
        let camera_pose = Pose2D::new(camera_x, camera_y, camera_heading);
        let robot_pose = camera_pose.compose(&mount_2d.inverse());

        let xy = self.config.single_landmark_stddev_coeff * sighting.range * sighting.range;
        Some(VisionObservation {
            timestamp_us: sighting.timestamp_us,
            pose: Pose2D::new(robot_pose.x, robot_pose.y, robot_yaw),
            std_devs: [xy, xy, f32::INFINITY],
        })
    }
}

//! Rolling buffer of detected object positions with spatial queries.
//!
//! Perception batches arrive asynchronously and objects flicker in and
//! out of detection frame to frame. Keeping a short history and
//! answering queries newest-batch-first gives stable targets: a fresh
//! batch is always preferred, but a momentary dropout falls back to a
//! slightly older sighting instead of returning nothing.

use crate::core::polygon::Polygon;
use crate::core::types::{HistoryBuffer, Pose2D};
use crate::error::ConfigError;

/// Default object history retention: 0.5 s in microseconds.
pub const DEFAULT_OBJECT_HISTORY_US: u64 = 500_000;

/// Tracks recently detected field objects.
#[derive(Debug)]
pub struct ObjectTracker {
    history: HistoryBuffer<Vec<Pose2D>>,
}

impl ObjectTracker {
    /// Build a tracker retaining batches for `retention_us`.
    pub fn new(retention_us: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            history: HistoryBuffer::new(retention_us)?,
        })
    }

    /// Record one perception batch of field-frame object poses.
    ///
    /// An empty batch is recorded too: it still advances the window
    /// and evicts stale sightings.
    pub fn record(&mut self, objects: Vec<Pose2D>, timestamp_us: u64) {
        self.history.add(objects, timestamp_us);
    }

    /// Drop all tracked batches.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// All retained batches, newest first.
    pub fn all_tracked(&self) -> impl Iterator<Item = (u64, &[Pose2D])> {
        self.history
            .iter_newest_first()
            .map(|(timestamp_us, batch)| (timestamp_us, batch.as_slice()))
    }

    /// Closest object inside `area`, preferring fresher batches.
    ///
    /// Walks batches newest first and returns from the first batch
    /// containing any in-area object, picking the one nearest the
    /// robot. Older batches are never mixed with newer ones.
    pub fn best_in_area(&self, robot_pose: &Pose2D, area: &Polygon) -> Option<Pose2D> {
        let robot = robot_pose.translation();
        for (_, batch) in self.history.iter_newest_first() {
            let best = batch
                .iter()
                .filter(|object| area.contains(&object.translation()))
                .min_by(|a, b| {
                    let da = robot.distance_squared(&a.translation());
                    let db = robot.distance_squared(&b.translation());
                    da.total_cmp(&db)
                });
            if let Some(object) = best {
                return Some(*object);
            }
        }
        None
    }

    /// Object best aligned with a ray out of the robot.
    ///
    /// `direction` is a robot-relative heading in radians. Objects are
    /// expressed in a frame whose x axis runs along that ray; one is a
    /// candidate when it lies ahead (`x > 0`), within `x_tolerance`
    /// along the ray, and within `y_tolerance` to either side. The
    /// candidate with the smallest lateral offset in the freshest
    /// batch containing any wins.
    pub fn best_along_line(
        &self,
        robot_pose: &Pose2D,
        direction: f32,
        x_tolerance: f32,
        y_tolerance: f32,
    ) -> Option<Pose2D> {
        let (sin, cos) = direction.sin_cos();
        for (_, batch) in self.history.iter_newest_first() {
            let best = batch
                .iter()
                .filter_map(|object| {
                    let local = robot_pose.inverse_transform_point(&object.translation());
                    let along = local.x * cos + local.y * sin;
                    let across = -local.x * sin + local.y * cos;
                    (along > 0.0 && along <= x_tolerance && across.abs() <= y_tolerance)
                        .then_some((across.abs(), object))
                })
                .min_by(|(a, _), (b, _)| a.total_cmp(b));
            if let Some((_, object)) = best {
                return Some(*object);
            }
        }
        None
    }
}

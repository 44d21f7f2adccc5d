//! Core data types for pose estimation.
//!
//! - [`Point2D`]: 2D point in meters
//! - [`Pose2D`]: Field-relative pose (x, y, theta), also used as a
//!   relative transform
//! - [`Twist2D`]: Instantaneous relative motion
//! - [`HistoryBuffer`]: Bounded time-ordered sample store

mod history;
mod pose;
mod twist;

pub use history::HistoryBuffer;
pub use pose::{Point2D, Pose2D};
pub use twist::Twist2D;

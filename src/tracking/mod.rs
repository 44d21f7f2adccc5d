//! Short-horizon tracking of detected field objects.

mod object_tracker;

pub use object_tracker::{ObjectTracker, DEFAULT_OBJECT_HISTORY_US};

//! Bounded, time-ordered sample history.

use std::collections::BTreeMap;

use crate::error::ConfigError;

/// Time-indexed sample store with sliding-window eviction.
///
/// Samples are keyed on a microsecond timestamp; adding a sample with
/// an existing timestamp overwrites it. After every insert the oldest
/// samples are evicted until the span between newest and oldest is
/// strictly inside the retention window, so memory stays bounded by
/// tick rate × window length.
///
/// # Example
///
/// ```
/// use kshetra_pose::HistoryBuffer;
///
/// let mut buffer = HistoryBuffer::new(2_000_000).unwrap(); // 2 s
/// buffer.add(1.0f32, 100);
/// buffer.add(2.0f32, 200);
///
/// assert_eq!(buffer.sample(150, false), Some(&1.0)); // floor
/// assert_eq!(buffer.sample(150, true), Some(&2.0));  // ceiling
/// ```
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    retention_us: u64,
    samples: BTreeMap<u64, T>,
}

impl<T> HistoryBuffer<T> {
    /// Create a buffer retaining `retention_us` microseconds of history.
    pub fn new(retention_us: u64) -> Result<Self, ConfigError> {
        if retention_us == 0 {
            return Err(ConfigError::EmptyRetention);
        }
        Ok(Self {
            retention_us,
            samples: BTreeMap::new(),
        })
    }

    /// Insert a sample, then evict from the oldest end while the
    /// retained span reaches the retention window.
    pub fn add(&mut self, value: T, timestamp_us: u64) {
        self.samples.insert(timestamp_us, value);
        self.evict();
    }

    fn evict(&mut self) {
        while let (Some(oldest), Some(newest)) =
            (self.oldest_timestamp(), self.newest_timestamp())
        {
            if newest - oldest >= self.retention_us {
                self.samples.pop_first();
            } else {
                break;
            }
        }
    }

    /// Look up the sample nearest `timestamp_us`.
    ///
    /// Returns the exact match if present; the single-sided neighbor
    /// if the timestamp falls before the oldest or after the newest
    /// sample; otherwise the floor or ceiling neighbor as selected by
    /// `prefer_ceiling`. `None` only when the buffer is empty.
    pub fn sample(&self, timestamp_us: u64, prefer_ceiling: bool) -> Option<&T> {
        if let Some(exact) = self.samples.get(&timestamp_us) {
            return Some(exact);
        }

        let floor = self.samples.range(..=timestamp_us).next_back();
        let ceiling = self.samples.range(timestamp_us..).next();

        match (floor, ceiling) {
            (None, None) => None,
            (Some((_, value)), None) => Some(value),
            (None, Some((_, value))) => Some(value),
            (Some((_, floor_value)), Some((_, ceiling_value))) => {
                Some(if prefer_ceiling { ceiling_value } else { floor_value })
            }
        }
    }

    /// Remove all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Timestamp of the oldest retained sample.
    pub fn oldest_timestamp(&self) -> Option<u64> {
        self.samples.keys().next().copied()
    }

    /// Timestamp of the newest retained sample.
    pub fn newest_timestamp(&self) -> Option<u64> {
        self.samples.keys().next_back().copied()
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Retention window in microseconds.
    pub fn retention_us(&self) -> u64 {
        self.retention_us
    }

    /// Iterate samples from newest to oldest.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = (u64, &T)> {
        self.samples.iter().rev().map(|(ts, value)| (*ts, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> HistoryBuffer<i32> {
        HistoryBuffer::new(1_000_000).unwrap()
    }

    #[test]
    fn test_zero_retention_rejected() {
        assert_eq!(
            HistoryBuffer::<i32>::new(0).unwrap_err(),
            ConfigError::EmptyRetention
        );
    }

    #[test]
    fn test_empty_sample_is_none() {
        let buffer = buffer();
        assert_eq!(buffer.sample(100, false), None);
        assert_eq!(buffer.sample(100, true), None);
    }

    #[test]
    fn test_exact_match() {
        let mut buffer = buffer();
        buffer.add(1, 100);
        buffer.add(2, 200);
        assert_eq!(buffer.sample(200, false), Some(&2));
        assert_eq!(buffer.sample(200, true), Some(&2));
    }

    #[test]
    fn test_floor_and_ceiling_selection() {
        let mut buffer = buffer();
        buffer.add(1, 100);
        buffer.add(2, 300);
        assert_eq!(buffer.sample(200, false), Some(&1));
        assert_eq!(buffer.sample(200, true), Some(&2));
    }

    #[test]
    fn test_single_sided_bounds() {
        let mut buffer = buffer();
        buffer.add(1, 100);
        buffer.add(2, 300);
        // Before the oldest sample only the ceiling exists.
        assert_eq!(buffer.sample(50, false), Some(&1));
        // After the newest sample only the floor exists.
        assert_eq!(buffer.sample(400, true), Some(&2));
    }

    #[test]
    fn test_identical_timestamp_overwrites() {
        let mut buffer = buffer();
        buffer.add(1, 100);
        buffer.add(7, 100);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.sample(100, false), Some(&7));
    }

    #[test]
    fn test_eviction_keeps_span_inside_window() {
        let mut buffer = HistoryBuffer::new(500).unwrap();
        for i in 0..10u64 {
            buffer.add(i as i32, i * 100);
            let span = buffer.newest_timestamp().unwrap() - buffer.oldest_timestamp().unwrap();
            assert!(span < 500 || buffer.len() <= 1);
        }
        // 900 - 500 = 400 < 500, 900 - 400 = 500 evicted
        assert_eq!(buffer.oldest_timestamp(), Some(500));
    }

    #[test]
    fn test_sample_exactly_window_old_is_evicted() {
        let mut buffer = HistoryBuffer::new(500).unwrap();
        buffer.add(1, 0);
        buffer.add(2, 500);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.oldest_timestamp(), Some(500));
    }

    #[test]
    fn test_clear() {
        let mut buffer = buffer();
        buffer.add(1, 100);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.sample(100, false), None);
    }

    #[test]
    fn test_iter_newest_first() {
        let mut buffer = buffer();
        buffer.add(1, 100);
        buffer.add(2, 200);
        buffer.add(3, 300);
        let timestamps: Vec<u64> = buffer.iter_newest_first().map(|(ts, _)| ts).collect();
        assert_eq!(timestamps, vec![300, 200, 100]);
    }

    #[test]
    fn test_out_of_order_insert_stays_sorted() {
        let mut buffer = buffer();
        buffer.add(3, 300);
        buffer.add(1, 100);
        buffer.add(2, 200);
        assert_eq!(buffer.oldest_timestamp(), Some(100));
        assert_eq!(buffer.newest_timestamp(), Some(300));
        assert_eq!(buffer.sample(250, false), Some(&2));
    }
}

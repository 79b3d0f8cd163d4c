//! Rolling-window smoothing for noisy per-second readings.

use std::collections::{BTreeMap, VecDeque};

use netwatch_types::DimensionKey;

use crate::units::round_to;

/// Default number of readings kept per smoothed key.
pub const DEFAULT_WINDOW: usize = 3;

/// Fixed-capacity rolling buffer of recent absolute values per selected key.
///
/// Only keys chosen at construction are tracked; everything else passed to
/// [`ingest`](Self::ingest) is ignored. Owned by a single coordinator, which
/// is the only writer.
#[derive(Debug, Clone)]
pub struct SmoothingCache {
    capacity: usize,
    windows: BTreeMap<DimensionKey, VecDeque<f64>>,
}

impl SmoothingCache {
    /// Create a cache for the given keys holding at most `capacity` readings each.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(keys: impl IntoIterator<Item = DimensionKey>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let windows = keys
            .into_iter()
            .map(|key| (key, VecDeque::with_capacity(capacity)))
            .collect();
        Self { capacity, windows }
    }

    /// Maximum readings kept per key.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check whether a key was selected for smoothing.
    pub fn is_selected(&self, key: &DimensionKey) -> bool {
        self.windows.contains_key(key)
    }

    /// Iterate over the selected keys.
    pub fn keys(&self) -> impl Iterator<Item = &DimensionKey> {
        self.windows.keys()
    }

    /// Record a reading for a key.
    ///
    /// Stores `abs(value)`, evicting the oldest reading when full. Returns
    /// `false` (and stores nothing) for unselected keys and non-finite values.
    pub fn ingest(&mut self, key: &DimensionKey, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let Some(window) = self.windows.get_mut(key) else {
            return false;
        };

        window.push_back(value.abs());
        while window.len() > self.capacity {
            window.pop_front();
        }
        true
    }

    /// Mean of the current window rounded to 2 decimals.
    ///
    /// Returns `None` for unselected keys and for keys never seeded.
    pub fn read(&self, key: &DimensionKey) -> Option<f64> {
        let window = self.windows.get(key)?;
        if window.is_empty() {
            return None;
        }
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        Some(round_to(mean, 2))
    }

    /// Number of readings currently held for a key.
    pub fn window_len(&self, key: &DimensionKey) -> usize {
        self.windows.get(key).map_or(0, VecDeque::len)
    }

    /// Current smoothed reading of every seeded key.
    pub fn readings(&self) -> BTreeMap<DimensionKey, f64> {
        self.windows
            .keys()
            .filter_map(|key| self.read(key).map(|v| (key.clone(), v)))
            .collect()
    }
}

//! Zero-copy time-range views over a [`Wave`].
//!
//! A [`SliceWave`] borrows its source wave, so the borrow checker rules
//! out mutating the wave while a view is outstanding. Statistics are
//! cached independently of the source wave's cache, and the read cursor
//! is single-pass and stateful.

use std::sync::OnceLock;

use crate::wave::{compute_stats, Wave, WaveStats, NO_DATA};

/// A cursor/view over a wave restricted to a time range.
///
/// # Examples
///
/// ```
/// use seiswave::{SliceWave, Wave};
///
/// let w = Wave::new(vec![1, 2, 3, 4, 5, 6], 0.0, 1.0);
/// let mut view = SliceWave::new(&w, 2.0, 5.0);
/// assert_eq!(view.len(), 3);
/// assert_eq!(view.mean(), 4.0);
///
/// let mut seen = Vec::new();
/// while let Some(s) = view.next_sample() {
///     seen.push(s);
/// }
/// assert_eq!(seen, vec![3, 4, 5]);
/// ```
pub struct SliceWave<'a> {
    source: &'a Wave,
    position: usize,
    limit: usize,
    cursor: usize,
    stats: OnceLock<WaveStats>,
}

impl<'a> SliceWave<'a> {
    /// View the samples of `source` falling in `[t1, t2)`, clamped to the
    /// wave's extent.
    pub fn new(source: &'a Wave, t1: f64, t2: f64) -> Self {
        let rate = source.sampling_rate();
        let start = source.start_time();
        let to_index = |t: f64| ((t - start) * rate).round().max(0.0) as usize;
        let position = to_index(t1).min(source.len());
        let limit = to_index(t2).min(source.len()).max(position);
        Self {
            source,
            position,
            limit,
            cursor: position,
            stats: OnceLock::new(),
        }
    }

    /// View the whole of `source`.
    pub fn whole(source: &'a Wave) -> Self {
        Self {
            source,
            position: 0,
            limit: source.len(),
            cursor: 0,
            stats: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &Wave {
        self.source
    }

    /// Number of samples in the view.
    pub fn len(&self) -> usize {
        self.limit - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.position == self.limit
    }

    /// Start time of the first sample in the view.
    pub fn start_time(&self) -> f64 {
        self.source.start_time() + self.position as f64 / self.source.sampling_rate()
    }

    /// One sample period past the last sample in the view.
    pub fn end_time(&self) -> f64 {
        self.source.start_time() + self.limit as f64 / self.source.sampling_rate()
    }

    /// Rewind the read cursor to the start of the view.
    pub fn reset(&mut self) {
        self.cursor = self.position;
    }

    /// True while the cursor has samples left.
    pub fn has_next(&self) -> bool {
        self.cursor < self.limit
    }

    /// Read one sample and advance the cursor.
    pub fn next_sample(&mut self) -> Option<i32> {
        if self.cursor >= self.limit {
            return None;
        }
        let s = self.source.samples()[self.cursor];
        self.cursor += 1;
        Some(s)
    }

    fn stats(&self) -> WaveStats {
        *self
            .stats
            .get_or_init(|| compute_stats(&self.source.samples()[self.position..self.limit]))
    }

    pub fn mean(&self) -> f64 {
        self.stats().mean
    }

    pub fn rsam(&self) -> f64 {
        self.stats().rsam
    }

    pub fn min(&self) -> i32 {
        self.stats().min
    }

    pub fn max(&self) -> i32 {
        self.stats().max
    }

    /// Export the view as `f64` samples for spectral analysis.
    ///
    /// [`NO_DATA`] entries are replaced with the view mean (zero when the
    /// view has no valid samples) so they do not inject step transients.
    pub fn to_samples(&self) -> Vec<f64> {
        let mean = {
            let m = self.stats().mean;
            if m.is_nan() {
                0.0
            } else {
                m
            }
        };
        self.source.samples()[self.position..self.limit]
            .iter()
            .map(|&s| if s == NO_DATA { mean } else { s as f64 })
            .collect()
    }
}

//! The canonical regularly-sampled time series.
//!
//! A [`Wave`] is a fixed-rate buffer of `i32` samples anchored at a start
//! time in epoch seconds. Sample `i` occurs at `start_time + i / rate`;
//! the reserved value [`NO_DATA`] marks an instant with no recording and
//! is excluded from all statistics. Decoders produce Waves; the engine
//! merges, splits, resamples, filters, and (de)serializes them.

use std::fmt;
use std::sync::OnceLock;

use crate::{Result, SeisError};

/// Reserved sample value meaning "no recording at this instant".
pub const NO_DATA: i32 = i32::MIN;

/// Derived statistics over the valid (non-[`NO_DATA`]) samples of a buffer.
///
/// `mean` and `rsam` are NaN, and `min`/`max` are [`NO_DATA`], when the
/// buffer holds no valid samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveStats {
    pub mean: f64,
    /// Mean of absolute values (real-time seismic amplitude measurement).
    pub rsam: f64,
    pub min: i32,
    pub max: i32,
}

pub(crate) fn compute_stats(samples: &[i32]) -> WaveStats {
    let mut sum = 0.0;
    let mut abs_sum = 0.0;
    let mut min = i32::MAX;
    let mut max = i32::MIN;
    let mut count = 0u64;
    for &s in samples {
        if s == NO_DATA {
            continue;
        }
        sum += s as f64;
        abs_sum += (s as f64).abs();
        min = min.min(s);
        max = max.max(s);
        count += 1;
    }
    if count == 0 {
        WaveStats {
            mean: f64::NAN,
            rsam: f64::NAN,
            min: NO_DATA,
            max: NO_DATA,
        }
    } else {
        WaveStats {
            mean: sum / count as f64,
            rsam: abs_sum / count as f64,
            min,
            max,
        }
    }
}

/// IIR filter coefficients (numerator `b`, denominator `a`).
///
/// Coefficient design (Butterworth etc.) is an external concern; this type
/// only carries and applies a designed filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCoeffs {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

impl FilterCoeffs {
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Self {
        Self { b, a }
    }

    /// Apply the filter in direct form I over `x`.
    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        let a0 = self.a.first().copied().unwrap_or(1.0);
        let mut y = vec![0.0; x.len()];
        for n in 0..x.len() {
            let mut acc = 0.0;
            for (k, &bk) in self.b.iter().enumerate() {
                if n >= k {
                    acc += bk * x[n - k];
                }
            }
            for (k, &ak) in self.a.iter().enumerate().skip(1) {
                if n >= k {
                    acc -= ak * y[n - k];
                }
            }
            y[n] = acc / a0;
        }
        y
    }
}

/// A regularly-sampled time series.
///
/// # Examples
///
/// ```
/// use seiswave::{Wave, NO_DATA};
///
/// let w = Wave::new(vec![10, 20, 30, NO_DATA, 50], 0.0, 1.0);
/// assert_eq!(w.mean(), 27.5);
/// assert_eq!(w.end_time(), 5.0);
///
/// let bytes = w.to_binary();
/// assert_eq!(Wave::from_binary(&bytes).unwrap(), w);
/// ```
#[derive(Debug, Clone)]
pub struct Wave {
    samples: Vec<i32>,
    start_time: f64,
    sampling_rate: f64,
    registration_offset: f64,
    stats: OnceLock<WaveStats>,
}

// Bit-level equality on the float fields so that never-registered waves
// (registration_offset = NaN) still compare equal after a wire round trip.
impl PartialEq for Wave {
    fn eq(&self, other: &Self) -> bool {
        self.samples == other.samples
            && self.start_time.to_bits() == other.start_time.to_bits()
            && self.sampling_rate.to_bits() == other.sampling_rate.to_bits()
            && self.registration_offset.to_bits() == other.registration_offset.to_bits()
    }
}

impl Wave {
    /// Create a wave from a sample buffer, a start time in epoch seconds,
    /// and a sampling rate in Hz.
    pub fn new(samples: Vec<i32>, start_time: f64, sampling_rate: f64) -> Self {
        Self {
            samples,
            start_time,
            sampling_rate,
            registration_offset: f64::NAN,
            stats: OnceLock::new(),
        }
    }

    fn empty() -> Self {
        Self::new(Vec::new(), f64::NAN, f64::NAN)
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Signed adjustment applied by the last [`register()`](Self::register)
    /// call; NaN if the wave was never registered.
    pub fn registration_offset(&self) -> f64 {
        self.registration_offset
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// One sample period past the last sample: `start_time + len / rate`.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.samples.len() as f64 / self.sampling_rate
    }

    fn touch(&mut self) {
        self.stats = OnceLock::new();
    }

    /// Statistics over all valid samples, computed lazily and cached until
    /// the next mutating call.
    pub fn stats(&self) -> WaveStats {
        *self.stats.get_or_init(|| compute_stats(&self.samples))
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

    /// Snap `start_time` to the nearest multiple of the sample period,
    /// relative to the epoch, recording the signed adjustment in
    /// `registration_offset`.
    ///
    /// Registration puts independently-clocked waves of the same nominal
    /// rate onto a common sampling grid so they can be merged
    /// sample-for-sample.
    pub fn register(&mut self) {
        let period = 1.0 / self.sampling_rate;
        let snapped = (self.start_time / period).round() * period;
        self.registration_offset = snapped - self.start_time;
        self.start_time = snapped;
    }

    /// Keep every `factor`-th sample starting at index 0 and divide the
    /// sampling rate by `factor`.
    ///
    /// No anti-alias filtering is applied before decimation; callers that
    /// care about aliasing must low-pass [`filter()`](Self::filter) first.
    pub fn decimate(&mut self, factor: usize) {
        if factor <= 1 {
            return;
        }
        self.samples = self.samples.iter().copied().step_by(factor).collect();
        self.sampling_rate /= factor as f64;
        self.touch();
    }

    /// Subtract `bias` from every valid sample.
    pub fn subtract(&mut self, bias: i32) {
        for s in &mut self.samples {
            if *s != NO_DATA {
                *s -= bias;
            }
        }
        self.touch();
    }

    /// Partition into two contiguous halves.
    pub fn split(&self) -> (Wave, Wave) {
        let half = self.samples.len() / 2;
        let first = Wave::new(
            self.samples[..half].to_vec(),
            self.start_time,
            self.sampling_rate,
        );
        let second = Wave::new(
            self.samples[half..].to_vec(),
            self.start_time + half as f64 / self.sampling_rate,
            self.sampling_rate,
        );
        (first, second)
    }

    /// Partition into contiguous chunks of at most `max_samples` samples.
    pub fn split_max(&self, max_samples: usize) -> Vec<Wave> {
        let max = max_samples.max(1);
        self.samples
            .chunks(max)
            .enumerate()
            .map(|(i, chunk)| {
                Wave::new(
                    chunk.to_vec(),
                    self.start_time + (i * max) as f64 / self.sampling_rate,
                    self.sampling_rate,
                )
            })
            .collect()
    }

    fn subset_indices(&self, t1: f64, t2: f64) -> (usize, usize) {
        let i1 = ((t1 - self.start_time) * self.sampling_rate).round() as usize;
        let n = ((t2 - t1) * self.sampling_rate).round() as usize;
        let i2 = (i1 + n).min(self.samples.len());
        (i1, i2)
    }

    /// Return a new wave holding the samples in `[t1, t2)`.
    ///
    /// Out-of-range or inverted arguments (`t1 < start_time`,
    /// `t2 > end_time`, `t2 < t1`) return the wave unchanged rather than
    /// erroring; use [`subset_strict()`](Self::subset_strict) to get an
    /// error instead.
    pub fn subset(&self, t1: f64, t2: f64) -> Wave {
        match self.subset_strict(t1, t2) {
            Ok(w) => w,
            Err(_) => self.clone(),
        }
    }

    /// Like [`subset()`](Self::subset) but out-of-range or inverted
    /// arguments are a [`SeisError::BadRange`].
    pub fn subset_strict(&self, t1: f64, t2: f64) -> Result<Wave> {
        if t1 < self.start_time || t2 > self.end_time() || t2 < t1 {
            return Err(SeisError::BadRange { t1, t2 });
        }
        let (i1, i2) = self.subset_indices(t1, t2);
        let mut w = Wave::new(
            self.samples[i1..i2].to_vec(),
            self.start_time + i1 as f64 / self.sampling_rate,
            self.sampling_rate,
        );
        w.registration_offset = self.registration_offset;
        Ok(w)
    }

    /// Remove the overlap of `[t1, t2]` with this wave when it is a prefix
    /// or a suffix of the extent.
    ///
    /// Erasing the full extent clears the buffer and sets `start_time` and
    /// `sampling_rate` to NaN. Erasing a fully interior sub-range is a
    /// no-op, as are degenerate or non-overlapping ranges; use
    /// [`erase_strict()`](Self::erase_strict) to get errors for those.
    pub fn erase(&mut self, t1: f64, t2: f64) {
        let _ = self.erase_strict(t1, t2);
    }

    /// Like [`erase()`](Self::erase) but degenerate, non-overlapping, and
    /// interior ranges are a [`SeisError::BadRange`].
    pub fn erase_strict(&mut self, t1: f64, t2: f64) -> Result<()> {
        let end = self.end_time();
        if t2 < t1 || t2 < self.start_time || t1 > end {
            return Err(SeisError::BadRange { t1, t2 });
        }
        if t1 <= self.start_time && t2 >= end {
            self.samples.clear();
            self.start_time = f64::NAN;
            self.sampling_rate = f64::NAN;
            self.touch();
            return Ok(());
        }
        if t1 <= self.start_time {
            // prefix
            let n = (((t2 - self.start_time) * self.sampling_rate).round() as usize)
                .min(self.samples.len());
            self.samples.drain(..n);
            self.start_time += n as f64 / self.sampling_rate;
            self.touch();
            return Ok(());
        }
        if t2 >= end {
            // suffix
            let keep = (((t1 - self.start_time) * self.sampling_rate).round() as usize)
                .min(self.samples.len());
            self.samples.truncate(keep);
            self.touch();
            return Ok(());
        }
        // interior erase is unimplemented
        Err(SeisError::BadRange { t1, t2 })
    }

    /// Merge two equal-rate, overlapping or adjacent waves into a new wave.
    ///
    /// If one wave's extent fully contains the other's, a clone of the
    /// containing wave is returned. Otherwise the non-overlapping part of
    /// the later-starting wave is spliced onto the earlier one, with all
    /// sample-count arithmetic rounded to the nearest sample so repeated
    /// merges do not drift. Any gap between the two is filled with
    /// [`NO_DATA`].
    pub fn combine(&self, other: &Wave) -> Result<Wave> {
        if self.sampling_rate != other.sampling_rate {
            return Err(SeisError::IncompatibleRates {
                left: self.sampling_rate,
                right: other.sampling_rate,
            });
        }
        let (first, second) = if self.start_time <= other.start_time {
            (self, other)
        } else {
            (other, self)
        };
        if second.end_time() <= first.end_time() {
            return Ok(first.clone());
        }
        let rate = first.sampling_rate;
        let total = ((second.end_time() - first.start_time) * rate).round() as usize;
        let offset = ((second.start_time - first.start_time) * rate).round() as usize;
        let mut buf = first.samples.clone();
        buf.resize(total, NO_DATA);
        // Overlapping samples keep the earlier wave's values; only the
        // tail of the later wave is spliced on.
        let skip = first.samples.len().saturating_sub(offset);
        for i in skip..second.samples.len() {
            let idx = offset + i;
            if idx < buf.len() {
                buf[idx] = second.samples[i];
            }
        }
        let mut w = Wave::new(buf, first.start_time, rate);
        w.registration_offset = first.registration_offset;
        Ok(w)
    }

    /// Merge an arbitrary list of equal-rate waves into one wave spanning
    /// `[min(start_time), max(end_time)]`. The inferred extent closes on
    /// the final sample instant, so the result carries one trailing
    /// [`NO_DATA`] slot.
    ///
    /// The result is filled with [`NO_DATA`] and each input's samples are
    /// copied into their time-aligned offset in list order, so overlapping
    /// samples are last-write-wins by list position. The inputs are not
    /// resampled; differing rates are an error.
    pub fn join(waves: &[Wave]) -> Result<Wave> {
        if waves.is_empty() {
            return Ok(Wave::empty());
        }
        let t1 = waves.iter().map(Wave::start_time).fold(f64::INFINITY, f64::min);
        let t2 = waves.iter().map(Wave::end_time).fold(f64::NEG_INFINITY, f64::max);
        let rate = waves[waves.len() - 1].sampling_rate;
        Self::join_between(waves, t1, t2 + 1.0 / rate)
    }

    /// Like [`join()`](Self::join) but with a caller-supplied extent
    /// `[t1, t2)`; samples falling outside the extent are dropped.
    pub fn join_between(waves: &[Wave], t1: f64, t2: f64) -> Result<Wave> {
        if waves.is_empty() {
            return Ok(Wave::empty());
        }
        let mut rate = waves[0].sampling_rate;
        for w in waves {
            if w.sampling_rate != rate {
                return Err(SeisError::IncompatibleRates {
                    left: rate,
                    right: w.sampling_rate,
                });
            }
            rate = w.sampling_rate;
        }
        let total = ((t2 - t1) * rate).round().max(0.0) as usize;
        let mut buf = vec![NO_DATA; total];
        for w in waves {
            let offset = ((w.start_time - t1) * rate).round() as i64;
            for (i, &s) in w.samples.iter().enumerate() {
                let idx = offset + i as i64;
                if (0..total as i64).contains(&idx) {
                    buf[idx as usize] = s;
                }
            }
        }
        Ok(Wave::new(buf, t1, rate))
    }

    /// Apply an IIR filter in place.
    ///
    /// The buffer is padded by 25% on each side with the wave mean to damp
    /// edge transients, and [`NO_DATA`] samples are mean-filled before
    /// filtering (the output has no sentinel holes). With `zero_phase` the
    /// filter also runs over a time-reversed copy and is re-reversed,
    /// cancelling the phase delay. The central, unpadded region is written
    /// back at the original length.
    pub fn filter(&mut self, coeffs: &FilterCoeffs, zero_phase: bool) {
        let n = self.samples.len();
        if n == 0 {
            return;
        }
        let mean = {
            let m = self.stats().mean;
            if m.is_nan() {
                0.0
            } else {
                m
            }
        };
        let pad = n / 4;
        let mut x = Vec::with_capacity(n + 2 * pad);
        x.resize(pad, mean);
        x.extend(
            self.samples
                .iter()
                .map(|&s| if s == NO_DATA { mean } else { s as f64 }),
        );
        x.resize(n + 2 * pad, mean);

        let mut y = coeffs.apply(&x);
        if zero_phase {
            y.reverse();
            y = coeffs.apply(&y);
            y.reverse();
        }
        for (i, s) in self.samples.iter_mut().enumerate() {
            *s = y[pad + i].round() as i32;
        }
        self.touch();
    }

    /// Serialize to the fixed big-endian wire layout:
    /// `f64 start_time | f64 sampling_rate | f64 registration_offset |
    /// i32 count | i32[count] samples`.
    pub fn to_binary(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(28 + self.samples.len() * 4);
        buf.extend_from_slice(&self.start_time.to_be_bytes());
        buf.extend_from_slice(&self.sampling_rate.to_be_bytes());
        buf.extend_from_slice(&self.registration_offset.to_be_bytes());
        buf.extend_from_slice(&(self.samples.len() as i32).to_be_bytes());
        for &s in &self.samples {
            buf.extend_from_slice(&s.to_be_bytes());
        }
        buf
    }

    /// Deserialize from the wire layout produced by
    /// [`to_binary()`](Self::to_binary).
    pub fn from_binary(data: &[u8]) -> Result<Wave> {
        if data.len() < 28 {
            return Err(SeisError::Truncated {
                expected: 28,
                actual: data.len(),
            });
        }
        let start_time = f64::from_be_bytes(data[0..8].try_into().unwrap());
        let sampling_rate = f64::from_be_bytes(data[8..16].try_into().unwrap());
        let registration_offset = f64::from_be_bytes(data[16..24].try_into().unwrap());
        let count = i32::from_be_bytes(data[24..28].try_into().unwrap());
        if count < 0 {
            return Err(SeisError::BadField {
                offset: 24,
                reason: format!("negative sample count {count}"),
            });
        }
        let count = count as usize;
        let needed = 28 + count * 4;
        if data.len() < needed {
            return Err(SeisError::Truncated {
                expected: needed,
                actual: data.len(),
            });
        }
        let mut samples = Vec::with_capacity(count);
        for i in 0..count {
            let off = 28 + i * 4;
            samples.push(i32::from_be_bytes(data[off..off + 4].try_into().unwrap()));
        }
        let mut w = Wave::new(samples, start_time, sampling_rate);
        w.registration_offset = registration_offset;
        Ok(w)
    }
}

impl fmt::Display for Wave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:.3} | {} Hz | {} samples",
            self.start_time,
            self.sampling_rate,
            self.samples.len()
        )
    }
}

//! Kaiser-windowed short-time Fourier transform.
//!
//! Consumes a plain `f64` sample array (typically exported from a
//! [`SliceWave`](crate::SliceWave) via `to_samples()`) and produces a
//! time/frequency magnitude matrix.

use num_complex::Complex64;
use rustfft::FftPlanner;

/// Zeroth-order modified Bessel function of the first kind.
///
/// Abramowitz & Stegun polynomial approximation, accurate to ~1e-7
/// relative error, which is ample for window tapers.
fn modified_bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 3.75 {
        let y = (x / 3.75).powi(2);
        1.0 + y
            * (3.515_622_9
                + y * (3.089_942_4
                    + y * (1.206_749_2
                        + y * (0.265_973_2
                            + y * (0.036_076_8 + y * (0.004_581_3 + y * 0.000_324_11))))))
    } else {
        let y = 3.75 / ax;
        let poly = 0.398_942_28
            + y * (0.013_285_92
                + y * (0.002_253_19
                    + y * (-0.001_575_65
                        + y * (0.009_162_81
                            + y * (-0.020_577_06
                                + y * (0.026_355_37 + y * (-0.016_476_33 + y * 0.003_923_77)))))));
        poly * ax.exp() / ax.sqrt()
    }
}

/// Kaiser window of length `len` with shape parameter `beta`.
///
/// `beta = 0` degenerates to a rectangular window; larger values trade
/// main-lobe width for side-lobe suppression.
pub fn kaiser_window(len: usize, beta: f64) -> Vec<f64> {
    if len <= 1 {
        return vec![1.0; len];
    }
    let beta = beta.max(0.0);
    let denom = modified_bessel_i0(beta);
    let span = (len - 1) as f64;
    (0..len)
        .map(|n| {
            let ratio = 2.0 * n as f64 / span - 1.0;
            let inside = (1.0 - ratio * ratio).max(0.0).sqrt();
            modified_bessel_i0(beta * inside) / denom
        })
        .collect()
}

/// Time/frequency magnitude matrix of a windowed FFT sweep.
///
/// # Examples
///
/// ```
/// use seiswave::Spectrogram;
///
/// // 10 Hz sinusoid sampled at 100 Hz
/// let signal: Vec<f64> = (0..256)
///     .map(|i| (2.0 * std::f64::consts::PI * 10.0 * i as f64 / 100.0).sin())
///     .collect();
/// let spec = Spectrogram::new(&signal, 100.0, 256, 256, 0, 5.0);
/// assert_eq!(spec.frequency().len(), 129);
/// assert_eq!(spec.time().len(), 1);
/// ```
pub struct Spectrogram {
    frequency: Vec<f64>,
    time: Vec<f64>,
    magnitude: Vec<Vec<f64>>,
}

impl Spectrogram {
    /// Compute the spectrogram of `signal`.
    ///
    /// Steps through `signal` at stride `bin_size - overlap` (clamped to at
    /// least 1), multiplies each segment by a Kaiser window of shape
    /// `beta`, zero-pads to `nfft`, runs a complex FFT, and keeps the
    /// magnitudes of bins `0..=nfft/2`. A trailing partial window is
    /// dropped; a signal shorter than `bin_size` yields zero time columns.
    pub fn new(
        signal: &[f64],
        sampling_rate: f64,
        nfft: usize,
        bin_size: usize,
        overlap: usize,
        beta: f64,
    ) -> Self {
        let nfft = nfft.max(bin_size).max(1);
        let stride = bin_size.saturating_sub(overlap).max(1);
        let rows = nfft / 2 + 1;

        // floor((N - overlap) / (bin_size - overlap)), capped so that the
        // last window still fits when overlap >= bin_size forced stride 1
        let time_bins = if signal.len() >= bin_size && bin_size > 0 {
            let by_formula = (signal.len() - overlap.min(signal.len())) / stride;
            by_formula.min((signal.len() - bin_size) / stride + 1)
        } else {
            0
        };

        let frequency: Vec<f64> = (0..rows)
            .map(|i| i as f64 * sampling_rate / nfft as f64)
            .collect();
        let time: Vec<f64> = (0..time_bins)
            .map(|j| j as f64 * stride as f64 / sampling_rate)
            .collect();

        let window = kaiser_window(bin_size, beta);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(nfft);

        let mut magnitude = vec![vec![0.0; time_bins]; rows];
        let mut buffer = vec![Complex64::new(0.0, 0.0); nfft];
        for j in 0..time_bins {
            let offset = j * stride;
            for (k, slot) in buffer.iter_mut().enumerate() {
                let v = if k < bin_size {
                    signal[offset + k] * window[k]
                } else {
                    0.0
                };
                *slot = Complex64::new(v, 0.0);
            }
            fft.process(&mut buffer);
            for (i, row) in magnitude.iter_mut().enumerate() {
                row[j] = buffer[i].norm();
            }
        }

        Self {
            frequency,
            time,
            magnitude,
        }
    }

    /// Frequency axis, `nfft/2 + 1` entries: `frequency[i] = i * rate / nfft`.
    pub fn frequency(&self) -> &[f64] {
        &self.frequency
    }

    /// Time axis: `time[j] = j * (bin_size - overlap) / rate`.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Magnitude matrix indexed `[frequency_bin][time_bin]`.
    pub fn magnitude(&self) -> &[Vec<f64>] {
        &self.magnitude
    }

    /// Log-scaled magnitude: `multiplier * log10(magnitude / reference)`.
    ///
    /// A multiplier of 20 gives dB-like amplitude scaling.
    pub fn log_magnitude(&self, reference_amplitude: f64, multiplier: f64) -> Vec<Vec<f64>> {
        self.magnitude
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&m| multiplier * (m / reference_amplitude).log10())
                    .collect()
            })
            .collect()
    }
}

//! Pure Rust WIN and SEISAN seismic waveform codecs with a uniform
//! time-series engine.
//!
//! Zero `unsafe`, zero C dependencies. Decodes two legacy recorder
//! formats (packetized delta-encoded WIN streams and Fortran-framed
//! auto-endian SEISAN files) into [`Wave`]s: regularly-sampled `i32`
//! series with a [`NO_DATA`] gap sentinel. The engine provides merging,
//! splitting, decimation, IIR filtering, zero-copy time-range views, a
//! bit-exact binary wire format, and Kaiser-windowed spectrograms.
//!
//! # Merging waves
//!
//! ```
//! use seiswave::{Wave, NO_DATA};
//!
//! let a = Wave::new(vec![1, 2, 3], 0.0, 1.0);
//! let b = Wave::new(vec![7, 8], 5.0, 1.0);
//!
//! let joined = Wave::join(&[a, b]).unwrap();
//! assert_eq!(
//!     joined.samples(),
//!     &[1, 2, 3, NO_DATA, NO_DATA, 7, 8, NO_DATA]
//! );
//! assert_eq!(joined.start_time(), 0.0);
//! ```
//!
//! # Wire round trip
//!
//! ```
//! use seiswave::Wave;
//!
//! let w = Wave::new(vec![10, 20, 30], 946_684_800.0, 100.0);
//! let bytes = w.to_binary();
//! assert_eq!(Wave::from_binary(&bytes).unwrap(), w);
//! ```
//!
//! # Slicing and spectral analysis
//!
//! ```
//! use seiswave::{SliceWave, Spectrogram, Wave};
//!
//! let signal: Vec<i32> = (0..512)
//!     .map(|i| (1000.0 * (2.0 * std::f64::consts::PI * 10.0 * i as f64 / 100.0).sin()) as i32)
//!     .collect();
//! let w = Wave::new(signal, 0.0, 100.0);
//!
//! let view = SliceWave::new(&w, 0.0, 2.56);
//! let spec = Spectrogram::new(&view.to_samples(), 100.0, 256, 256, 0, 5.0);
//! assert_eq!(spec.frequency().len(), 129);
//! assert_eq!(spec.time().len(), 1);
//! ```
//!
//! # Decoding a WIN stream
//!
//! ```no_run
//! use seiswave::decode_win;
//!
//! let data = std::fs::read("capture.win")?;
//! for (channel, wave) in decode_win(&data)? {
//!     println!("channel {channel:#04x}: {wave}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bytes;
pub mod channel;
pub mod error;
pub mod seisan;
pub mod slice;
pub mod spectrogram;
pub mod time;
pub mod types;
pub mod wave;
pub mod win;

pub use channel::ChannelId;
pub use error::{Result, SeisError};
pub use slice::SliceWave;
pub use spectrogram::{kaiser_window, Spectrogram};
pub use types::{ByteOrder, LengthWidth};
pub use wave::{FilterCoeffs, Wave, WaveStats, NO_DATA};

pub use seisan::{decode_seisan, decode_seisan_file, SeisanChannel, SeisanFileHeader};
pub use win::{decode_win, WinDecoder};

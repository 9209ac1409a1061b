//! Decode WIN-format telemetry packets.
//!
//! WIN is a packetized, delta-encoded multi-channel format. Each packet
//! carries a big-endian length (inclusive of the 10 header bytes), a
//! 6-byte BCD timestamp, and channel blocks until the declared length is
//! consumed. A channel's full series usually spans many one-second
//! packets; [`WinDecoder`] accumulates the per-packet runs and joins them
//! into one [`Wave`] per channel.
//!
//! All accumulation state lives in the decoder instance. A decoder must
//! not be shared across concurrent decode calls.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::bytes::{decode_bcd, read_int};
use crate::time::epoch_seconds;
use crate::types::ByteOrder;
use crate::wave::Wave;
use crate::{Result, SeisError};

/// Packet length field (4 bytes) + BCD timestamp (6 bytes).
const PACKET_HEADER_LEN: usize = 10;

/// Channel block header: reserved, channel, width/count, count low,
/// 4-byte base value.
const BLOCK_HEADER_LEN: usize = 8;

/// Streaming WIN decoder with per-instance channel accumulation.
///
/// # Examples
///
/// Decoding a stream in one call:
///
/// ```no_run
/// use seiswave::win::decode_win;
///
/// let data = std::fs::read("capture.win")?;
/// for (channel, wave) in decode_win(&data)? {
///     println!("channel {channel:#04x}: {wave}");
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct WinDecoder {
    channels: BTreeMap<u8, Vec<Wave>>,
}

impl WinDecoder {
    pub fn new() -> Self {
        Self {
            channels: BTreeMap::new(),
        }
    }

    /// Decode one packet from the front of `data`, accumulating its
    /// channel blocks. Returns the number of bytes consumed.
    pub fn decode_packet(&mut self, data: &[u8]) -> Result<usize> {
        if data.len() < PACKET_HEADER_LEN {
            return Err(SeisError::Truncated {
                expected: PACKET_HEADER_LEN,
                actual: data.len(),
            });
        }
        let declared = u32::from_be_bytes(data[0..4].try_into().unwrap()) as usize;
        if declared < PACKET_HEADER_LEN {
            return Err(SeisError::BadField {
                offset: 0,
                reason: format!("packet length {declared} shorter than its header"),
            });
        }
        if data.len() < declared {
            return Err(SeisError::Truncated {
                expected: declared,
                actual: data.len(),
            });
        }

        // 6-byte BCD timestamp; the year byte is an offset from 2000
        let year = 2000 + decode_bcd(&data[4..5])? as i64;
        let month = decode_bcd(&data[5..6])?;
        let day = decode_bcd(&data[6..7])?;
        let hour = decode_bcd(&data[7..8])?;
        let minute = decode_bcd(&data[8..9])?;
        let second = decode_bcd(&data[9..10])?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(SeisError::BadField {
                offset: 5,
                reason: format!("invalid timestamp date {year:04}-{month:02}-{day:02}"),
            });
        }
        let time = epoch_seconds(year, month, day, hour, minute, second as f64);
        debug!("win packet: {declared} bytes, t={time}");

        let mut pos = PACKET_HEADER_LEN;
        while pos < declared {
            pos += self.decode_channel_block(&data[pos..declared], time)?;
        }
        Ok(declared)
    }

    fn decode_channel_block(&mut self, data: &[u8], time: f64) -> Result<usize> {
        if data.len() < BLOCK_HEADER_LEN {
            return Err(SeisError::Truncated {
                expected: BLOCK_HEADER_LEN,
                actual: data.len(),
            });
        }
        // data[0] is reserved
        let channel = data[1];
        let width = data[2] >> 4;
        if width > 4 {
            return Err(SeisError::UnsupportedWidth(width));
        }
        let count = data[3] as usize + (((data[2] & 0x0F) as usize) << 4);
        if count == 0 {
            return Err(SeisError::BadField {
                offset: 3,
                reason: "channel block with zero samples".into(),
            });
        }
        let base = read_int(&data[4..], ByteOrder::Big, 4)? as i32;

        // Width 0 is decoded identically to width 1
        let delta_width = width.max(1);
        let needed = BLOCK_HEADER_LEN + (count - 1) * delta_width as usize;
        if data.len() < needed {
            return Err(SeisError::Truncated {
                expected: needed,
                actual: data.len(),
            });
        }

        let mut samples = Vec::with_capacity(count);
        samples.push(base);
        let mut value = base;
        let mut off = BLOCK_HEADER_LEN;
        for _ in 1..count {
            let delta = read_int(&data[off..], ByteOrder::Big, delta_width)? as i32;
            value = value.wrapping_add(delta);
            samples.push(value);
            off += delta_width as usize;
        }
        trace!("win block: channel {channel:#04x}, {count} samples, width {width}");

        // WIN packets span one second, so the in-block sample count is the
        // run's sampling rate.
        let run = Wave::new(samples, time, count as f64);
        self.channels.entry(channel).or_default().push(run);
        Ok(needed)
    }

    /// Decode a stream of consecutive packets until `data` is exhausted.
    ///
    /// Any malformed packet aborts the whole decode.
    pub fn decode_stream(&mut self, data: &[u8]) -> Result<()> {
        let mut pos = 0;
        while pos < data.len() {
            pos += self.decode_packet(&data[pos..])?;
        }
        Ok(())
    }

    /// Consume the decoder, joining each channel's packet runs in packet
    /// order into one wave. Gaps between runs are [`NO_DATA`]-filled.
    ///
    /// [`NO_DATA`]: crate::NO_DATA
    pub fn into_waves(self) -> Result<Vec<(u8, Wave)>> {
        let mut out = Vec::with_capacity(self.channels.len());
        for (channel, mut runs) in self.channels {
            let wave = if runs.len() == 1 {
                runs.pop().unwrap()
            } else {
                Wave::join(&runs)?
            };
            out.push((channel, wave));
        }
        Ok(out)
    }
}

impl Default for WinDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a complete WIN byte stream into one wave per channel number.
///
/// Fails atomically: a malformed packet or block yields an error and no
/// channels.
pub fn decode_win(data: &[u8]) -> Result<Vec<(u8, Wave)>> {
    let mut decoder = WinDecoder::new();
    decoder.decode_stream(data)?;
    decoder.into_waves()
}

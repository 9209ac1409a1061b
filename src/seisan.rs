//! Decode SEISAN waveform files.
//!
//! SEISAN files are self-describing: the first bytes reveal the byte
//! order and the width of the Fortran record-length framing. Every
//! logical record is framed `[length][payload][length]` and the trailing
//! length is always re-read and compared; a mismatch is data corruption
//! and aborts the decode.
//!
//! File layout: one 80-byte file header, a run of skipped continuation
//! records, then per channel a 1040-byte text header followed by one data
//! record of 4-byte integers.

use std::path::Path;

use log::debug;

use crate::bytes::{parse_ascii_field, read_int};
use crate::channel::ChannelId;
use crate::time::{doy_to_month_day, epoch_seconds};
use crate::types::{ByteOrder, LengthWidth};
use crate::wave::Wave;
use crate::{Result, SeisError};

/// Parsed file-header record.
#[derive(Debug, Clone, PartialEq)]
pub struct SeisanFileHeader {
    pub network_name: String,
    pub channel_count: u32,
    /// Full year (the header stores years since 1900).
    pub year: Option<i32>,
    pub doy: Option<u32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<f64>,
}

/// One decoded channel: header fields plus its raw sample array.
#[derive(Debug, Clone, PartialEq)]
pub struct SeisanChannel {
    pub station: String,
    pub component: String,
    pub location: String,
    pub network: String,
    /// Full year (the header stores years since 1900).
    pub year: Option<i32>,
    pub doy: Option<u32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<f64>,
    pub sample_rate: Option<f64>,
    pub samples: Vec<i32>,
}

impl SeisanChannel {
    /// Four-part channel identity from the header codes.
    pub fn channel_id(&self) -> ChannelId {
        ChannelId::from_parts(&self.network, &self.station, &self.location, &self.component)
    }

    /// Start time in epoch seconds, if the header carries enough of a
    /// date. Blank month/day fall back to the day-of-year field.
    pub fn start_time(&self) -> Option<f64> {
        let year = self.year?;
        let (month, day) = match (self.month, self.day) {
            (Some(m), Some(d)) => (m, d),
            _ => doy_to_month_day(year as i64, self.doy?),
        };
        Some(epoch_seconds(
            year as i64,
            month,
            day,
            self.hour.unwrap_or(0),
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0.0),
        ))
    }

    /// Convert to a [`Wave`], if the start time and sampling rate are known.
    pub fn to_wave(&self) -> Option<Wave> {
        let rate = self.sample_rate.filter(|&r| r > 0.0)?;
        Some(Wave::new(self.samples.clone(), self.start_time()?, rate))
    }
}

/// Sequential reader over Fortran-framed records.
struct RecordReader<'a> {
    data: &'a [u8],
    pos: usize,
    byte_order: ByteOrder,
    length_width: LengthWidth,
}

impl<'a> RecordReader<'a> {
    fn read_length(&mut self) -> Result<u64> {
        let width = self.length_width.bytes();
        if self.data.len() < self.pos + width {
            return Err(SeisError::Truncated {
                expected: self.pos + width,
                actual: self.data.len(),
            });
        }
        let raw = read_int(&self.data[self.pos..], self.byte_order, width as u8)?;
        if raw < 0 {
            return Err(SeisError::BadField {
                offset: self.pos,
                reason: format!("negative record length {raw}"),
            });
        }
        self.pos += width;
        Ok(raw as u64)
    }

    /// Read one `[length][payload][length]` record, verifying that the
    /// trailing length matches the leading one.
    fn read_record(&mut self) -> Result<&'a [u8]> {
        let leading = self.read_length()?;
        let len = leading as usize;
        if self.data.len() < self.pos + len {
            return Err(SeisError::Truncated {
                expected: self.pos + len,
                actual: self.data.len(),
            });
        }
        let payload = &self.data[self.pos..self.pos + len];
        self.pos += len;
        let trailing = self.read_length()?;
        if leading != trailing {
            return Err(SeisError::LengthMismatch { leading, trailing });
        }
        Ok(payload)
    }
}

/// Detect byte order and record-length width from the first 8 bytes.
///
/// Byte 0 equal to `'P'` (80) marks a little-endian ("PC") file. The
/// leading length must decode to 80 (the file-header record length) at
/// either 4- or 8-byte width; anything else is a bad magic.
fn detect(data: &[u8]) -> Result<(ByteOrder, LengthWidth)> {
    if data.len() < 8 {
        return Err(SeisError::Truncated {
            expected: 8,
            actual: data.len(),
        });
    }
    let byte_order = if data[0] == b'P' {
        ByteOrder::Little
    } else {
        ByteOrder::Big
    };
    // Probe 8 bytes before 4: a little-endian 8-byte length of 80 also
    // reads as 80 in its first 4 bytes, but not the other way around
    // (text records never start with NUL bytes).
    if read_int(data, byte_order, 8)? == 80 {
        return Ok((byte_order, LengthWidth::Eight));
    }
    if read_int(data, byte_order, 4)? == 80 {
        return Ok((byte_order, LengthWidth::Four));
    }
    Err(SeisError::BadMagic)
}

fn field<'a>(record: &'a [u8], start: usize, end: usize) -> Result<&'a [u8]> {
    if record.len() < end {
        return Err(SeisError::Truncated {
            expected: end,
            actual: record.len(),
        });
    }
    Ok(&record[start..end])
}

fn text_field(record: &[u8], start: usize, end: usize) -> Result<String> {
    let bytes = field(record, start, end)?;
    std::str::from_utf8(bytes)
        .map(|s| s.trim().to_string())
        .map_err(|_| SeisError::BadField {
            offset: start,
            reason: "not ASCII".into(),
        })
}

fn num_field<T: std::str::FromStr>(record: &[u8], start: usize, end: usize) -> Result<Option<T>> {
    parse_ascii_field(field(record, start, end)?, start)
}

fn parse_file_header(record: &[u8]) -> Result<SeisanFileHeader> {
    let channel_count: u32 = num_field(record, 30, 33)?.ok_or(SeisError::BadField {
        offset: 30,
        reason: "blank channel count".into(),
    })?;
    Ok(SeisanFileHeader {
        network_name: text_field(record, 1, 30)?,
        channel_count,
        year: num_field::<i32>(record, 33, 36)?.map(|y| y + 1900),
        doy: num_field(record, 37, 40)?,
        month: num_field(record, 41, 43)?,
        day: num_field(record, 44, 46)?,
        hour: num_field(record, 47, 49)?,
        minute: num_field(record, 50, 52)?,
        second: num_field(record, 53, 59)?,
    })
}

/// Parse a channel header, returning the channel and its declared sample
/// count.
fn parse_channel_header(record: &[u8]) -> Result<(SeisanChannel, usize)> {
    let sample_count: usize = num_field(record, 50, 57)?.ok_or(SeisError::BadField {
        offset: 50,
        reason: "blank sample count".into(),
    })?;
    // Location and network codes are two characters each, interleaved
    // through the date columns (SEISAN channel-header layout).
    let loc = [field(record, 9, 10)?[0], field(record, 14, 15)?[0]];
    let net = [field(record, 10, 11)?[0], field(record, 18, 19)?[0]];
    let channel = SeisanChannel {
        station: text_field(record, 0, 5)?,
        component: text_field(record, 5, 9)?,
        location: String::from_utf8_lossy(&loc).trim().to_string(),
        network: String::from_utf8_lossy(&net).trim().to_string(),
        year: num_field::<i32>(record, 11, 14)?.map(|y| y + 1900),
        doy: num_field(record, 15, 18)?,
        month: num_field(record, 19, 21)?,
        day: num_field(record, 22, 24)?,
        hour: num_field(record, 25, 27)?,
        minute: num_field(record, 28, 30)?,
        second: num_field(record, 35, 41)?,
        sample_rate: num_field(record, 43, 50)?,
        samples: Vec::new(),
    };
    Ok((channel, sample_count))
}

/// Decode a complete SEISAN file image.
///
/// Fails atomically: any framing or header error yields an error and no
/// channels.
pub fn decode_seisan(data: &[u8]) -> Result<(SeisanFileHeader, Vec<SeisanChannel>)> {
    let (byte_order, length_width) = detect(data)?;
    debug!("seisan file: {byte_order}, {length_width}");

    let mut reader = RecordReader {
        data,
        pos: 0,
        byte_order,
        length_width,
    };

    let header = parse_file_header(reader.read_record()?)?;
    let nchan = header.channel_count as usize;

    // Header continuation records, all skipped (framing still verified)
    let skip = (nchan / 3 + nchan % 3 + 1).max(10);
    for _ in 0..skip {
        reader.read_record()?;
    }

    let mut channels = Vec::with_capacity(nchan);
    for _ in 0..nchan {
        let (mut channel, sample_count) = parse_channel_header(reader.read_record()?)?;
        let data_record = reader.read_record()?;
        if data_record.len() < sample_count * 4 {
            return Err(SeisError::Truncated {
                expected: sample_count * 4,
                actual: data_record.len(),
            });
        }
        let mut samples = Vec::with_capacity(sample_count);
        for i in 0..sample_count {
            samples.push(read_int(&data_record[i * 4..], byte_order, 4)? as i32);
        }
        channel.samples = samples;
        debug!(
            "seisan channel {}: {} samples",
            channel.channel_id(),
            sample_count
        );
        channels.push(channel);
    }

    Ok((header, channels))
}

/// Read and decode a SEISAN file from disk.
pub fn decode_seisan_file(
    path: impl AsRef<Path>,
) -> Result<(SeisanFileHeader, Vec<SeisanChannel>)> {
    let data = std::fs::read(path)?;
    decode_seisan(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(line: &mut [u8], start: usize, text: &str) {
        line[start..start + text.len()].copy_from_slice(text.as_bytes());
    }

    fn frame(payload: &[u8], byte_order: ByteOrder, length_width: LengthWidth) -> Vec<u8> {
        let len = payload.len() as u64;
        let mut buf = Vec::with_capacity(payload.len() + 2 * length_width.bytes());
        let length_bytes = |out: &mut Vec<u8>| match (length_width, byte_order) {
            (LengthWidth::Four, ByteOrder::Big) => out.extend_from_slice(&(len as u32).to_be_bytes()),
            (LengthWidth::Four, ByteOrder::Little) => out.extend_from_slice(&(len as u32).to_le_bytes()),
            (LengthWidth::Eight, ByteOrder::Big) => out.extend_from_slice(&len.to_be_bytes()),
            (LengthWidth::Eight, ByteOrder::Little) => out.extend_from_slice(&len.to_le_bytes()),
        };
        length_bytes(&mut buf);
        buf.extend_from_slice(payload);
        length_bytes(&mut buf);
        buf
    }

    fn file_header_line(nchan: usize) -> Vec<u8> {
        let mut line = vec![b' '; 80];
        put(&mut line, 1, "VOLCANO NET");
        put(&mut line, 30, &format!("{nchan:>3}"));
        put(&mut line, 33, "107"); // 2007
        put(&mut line, 37, " 74");
        put(&mut line, 41, " 3");
        put(&mut line, 44, "15");
        put(&mut line, 47, "12");
        put(&mut line, 50, "30");
        put(&mut line, 53, "45.000");
        line
    }

    fn channel_header_line(station: &str, component: &str, nsamp: usize) -> Vec<u8> {
        let mut line = vec![b' '; 1040];
        put(&mut line, 0, station);
        put(&mut line, 5, component);
        line[9] = b'1'; // location, first char
        line[10] = b'N'; // network, first char
        put(&mut line, 11, "107");
        line[14] = b'0'; // location, second char
        put(&mut line, 15, " 74");
        line[18] = b'Z'; // network, second char
        put(&mut line, 19, " 3");
        put(&mut line, 22, "15");
        put(&mut line, 25, "12");
        put(&mut line, 28, "30");
        put(&mut line, 35, "45.000");
        put(&mut line, 43, "  100.0");
        put(&mut line, 50, &format!("{nsamp:>7}"));
        line
    }

    fn build_file(
        byte_order: ByteOrder,
        length_width: LengthWidth,
        channels: &[(&str, &str, Vec<i32>)],
    ) -> Vec<u8> {
        let nchan = channels.len();
        let mut out = frame(&file_header_line(nchan), byte_order, length_width);
        let skip = (nchan / 3 + nchan % 3 + 1).max(10);
        for _ in 0..skip {
            out.extend_from_slice(&frame(&vec![b' '; 80], byte_order, length_width));
        }
        for (station, component, samples) in channels {
            out.extend_from_slice(&frame(
                &channel_header_line(station, component, samples.len()),
                byte_order,
                length_width,
            ));
            let mut data = Vec::with_capacity(samples.len() * 4);
            for &s in samples {
                match byte_order {
                    ByteOrder::Big => data.extend_from_slice(&s.to_be_bytes()),
                    ByteOrder::Little => data.extend_from_slice(&s.to_le_bytes()),
                }
            }
            out.extend_from_slice(&frame(&data, byte_order, length_width));
        }
        out
    }

    /// 2007-03-15 12:30:45 UTC.
    const T0: f64 = 1_173_961_845.0;

    #[test]
    fn test_detect_variants() {
        for (order, width) in [
            (ByteOrder::Big, LengthWidth::Four),
            (ByteOrder::Big, LengthWidth::Eight),
            (ByteOrder::Little, LengthWidth::Four),
            (ByteOrder::Little, LengthWidth::Eight),
        ] {
            let data = build_file(order, width, &[("WIZ", "EHZ", vec![1, 2, 3])]);
            assert_eq!(detect(&data).unwrap(), (order, width), "{order} {width}");
        }
    }

    #[test]
    fn test_detect_pc_marker() {
        // Little-endian 4-byte framing puts 'P' (80) in byte 0
        let data = build_file(ByteOrder::Little, LengthWidth::Four, &[]);
        assert_eq!(data[0], b'P');
        // Big-endian 4-byte framing puts it in byte 3
        let data = build_file(ByteOrder::Big, LengthWidth::Four, &[]);
        assert_eq!(data[3], b'P');
    }

    #[test]
    fn test_detect_bad_magic() {
        assert!(matches!(
            detect(&[0x12, 0x34, 0x56, 0x78, 0x00, 0x00, 0x00, 0x00]),
            Err(SeisError::BadMagic)
        ));
    }

    #[test]
    fn test_decode_single_channel() {
        let data = build_file(
            ByteOrder::Big,
            LengthWidth::Four,
            &[("WIZ", "EHZ", vec![10, -20, 30, -40])],
        );
        let (header, channels) = decode_seisan(&data).unwrap();
        assert_eq!(header.network_name, "VOLCANO NET");
        assert_eq!(header.channel_count, 1);
        assert_eq!(header.year, Some(2007));
        assert_eq!(header.month, Some(3));
        assert_eq!(header.second, Some(45.0));

        assert_eq!(channels.len(), 1);
        let ch = &channels[0];
        assert_eq!(ch.station, "WIZ");
        assert_eq!(ch.component, "EHZ");
        assert_eq!(ch.location, "10");
        assert_eq!(ch.network, "NZ");
        assert_eq!(ch.sample_rate, Some(100.0));
        assert_eq!(ch.samples, vec![10, -20, 30, -40]);
        assert_eq!(ch.channel_id().to_string(), "NZ.WIZ.10.EHZ");
        assert_eq!(ch.start_time(), Some(T0));
    }

    #[test]
    fn test_decode_little_endian_samples() {
        let data = build_file(
            ByteOrder::Little,
            LengthWidth::Four,
            &[("WIZ", "EHZ", vec![1, -2, 300_000])],
        );
        let (_, channels) = decode_seisan(&data).unwrap();
        assert_eq!(channels[0].samples, vec![1, -2, 300_000]);
    }

    #[test]
    fn test_decode_eight_byte_lengths() {
        let data = build_file(
            ByteOrder::Little,
            LengthWidth::Eight,
            &[("WIZ", "EHZ", vec![7, 8, 9]), ("WSRZ", "EHN", vec![4, 5, 6])],
        );
        let (header, channels) = decode_seisan(&data).unwrap();
        assert_eq!(header.channel_count, 2);
        assert_eq!(channels[0].station, "WIZ");
        assert_eq!(channels[1].station, "WSRZ");
        assert_eq!(channels[1].samples, vec![4, 5, 6]);
    }

    #[test]
    fn test_trailing_length_mismatch_fails_atomically() {
        let mut data = build_file(
            ByteOrder::Big,
            LengthWidth::Four,
            &[("WIZ", "EHZ", vec![1, 2, 3])],
        );
        // Corrupt the trailing length of the last (data) record
        let n = data.len();
        data[n - 1] ^= 0xFF;
        let err = decode_seisan(&data).unwrap_err();
        assert!(matches!(err, SeisError::LengthMismatch { .. }));
    }

    #[test]
    fn test_truncated_file() {
        let data = build_file(
            ByteOrder::Big,
            LengthWidth::Four,
            &[("WIZ", "EHZ", vec![1, 2, 3])],
        );
        let err = decode_seisan(&data[..data.len() - 10]).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_to_wave() {
        let data = build_file(
            ByteOrder::Big,
            LengthWidth::Four,
            &[("WIZ", "EHZ", vec![5, 6, 7])],
        );
        let (_, channels) = decode_seisan(&data).unwrap();
        let wave = channels[0].to_wave().unwrap();
        assert_eq!(wave.samples(), &[5, 6, 7]);
        assert_eq!(wave.start_time(), T0);
        assert_eq!(wave.sampling_rate(), 100.0);
    }

    #[test]
    fn test_blank_date_falls_back_to_doy() {
        let mut ch_line = channel_header_line("WIZ", "EHZ", 0);
        put(&mut ch_line, 19, "  "); // blank month
        put(&mut ch_line, 22, "  "); // blank day
        let (channel, _) = parse_channel_header(&ch_line).unwrap();
        assert_eq!(channel.month, None);
        assert_eq!(channel.doy, Some(74));
        // doy 74 of 2007 is March 15
        assert_eq!(channel.start_time(), Some(T0));
    }

    #[test]
    fn test_blank_timestamp_means_unknown() {
        let mut ch_line = channel_header_line("WIZ", "EHZ", 0);
        put(&mut ch_line, 11, "   "); // blank year
        let (channel, _) = parse_channel_header(&ch_line).unwrap();
        assert_eq!(channel.year, None);
        assert_eq!(channel.start_time(), None);
        assert_eq!(channel.to_wave(), None);
    }

    #[test]
    fn test_skip_count_grows_with_channels() {
        // 12 channels: 12/3 + 12%3 + 1 = 5, still below the floor of 10;
        // 40 channels: 40/3 + 40%3 + 1 = 15 continuation records
        let channels: Vec<(&str, &str, Vec<i32>)> =
            (0..40).map(|_| ("WIZ", "EHZ", vec![1])).collect();
        let data = build_file(ByteOrder::Big, LengthWidth::Four, &channels);
        let (header, decoded) = decode_seisan(&data).unwrap();
        assert_eq!(header.channel_count, 40);
        assert_eq!(decoded.len(), 40);
    }
}

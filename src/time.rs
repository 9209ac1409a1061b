//! Civil-date conversions for waveform timestamps.
//!
//! Wave start times are `f64` seconds since the Unix epoch
//! (1970-01-01 00:00:00 UTC). Both decoders convert their header
//! timestamps through [`epoch_seconds`].

/// Days from 1970-01-01 to the given civil date (proleptic Gregorian).
///
/// Standard days-from-civil computation; valid for the full range a
/// recorder timestamp can express.
pub fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = (y - era * 400) as u64;
    let mp = u64::from(if month > 2 { month - 3 } else { month + 9 });
    let doy = (153 * mp + 2) / 5 + day as u64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe as i64 - 719_468
}

/// Seconds since the Unix epoch for a civil date-time.
///
/// `second` is fractional to carry sub-second header precision.
pub fn epoch_seconds(year: i64, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> f64 {
    let days = days_from_civil(year, month, day);
    days as f64 * 86_400.0 + hour as f64 * 3_600.0 + minute as f64 * 60.0 + second
}

/// Convert a day-of-year (1-based) to a (month, day) pair.
///
/// Used for SEISAN headers that carry a day-of-year but blank
/// month/day fields.
pub fn doy_to_month_day(year: i64, doy: u32) -> (u32, u32) {
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let lengths: [u32; 12] = [
        31,
        if leap { 29 } else { 28 },
        31,
        30,
        31,
        30,
        31,
        31,
        30,
        31,
        30,
        31,
    ];
    let mut remaining = doy;
    for (i, &len) in lengths.iter().enumerate() {
        if remaining <= len {
            return (i as u32 + 1, remaining);
        }
        remaining -= len;
    }
    (12, 31)
}

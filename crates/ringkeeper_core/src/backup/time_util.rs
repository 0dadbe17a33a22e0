//! Time conversions used by backup paths.

use chrono::{DateTime, NaiveDate, Timelike, Utc};

const MINUTE_STAMP_LEN: usize = 12;

/// Format `time` as `yyyyMMddHHmm` in UTC.
pub(crate) fn format_minute_stamp(time: DateTime<Utc>) -> String {
    time.format("%Y%m%d%H%M").to_string()
}

/// Parse a `yyyyMMddHHmm` stamp as a UTC instant.
pub(crate) fn parse_minute_stamp(value: &str) -> Option<DateTime<Utc>> {
    if value.len() != MINUTE_STAMP_LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let field = |range: std::ops::Range<usize>| value[range].parse::<u32>().ok();
    let year = i32::try_from(field(0..4)?).ok()?;
    let naive = NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?)?
        .and_hms_opt(field(8..10)?, field(10..12)?, 0)?;
    Some(naive.and_utc())
}

/// Drop sub-second precision.
pub(crate) fn truncate_to_second(time: DateTime<Utc>) -> DateTime<Utc> {
    time.with_nanosecond(0).unwrap_or(time)
}

/// Epoch milliseconds of `time` truncated to the whole second.
pub(crate) fn whole_second_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp() * 1_000
}

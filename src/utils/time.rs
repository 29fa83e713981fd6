use crate::error::{timestamp_error, InviteResult};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

/// Compact UTC timestamp layout used by iCalendar and Google Calendar
pub const BASIC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Parse a loosely formatted ISO-8601 timestamp into an absolute instant.
///
/// The general-purpose formats are tried first. When none of them accepts the
/// value, a strict `YYYY-MM-DDThh:mm:ss[Z|±hh:mm]` match is attempted, which
/// treats a missing suffix as UTC.
pub fn parse_instant(value: &str) -> InviteResult<DateTime<Utc>> {
    let value = value.trim();

    if let Some(instant) = parse_general(value) {
        return Ok(instant);
    }

    debug!("General parse rejected '{}', trying strict pattern", value);
    parse_strict(value).ok_or_else(|| timestamp_error(value))
}

/// Format an instant as `YYYYMMDDTHHMMSSZ`
pub fn basic_format(instant: &DateTime<Utc>) -> String {
    instant.format(BASIC_FORMAT).to_string()
}

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%MZ",
];

fn parse_general(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    // Minutes precision with an explicit offset
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, BASIC_FORMAT) {
        return Some(dt.and_utc());
    }
    // Offset-less forms, e.g. from datetime-local inputs, read as UTC
    for pattern in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(dt.and_utc());
        }
    }
    // Date-only forms are midnight UTC
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}

fn parse_strict(value: &str) -> Option<DateTime<Utc>> {
    if !value.is_ascii() || value.len() < 19 {
        return None;
    }

    let bytes = value.as_bytes();
    for (i, b) in bytes[..19].iter().enumerate() {
        let ok = match i {
            4 | 7 => *b == b'-',
            10 => *b == b'T',
            13 | 16 => *b == b':',
            _ => b.is_ascii_digit(),
        };
        if !ok {
            return None;
        }
    }

    let number = |range: std::ops::Range<usize>| value[range].parse::<u32>().ok();
    let year = value[0..4].parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(5..7)?, number(8..10)?)?;
    let wall = date.and_hms_opt(number(11..13)?, number(14..16)?, number(17..19)?)?;
    let wall = wall.and_utc();

    match &value[19..] {
        "" | "Z" => Some(wall),
        suffix => {
            let offset = parse_offset(suffix)?;
            // +02:00 means local time runs ahead of UTC
            Some(wall - offset)
        }
    }
}

/// Parse a signed `±hh:mm` offset into a duration
fn parse_offset(suffix: &str) -> Option<Duration> {
    let bytes = suffix.as_bytes();
    if bytes.len() != 6 || bytes[3] != b':' {
        return None;
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    if !bytes[1..3].iter().chain(&bytes[4..6]).all(u8::is_ascii_digit) {
        return None;
    }
    let hours = suffix[1..3].parse::<i64>().ok()?;
    let minutes = suffix[4..6].parse::<i64>().ok()?;
    Some(Duration::minutes(sign * (hours * 60 + minutes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_offset_equivalence() {
        let with_offset = parse_instant("2025-03-10T18:00:00+02:00").unwrap();
        let utc = parse_instant("2025-03-10T16:00:00Z").unwrap();
        assert_eq!(with_offset, utc);
        assert_eq!(utc, Utc.with_ymd_and_hms(2025, 3, 10, 16, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_suffix_is_utc() {
        let instant = parse_instant("2025-11-23T21:16:00").unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 11, 23, 21, 16, 0).unwrap());
    }

    #[test]
    fn test_strict_pattern_offsets() {
        // Strict path directly, both signs
        let east = parse_strict("2025-03-10T18:00:00+02:00").unwrap();
        assert_eq!(east, Utc.with_ymd_and_hms(2025, 3, 10, 16, 0, 0).unwrap());

        let west = parse_strict("2025-03-10T18:00:00-05:30").unwrap();
        assert_eq!(west, Utc.with_ymd_and_hms(2025, 3, 10, 23, 30, 0).unwrap());

        assert!(parse_strict("2025-03-10T18:00:00Z").is_some());
    }

    #[test]
    fn test_general_forms() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 10, 16, 0, 0).unwrap();
        assert_eq!(parse_instant("2025-03-10T16:00:00.000Z").unwrap(), expected);
        assert_eq!(parse_instant("2025-03-10T18:00+02:00").unwrap(), expected);
        assert_eq!(
            parse_instant("Mon, 10 Mar 2025 16:00:00 +0000").unwrap(),
            expected
        );
        assert_eq!(
            parse_instant("2025-03-10").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_naive_forms_are_utc() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap();
        // datetime-local input value
        assert_eq!(parse_instant("2025-03-10T18:00").unwrap(), expected);
        assert_eq!(parse_instant("2025-03-10T18:00Z").unwrap(), expected);
        assert_eq!(parse_instant("2025-03-10T18:00:00.000").unwrap(), expected);
        assert_eq!(
            parse_instant("2025-03-10T18:00:00.250").unwrap(),
            expected + Duration::milliseconds(250)
        );
        assert!(parse_instant("2025-03-10T18").is_err());
        assert!(parse_instant("2025-03-10T24:00").is_err());
    }

    #[test]
    fn test_basic_format_round_trip() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let formatted = basic_format(&instant);
        assert_eq!(formatted, "20250102T030405Z");
        assert_eq!(parse_instant(&formatted).unwrap(), instant);
    }

    #[test]
    fn test_unparsable_values() {
        for value in [
            "",
            "tomorrow",
            "2025-13-01T10:00:00Z",
            "2025-03-10T25:00:00",
            "2025-03-10T18:00:00 02:00",
            "2025-03-10T18:00:00+0200x",
            "2025-03-10 ä",
        ] {
            assert!(
                matches!(
                    parse_instant(value),
                    Err(crate::error::Error::UnparsableTimestamp(_))
                ),
                "expected failure for {value:?}"
            );
        }
    }
}

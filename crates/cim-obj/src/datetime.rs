//! CIM datetime values: points in time with a fixed UTC offset, or intervals.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::error::{CimError, Result};

/// Length of every CIM datetime string.
const DATETIME_LEN: usize = 25;
/// Index of the `.` separating seconds from microseconds.
const DOT_POS: usize = 14;
/// Index of the offset sign or the interval `:`.
const SEP_POS: usize = 21;
const MAX_INTERVAL_DAYS: i64 = 99_999_999;

#[derive(Debug, Clone, Copy)]
enum Repr {
    Point(OffsetDateTime),
    Interval(Duration),
}

/// A CIM `datetime` value.
///
/// Holds either a point in time (`yyyymmddhhmmss.mmmmmm+zzz`) whose offset is
/// a whole number of minutes from UTC, or an interval
/// (`ddddddddhhmmss.mmmmmm:000`). Trailing fields may be wildcarded with `*`;
/// the position of the first wildcard is kept as [`precision`](Self::precision)
/// and reproduced on output.
#[derive(Debug, Clone, Copy)]
pub struct CimDateTime {
    repr: Repr,
    precision: Option<usize>,
}

impl CimDateTime {
    /// Current point in time, in UTC.
    pub fn now() -> Self {
        let now = OffsetDateTime::now_utc();
        let truncated = now
            .replace_nanosecond(now.nanosecond() / 1000 * 1000)
            .unwrap_or(now);
        CimDateTime {
            repr: Repr::Point(truncated),
            precision: None,
        }
    }

    /// Point in time. The offset must be whole minutes and the year 1..=9999.
    pub fn from_datetime(dt: OffsetDateTime) -> Result<Self> {
        if dt.offset().whole_seconds() % 60 != 0 {
            return Err(CimError::value(format!(
                "UTC offset of {dt} is not a whole number of minutes"
            )));
        }
        if !(1..=9999).contains(&dt.year()) {
            return Err(CimError::value(format!(
                "year {} cannot be represented as a CIM datetime",
                dt.year()
            )));
        }
        let dt = dt
            .replace_nanosecond(dt.nanosecond() / 1000 * 1000)
            .map_err(|e| CimError::value(e.to_string()))?;
        Ok(CimDateTime {
            repr: Repr::Point(dt),
            precision: None,
        })
    }

    /// Interval. Must be non-negative and shorter than 100000000 days.
    pub fn from_timedelta(delta: Duration) -> Result<Self> {
        if delta.is_negative() {
            return Err(CimError::value(format!(
                "negative interval {delta} cannot be represented as a CIM datetime"
            )));
        }
        if delta.whole_days() > MAX_INTERVAL_DAYS {
            return Err(CimError::value(format!(
                "interval of {} days exceeds the CIM datetime maximum",
                delta.whole_days()
            )));
        }
        let micros = delta.whole_microseconds();
        let delta = Duration::new(
            (micros / 1_000_000) as i64,
            ((micros % 1_000_000) * 1000) as i32,
        );
        Ok(CimDateTime {
            repr: Repr::Interval(delta),
            precision: None,
        })
    }

    /// Parse the 25-character CIM datetime format.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != DATETIME_LEN || !s.is_ascii() {
            return Err(CimError::parse(format!(
                "invalid CIM datetime {s:?}: expected {DATETIME_LEN} characters"
            )));
        }
        if bytes[DOT_POS] != b'.' {
            return Err(CimError::parse(format!(
                "invalid CIM datetime {s:?}: missing '.' at position {DOT_POS}"
            )));
        }
        let precision = wildcard_precision(s)?;
        let fields = Fields { text: s, precision };
        match bytes[SEP_POS] {
            b':' => {
                if &s[SEP_POS + 1..] != "000" {
                    return Err(CimError::parse(format!(
                        "invalid CIM interval {s:?}: expected ':000' suffix"
                    )));
                }
                let days = fields.int(0, 8, 0)?;
                let hours = fields.int(8, 10, 0)?;
                let minutes = fields.int(10, 12, 0)?;
                let seconds = fields.int(12, 14, 0)?;
                let micros = fields.int(15, 21, 0)?;
                if hours > 23 || minutes > 59 || seconds > 59 {
                    return Err(CimError::parse(format!(
                        "invalid CIM interval {s:?}: field out of range"
                    )));
                }
                let total_secs = days * 86_400 + hours * 3_600 + minutes * 60 + seconds;
                Ok(CimDateTime {
                    repr: Repr::Interval(Duration::new(total_secs, (micros * 1000) as i32)),
                    precision,
                })
            }
            sign @ (b'+' | b'-') => {
                let offset_minutes = s[SEP_POS + 1..]
                    .parse::<i32>()
                    .ok()
                    .filter(|_| s[SEP_POS + 1..].bytes().all(|b| b.is_ascii_digit()))
                    .ok_or_else(|| {
                        CimError::parse(format!("invalid CIM datetime {s:?}: bad UTC offset"))
                    })?;
                let offset_minutes = if sign == b'-' {
                    -offset_minutes
                } else {
                    offset_minutes
                };
                let year = fields.int(0, 4, 1)?;
                let month = fields.int(4, 6, 1)?;
                let day = fields.int(6, 8, 1)?;
                let hour = fields.int(8, 10, 0)?;
                let minute = fields.int(10, 12, 0)?;
                let second = fields.int(12, 14, 0)?;
                let micros = fields.int(15, 21, 0)?;
                let invalid =
                    |e: time::error::ComponentRange| CimError::parse(format!("invalid CIM datetime {s:?}: {e}"));
                if year < 1 {
                    return Err(CimError::parse(format!(
                        "invalid CIM datetime {s:?}: year must be at least 1"
                    )));
                }
                let month = Month::try_from(month as u8).map_err(invalid)?;
                let date = Date::from_calendar_date(year as i32, month, day as u8).map_err(invalid)?;
                let time = Time::from_hms_micro(hour as u8, minute as u8, second as u8, micros as u32)
                    .map_err(invalid)?;
                let offset = UtcOffset::from_whole_seconds(offset_minutes * 60).map_err(invalid)?;
                Ok(CimDateTime {
                    repr: Repr::Point(PrimitiveDateTime::new(date, time).assume_offset(offset)),
                    precision,
                })
            }
            _ => Err(CimError::parse(format!(
                "invalid CIM datetime {s:?}: expected '+', '-' or ':' at position {SEP_POS}"
            ))),
        }
    }

    pub fn is_interval(&self) -> bool {
        matches!(self.repr, Repr::Interval(_))
    }

    /// The point in time, if this is not an interval.
    pub fn datetime(&self) -> Option<OffsetDateTime> {
        match self.repr {
            Repr::Point(dt) => Some(dt),
            Repr::Interval(_) => None,
        }
    }

    /// The interval, if this is one.
    pub fn timedelta(&self) -> Option<Duration> {
        match self.repr {
            Repr::Interval(delta) => Some(delta),
            Repr::Point(_) => None,
        }
    }

    /// Offset from UTC in minutes. `None` for intervals.
    pub fn minutes_from_utc(&self) -> Option<i32> {
        self.datetime().map(|dt| dt.offset().whole_seconds() / 60)
    }

    /// Index of the first wildcarded character, if any.
    pub fn precision(&self) -> Option<usize> {
        self.precision
    }
}

fn wildcard_precision(s: &str) -> Result<Option<usize>> {
    let head = &s.as_bytes()[..SEP_POS];
    let Some(first) = head.iter().position(|&b| b == b'*') else {
        return Ok(None);
    };
    let contiguous = head[first..]
        .iter()
        .enumerate()
        .all(|(i, &b)| b == b'*' || (first + i == DOT_POS && b == b'.'));
    if !contiguous {
        return Err(CimError::parse(format!(
            "invalid CIM datetime {s:?}: wildcards must form a trailing run"
        )));
    }
    Ok(Some(first))
}

struct Fields<'a> {
    text: &'a str,
    precision: Option<usize>,
}

impl Fields<'_> {
    /// Integer value of `text[start..end]`. A wildcarded tail is zero-filled;
    /// a fully wildcarded field yields `default`.
    fn int(&self, start: usize, end: usize, default: i64) -> Result<i64> {
        let field = &self.text[start..end];
        let digits = match self.precision {
            Some(p) if p <= start => return Ok(default),
            Some(p) if p < end => &field[..p - start],
            _ => field,
        };
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CimError::parse(format!(
                "invalid CIM datetime {:?}: non-digit in field {field:?}",
                self.text
            )));
        }
        let value = digits.parse::<i64>().unwrap_or(0);
        if digits.len() == field.len() {
            return Ok(value);
        }
        let scale = 10i64.pow((field.len() - digits.len()) as u32);
        Ok((value * scale).max(default))
    }
}

impl fmt::Display for CimDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = match self.repr {
            Repr::Point(dt) => {
                let minutes = dt.offset().whole_seconds() / 60;
                let sign = if minutes < 0 { '-' } else { '+' };
                format!(
                    "{:04}{:02}{:02}{:02}{:02}{:02}.{:06}{}{:03}",
                    dt.year(),
                    u8::from(dt.month()),
                    dt.day(),
                    dt.hour(),
                    dt.minute(),
                    dt.second(),
                    dt.microsecond(),
                    sign,
                    minutes.abs()
                )
            }
            Repr::Interval(delta) => {
                let total = delta.whole_seconds();
                format!(
                    "{:08}{:02}{:02}{:02}.{:06}:000",
                    total / 86_400,
                    total % 86_400 / 3_600,
                    total % 3_600 / 60,
                    total % 60,
                    delta.subsec_microseconds()
                )
            }
        };
        if let Some(p) = self.precision {
            text = text
                .char_indices()
                .map(|(i, c)| if i >= p && i < SEP_POS && i != DOT_POS { '*' } else { c })
                .collect();
        }
        f.write_str(&text)
    }
}

impl FromStr for CimDateTime {
    type Err = CimError;

    fn from_str(s: &str) -> Result<Self> {
        CimDateTime::parse(s)
    }
}

impl TryFrom<OffsetDateTime> for CimDateTime {
    type Error = CimError;

    fn try_from(dt: OffsetDateTime) -> Result<Self> {
        CimDateTime::from_datetime(dt)
    }
}

impl TryFrom<Duration> for CimDateTime {
    type Error = CimError;

    fn try_from(delta: Duration) -> Result<Self> {
        CimDateTime::from_timedelta(delta)
    }
}

impl PartialEq for CimDateTime {
    fn eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::Point(a), Repr::Point(b)) => a == b,
            (Repr::Interval(a), Repr::Interval(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CimDateTime {}

impl Hash for CimDateTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.repr {
            Repr::Point(dt) => {
                0u8.hash(state);
                dt.unix_timestamp_nanos().hash(state);
            }
            Repr::Interval(delta) => {
                1u8.hash(state);
                delta.whole_nanoseconds().hash(state);
            }
        }
    }
}

impl PartialOrd for CimDateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (&self.repr, &other.repr) {
            (Repr::Point(a), Repr::Point(b)) => Some(a.cmp(b)),
            (Repr::Interval(a), Repr::Interval(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_roundtrip() {
        let s = "20140924193040.654321+120";
        let dt = CimDateTime::parse(s).unwrap();
        assert!(!dt.is_interval());
        assert_eq!(dt.minutes_from_utc(), Some(120));
        assert_eq!(dt.to_string(), s);
        let point = dt.datetime().unwrap();
        assert_eq!(point.year(), 2014);
        assert_eq!(point.microsecond(), 654_321);
    }

    #[test]
    fn negative_offset_roundtrip() {
        let s = "19991231235959.000000-300";
        assert_eq!(CimDateTime::parse(s).unwrap().to_string(), s);
    }

    #[test]
    fn interval_roundtrip() {
        let s = "00000183132542.234567:000";
        let dt = CimDateTime::parse(s).unwrap();
        assert!(dt.is_interval());
        assert_eq!(dt.minutes_from_utc(), None);
        let delta = dt.timedelta().unwrap();
        assert_eq!(delta.whole_days(), 183);
        assert_eq!(dt.to_string(), s);
    }

    #[test]
    fn wildcard_precision_is_kept() {
        let s = "2014092419****.******+000";
        let dt = CimDateTime::parse(s).unwrap();
        assert_eq!(dt.precision(), Some(10));
        assert_eq!(dt.to_string(), s);
        assert_eq!(dt.datetime().unwrap().minute(), 0);

        let interval = "00000010******.******:000";
        assert_eq!(CimDateTime::parse(interval).unwrap().to_string(), interval);
    }

    #[test]
    fn rejects_malformed() {
        for bad in [
            "2014092419304.654321+120",
            "20140924193040,654321+120",
            "20141324193040.654321+120",
            "2014092419**40.654321+120",
            "20140924193040.654321*120",
            "00000000250000.000000:000",
            "00000000000000.000000:001",
        ] {
            assert!(
                matches!(CimDateTime::parse(bad), Err(CimError::Parse(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn equality_compares_instants() {
        let a = CimDateTime::parse("20140924193040.000000+060").unwrap();
        let b = CimDateTime::parse("20140924183040.000000+000").unwrap();
        assert_eq!(a, b);
        let c = CimDateTime::parse("00000000000001.000000:000").unwrap();
        assert_ne!(a, c);
        assert_eq!(a.partial_cmp(&c), None);
        let d = CimDateTime::parse("00000000000002.000000:000").unwrap();
        assert_eq!(c.partial_cmp(&d), Some(Ordering::Less));
    }

    #[test]
    fn conversions_from_time_values() {
        assert!(CimDateTime::try_from(Duration::seconds(-1)).is_err());
        let dt = CimDateTime::try_from(Duration::seconds(90_061)).unwrap();
        assert_eq!(dt.to_string(), "00000001010101.000000:000");
        let odd = OffsetDateTime::UNIX_EPOCH.to_offset(UtcOffset::from_whole_seconds(30).unwrap());
        assert!(matches!(CimDateTime::try_from(odd), Err(CimError::Value(_))));
        let epoch = CimDateTime::try_from(OffsetDateTime::UNIX_EPOCH).unwrap();
        assert_eq!(epoch.to_string(), "19700101000000.000000+000");
        assert!(!CimDateTime::now().is_interval());
    }
}

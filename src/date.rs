//! HTTP-date parsing (RFC 2616 section 3.3.1).
//!
//! Three historical formats are accepted, picked by the length of the value:
//!
//! ```text
//! Sun, 06 Nov 1994 08:49:37 GMT    ; RFC 1123, 29 characters
//! Sun Nov  6 08:49:37 1994         ; asctime(), 24 characters
//! Sunday, 06-Nov-94 08:49:37 GMT   ; RFC 1036, anything else
//! ```
//!
//! The formats are never tried against each other: a 29 character value that
//! is not RFC 1123 is simply not a date.

use crate::patterns::Patterns;
use chrono::{DateTime, Duration, TimeZone as _, Utc};
use regex::{Captures, Regex};

const RFC1123_LEN: usize = 29;
const ASCTIME_LEN: usize = 24;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// Also used for Netscape cookie expiry dates, which share its shape
    /// apart from the dashes and are never obsolete.
    Rfc1123,
    Rfc1036,
    Asctime,
}

/// Calendar fields of a parsed date. The zone is always GMT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    pub day: u32,
    /// Zero-based, `0` is January.
    pub month: u32,
    pub year: i32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub format: DateFormat,
}

impl ParsedTimestamp {
    pub fn is_obsolete(&self) -> bool {
        self.format != DateFormat::Rfc1123
    }

    /// The absolute instant these fields name.
    ///
    /// Fields the grammars let through but the calendar does not know (day
    /// `00`, hour `29`) carry into the neighbouring unit, so
    /// `Mon, 00 Jan 2001 24:00:00 GMT` is 2001-01-01T00:00:00Z.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        let first_of_month = Utc
            .with_ymd_and_hms(self.year, self.month + 1, 1, 0, 0, 0)
            .single()?;

        Some(
            first_of_month
                + Duration::days(i64::from(self.day) - 1)
                + Duration::hours(i64::from(self.hour))
                + Duration::minutes(i64::from(self.minute))
                + Duration::seconds(i64::from(self.second)),
        )
    }
}

/// Parses an HTTP-date in any of the three formats.
pub fn parse_date(value: &str, patterns: &Patterns) -> Option<ParsedTimestamp> {
    match value.len() {
        RFC1123_LEN => fields(&patterns.rfc1123, value, DateFormat::Rfc1123),
        ASCTIME_LEN => fields(&patterns.asctime, value, DateFormat::Asctime),
        _ => fields(&patterns.rfc1036, value, DateFormat::Rfc1036),
    }
}

/// Parses the `expires` attribute of a Set-Cookie header,
/// `Wdy, DD-Mon-YYYY HH:MM:SS GMT`.
pub fn parse_cookie_date(value: &str, patterns: &Patterns) -> Option<ParsedTimestamp> {
    fields(&patterns.cookie_expires, value, DateFormat::Rfc1123)
}

fn fields(pattern: &Regex, value: &str, format: DateFormat) -> Option<ParsedTimestamp> {
    let caps = pattern.captures(value)?;

    let year = number(&caps, "year")?;
    let year = match format {
        DateFormat::Rfc1036 => 2000 + year,
        DateFormat::Rfc1123 | DateFormat::Asctime => year,
    };

    Some(ParsedTimestamp {
        day: number(&caps, "day")?,
        month: month(caps.name("month")?.as_str())?,
        year: i32::try_from(year).ok()?,
        hour: number(&caps, "hour")?,
        minute: number(&caps, "minute")?,
        second: number(&caps, "second")?,
        format,
    })
}

fn number(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name)?.as_str().trim_start().parse().ok()
}

fn month(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| *m == name)
        .and_then(|index| u32::try_from(index).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: &str) -> Option<ParsedTimestamp> {
        parse_date(value, &Patterns::new().unwrap())
    }

    #[test]
    fn rfc1123() {
        let ts = parse("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        assert_eq!(ts.format, DateFormat::Rfc1123);
        assert!(!ts.is_obsolete());
        assert_eq!((ts.day, ts.month, ts.year), (6, 10, 1994));
        assert_eq!((ts.hour, ts.minute, ts.second), (8, 49, 37));
        assert_eq!(
            ts.instant().unwrap(),
            Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap()
        );
    }

    #[test]
    fn asctime_with_padded_day() {
        let ts = parse("Sun Nov  6 08:49:37 1994").unwrap();
        assert_eq!(ts.format, DateFormat::Asctime);
        assert!(ts.is_obsolete());
        assert_eq!(ts.day, 6);
        assert_eq!(
            ts.instant().unwrap(),
            Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap()
        );
    }

    #[test]
    fn rfc1036_years_are_2000_based() {
        let ts = parse("Sunday, 06-Nov-94 08:49:37 GMT").unwrap();
        assert_eq!(ts.format, DateFormat::Rfc1036);
        assert!(ts.is_obsolete());
        assert_eq!(ts.year, 2094);
    }

    #[test]
    fn formats_agree_on_the_same_instant() {
        let rfc1123 = parse("Sat, 06 Nov 2004 08:49:37 GMT").unwrap();
        let rfc1036 = parse("Saturday, 06-Nov-04 08:49:37 GMT").unwrap();
        let asctime = parse("Sat Nov  6 08:49:37 2004").unwrap();

        assert_eq!(rfc1123.instant(), rfc1036.instant());
        assert_eq!(rfc1123.instant(), asctime.instant());
    }

    #[test]
    fn length_selects_the_grammar() {
        // Shapes are only tried at their own length.
        assert!(parse("Sun, 06 Nov 1994 08:49:37 GMT ").is_none());
        assert!(parse("Sun Nov  6 08:49:37 1994 ").is_none());
        assert!(parse("Sun, 06 Nov 1994 08:49:37 UTC").is_none());
        assert!(parse("sun, 06 nov 1994 08:49:37 GMT").is_none());
        assert!(parse("").is_none());
        assert!(parse("Sun, 06 Nov 1994 08:60:37 GMT").is_none());
    }

    #[test]
    fn out_of_range_fields_carry() {
        let ts = parse("Mon, 00 Jan 2001 24:00:00 GMT").unwrap();
        assert_eq!(
            ts.instant().unwrap(),
            Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn cookie_dates_use_four_digit_years() {
        let p = Patterns::new().unwrap();
        let ts = parse_cookie_date("Sun, 06-Nov-1994 08:49:37 GMT", &p).unwrap();
        assert_eq!(ts.year, 1994);
        assert!(!ts.is_obsolete());
        assert!(parse_cookie_date("Sun, 06 Nov 1994 08:49:37 GMT", &p).is_none());
    }
}

//! Calendar selection and the date values exchanged with providers.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::EphemerisError;

/// Julian Date of the J2000.0 epoch (2000-Jan-01 12:00 TT).
pub const J2000_JD: f64 = 2_451_545.0;

/// Calendar used to interpret a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CalendarType {
    Julian,
    #[default]
    Gregorian,
}

impl CalendarType {
    /// Native calendar flag.
    pub const fn code(self) -> i32 {
        match self {
            Self::Julian => 0,
            Self::Gregorian => 1,
        }
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Julian),
            1 => Some(Self::Gregorian),
            _ => None,
        }
    }
}

/// Calendar date with a decimal hour, as produced by `RevJul`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarDate {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: f64,
}

impl CalendarDate {
    pub const fn new(year: i32, month: i32, day: i32, hour: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour,
        }
    }
}

/// UTC date and clock time, as produced by `JdETToUTC`/`JdUT1ToUTC`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtcDateTime {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: f64,
}

impl UtcDateTime {
    pub const fn new(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Clock time as a decimal hour (the form `UTCToJD` takes).
    pub fn decimal_hour(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.0 + self.second / 3600.0
    }

    /// Seconds elapsed since 00:00 of the same day.
    pub fn seconds_of_day(&self) -> f64 {
        self.hour as f64 * 3600.0 + self.minute as f64 * 60.0 + self.second
    }

    /// Whether both values name the same calendar day.
    pub fn same_day(&self, other: &Self) -> bool {
        self.year == other.year && self.month == other.month && self.day == other.day
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let whole = self.second.trunc();
        let frac = self.second - whole;
        if frac.abs() < 1e-9 {
            write!(
                f,
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                self.year, self.month, self.day, self.hour, self.minute, whole as i32
            )
        } else {
            write!(
                f,
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:09.6}Z",
                self.year, self.month, self.day, self.hour, self.minute, self.second
            )
        }
    }
}

/// Parses `YYYY-MM-DDThh:mm:ss[.fff]Z`; a leading `-` gives a negative year.
impl FromStr for UtcDateTime {
    type Err = EphemerisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EphemerisError::InvalidInput(format!("invalid UTC timestamp: {s}"));

        let body = s.trim().strip_suffix('Z').ok_or_else(invalid)?;
        let (date, time) = body.split_once('T').ok_or_else(invalid)?;

        let (negative, date) = match date.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, date),
        };
        let date_parts: Vec<&str> = date.split('-').collect();
        let time_parts: Vec<&str> = time.split(':').collect();
        if date_parts.len() != 3 || time_parts.len() != 3 {
            return Err(invalid());
        }

        let year: i32 = date_parts[0].parse().map_err(|_| invalid())?;
        let month: i32 = date_parts[1].parse().map_err(|_| invalid())?;
        let day: i32 = date_parts[2].parse().map_err(|_| invalid())?;
        let hour: i32 = time_parts[0].parse().map_err(|_| invalid())?;
        let minute: i32 = time_parts[1].parse().map_err(|_| invalid())?;
        let second: f64 = time_parts[2].parse().map_err(|_| invalid())?;

        // Range checks only; day-of-month validity is the provider's call.
        if !(1..=12).contains(&month)
            || !(1..=31).contains(&day)
            || !(0..=23).contains(&hour)
            || !(0..=59).contains(&minute)
            || !(0.0..61.0).contains(&second)
        {
            return Err(invalid());
        }

        let year = if negative { -year } else { year };
        Ok(Self::new(year, month, day, hour, minute, second))
    }
}

/// Ephemeris Time and Universal Time for one UTC instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JulianDayPair {
    pub et: f64,
    pub ut: f64,
}

impl JulianDayPair {
    /// ET − UT in seconds, i.e. the ΔT applied by the conversion.
    pub fn delta_t_seconds(&self) -> f64 {
        (self.et - self.ut) * 86_400.0
    }
}

/// Split a decimal hour into whole hours, whole minutes and seconds.
///
/// Seconds are never carried into the minute, so values just below a
/// minute boundary keep `s` close to 60. An hour of 24 or more stays in
/// the last minute of the day as `23:59:ss` with `ss >= 60`, which is how
/// a leap second is written.
pub fn split_hour(hour: f64) -> (i32, i32, f64) {
    let total_seconds = hour * 3600.0;
    if total_seconds >= 86_400.0 {
        return (23, 59, total_seconds - 86_340.0);
    }
    let h = (total_seconds / 3600.0).floor();
    let m = ((total_seconds - h * 3600.0) / 60.0).floor();
    let s = total_seconds - h * 3600.0 - m * 60.0;
    (h as i32, m as i32, s.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_codes() {
        assert_eq!(CalendarType::Julian.code(), 0);
        assert_eq!(CalendarType::Gregorian.code(), 1);
        assert_eq!(CalendarType::from_code(1), Some(CalendarType::Gregorian));
        assert_eq!(CalendarType::from_code(2), None);
        assert_eq!(CalendarType::default(), CalendarType::Gregorian);
    }

    #[test]
    fn split_whole_hour() {
        assert_eq!(split_hour(12.0), (12, 0, 0.0));
    }

    #[test]
    fn split_fractional_hour() {
        let (h, m, s) = split_hour(13.5 + 15.0 / 3600.0);
        assert_eq!((h, m), (13, 30));
        assert!((s - 15.0).abs() < 1e-6, "seconds = {s}");
    }

    #[test]
    fn split_keeps_values_below_a_boundary() {
        let (h, m, s) = split_hour(1.0 - 1e-14);
        assert_eq!((h, m), (0, 59));
        assert!((s - 60.0).abs() < 1e-6 && s < 61.0, "seconds = {s}");

        let (h, m, s) = split_hour(24.0 - 1e-13);
        assert_eq!((h, m), (23, 59));
        assert!(s < 61.0, "seconds = {s}");
    }

    #[test]
    fn split_leap_second() {
        let (h, m, s) = split_hour(23.0 + 59.0 / 60.0 + 60.5 / 3600.0);
        assert_eq!((h, m), (23, 59));
        assert!((s - 60.5).abs() < 1e-6, "seconds = {s}");
    }

    #[test]
    fn decimal_hour_inverts_split() {
        let hour = 17.123_456;
        let (h, m, s) = split_hour(hour);
        let t = UtcDateTime::new(2024, 3, 20, h, m, s);
        assert!((t.decimal_hour() - hour).abs() < 1e-9);
    }

    #[test]
    fn display_whole_seconds() {
        let t = UtcDateTime::new(2024, 1, 15, 0, 0, 0.0);
        assert_eq!(t.to_string(), "2024-01-15T00:00:00Z");
    }

    #[test]
    fn display_fractional_seconds() {
        let t = UtcDateTime::new(2024, 1, 15, 12, 30, 45.5);
        assert_eq!(t.to_string(), "2024-01-15T12:30:45.500000Z");
    }

    #[test]
    fn parse_timestamp() {
        let t: UtcDateTime = "2024-03-20T12:30:45.25Z".parse().unwrap();
        assert_eq!(t, UtcDateTime::new(2024, 3, 20, 12, 30, 45.25));
    }

    #[test]
    fn parse_negative_year() {
        let t: UtcDateTime = "-0500-06-01T00:00:00Z".parse().unwrap();
        assert_eq!(t.year, -500);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("2024-03-20 12:00:00".parse::<UtcDateTime>().is_err());
        assert!("2024-13-20T12:00:00Z".parse::<UtcDateTime>().is_err());
        assert!("2024-03-20T24:00:00Z".parse::<UtcDateTime>().is_err());
        assert!("2024-03T12:00:00Z".parse::<UtcDateTime>().is_err());
    }

    #[test]
    fn delta_t_seconds_from_pair() {
        let pair = JulianDayPair {
            et: J2000_JD + 69.184 / 86_400.0,
            ut: J2000_JD,
        };
        // f64 spacing near JD 2.45e6 is about 4e-5 s.
        assert!((pair.delta_t_seconds() - 69.184).abs() < 1e-4);
    }
}

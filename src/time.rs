use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Minute-of-day arithmetic happens on plain i32s so that an interval end
/// may exceed 1440 before wrapping (e.g. a 23:30 start plus 90 minutes).
pub type Minutes = i32;

pub const MINUTES_PER_DAY: Minutes = 1440;

/// A clock time within one day, stored as minute-of-day in `[0, 1440)`.
///
/// Serializes as zero-padded `"HH:MM"`. Construction from raw minutes wraps
/// modulo 1440, so an end time derived past midnight reads as an
/// early-morning time; callers comparing start/end must expect the wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn new(hours: u16, minutes: u16) -> Option<Self> {
        if hours < 24 && minutes < 60 {
            Some(Self(hours * 60 + minutes))
        } else {
            None
        }
    }

    /// Wraps modulo 1440 (negative inputs wrap backwards from midnight).
    pub fn from_minutes(minutes: Minutes) -> Self {
        Self(minutes.rem_euclid(MINUTES_PER_DAY) as u16)
    }

    pub fn minutes(self) -> Minutes {
        self.0 as Minutes
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Raised when a clock-time string is not `"HH:MM"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFormat(pub String);

impl fmt::Display for InvalidFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid time: {:?} (expected \"HH:MM\")", self.0)
    }
}

impl std::error::Error for InvalidFormat {}

impl FromStr for TimeOfDay {
    type Err = InvalidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || InvalidFormat(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(bad)?;
        let hours: u16 = h.parse().map_err(|_| bad())?;
        let minutes: u16 = m.parse().map_err(|_| bad())?;
        TimeOfDay::new(hours, minutes).ok_or_else(bad)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Half-open minute interval `[start, end)`.
///
/// `end` may be less than `start` for a stored reservation whose end time
/// wrapped past midnight; such a span never tests as overlapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Minutes,
    pub end: Minutes,
}

impl Span {
    pub fn new(start: Minutes, end: Minutes) -> Self {
        Self { start, end }
    }

    /// Half-open overlap test: touching endpoints do not overlap, so
    /// back-to-back bookings never conflict.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format() {
        let t: TimeOfDay = "19:00".parse().unwrap();
        assert_eq!(t.minutes(), 19 * 60);
        assert_eq!(t.to_string(), "19:00");
        assert_eq!("00:05".parse::<TimeOfDay>().unwrap().to_string(), "00:05");
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "19", "19:", ":30", "7pm", "19:60", "24:00", "19:00:00", "1a:30"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn from_minutes_wraps() {
        assert_eq!(TimeOfDay::from_minutes(1500).to_string(), "01:00");
        assert_eq!(TimeOfDay::from_minutes(-30).to_string(), "23:30");
        assert_eq!(TimeOfDay::from_minutes(1440).to_string(), "00:00");
    }

    #[test]
    fn overlap_half_open() {
        // Touching endpoints: [600,690) and [690,780) do not overlap.
        assert!(!Span::new(600, 690).overlaps(&Span::new(690, 780)));
        assert!(Span::new(600, 690).overlaps(&Span::new(650, 740)));
        assert!(Span::new(650, 740).overlaps(&Span::new(600, 690)));
        assert!(!Span::new(600, 690).overlaps(&Span::new(500, 600)));
    }

    #[test]
    fn wrapped_span_never_overlaps() {
        // A reservation stored as 23:30 -> 01:00 yields end < start.
        let wrapped = Span::new(1410, 60);
        assert!(!wrapped.overlaps(&Span::new(1380, 1440)));
    }

    #[test]
    fn serde_string_form() {
        let t: TimeOfDay = "08:30".parse().unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"08:30\"");
        let back: TimeOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<TimeOfDay>("\"25:00\"").is_err());
    }
}

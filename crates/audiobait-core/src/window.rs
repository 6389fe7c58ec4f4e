//! Recurring daily playback window.
//!
//! A window is a pair of wall-clock times without a date. When `start`
//! is later than `end` the window runs through midnight, so `22:00` to
//! `06:00` covers the night. A window whose bounds are equal is treated
//! as always open.
//!
//! All computations take `now` as a parameter; the window never reads
//! the system clock itself. The `_at` variants resolve wall-clock times
//! in `now`'s timezone, so the wait they return is real elapsed time
//! even across a daylight-saving change.

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Daily time-of-day interval during which bursts may run.
///
/// Containment is inclusive at `start` and exclusive at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    #[serde(with = "time_of_day")]
    start: NaiveTime,
    #[serde(with = "time_of_day")]
    end: NaiveTime,
}

impl ScheduleWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// A window that never closes.
    pub fn always_open() -> Self {
        Self::new(NaiveTime::MIN, NaiveTime::MIN)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// True when the window spans midnight.
    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    /// Whether `time` falls inside the window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        match self.start.cmp(&self.end) {
            Ordering::Equal => true,
            Ordering::Less => self.start <= time && time < self.end,
            Ordering::Greater => time >= self.start || time < self.end,
        }
    }

    /// The next instant at or after `now` when the window is open.
    ///
    /// Returns `now` itself if the window is already open.
    pub fn next_open(&self, now: NaiveDateTime) -> NaiveDateTime {
        if self.contains(now.time()) {
            return now;
        }
        let start_today = now.date().and_time(self.start);
        if start_today > now {
            start_today
        } else {
            start_today + chrono::Duration::days(1)
        }
    }

    /// How long to wait from `now` until the window opens.
    ///
    /// Zero while inside the window.
    pub fn time_until_open(&self, now: NaiveDateTime) -> Duration {
        (self.next_open(now) - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// The instant the window next opens, as seen from `now`'s timezone.
    pub fn next_open_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let wall = now.naive_local();
        let opens = self.next_open(wall);
        if opens == wall {
            return now.clone();
        }
        resolve_local(&now.timezone(), opens)
    }

    /// Real time from `now` until the window opens. Zero while inside.
    pub fn time_until_open_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        let opens = self.next_open_at(now).with_timezone(&Utc);
        (opens - now.with_timezone(&Utc))
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// First instant at which the clock in `tz` reads `wall` or later.
///
/// An ambiguous wall time (clocks going back) resolves to its earlier
/// occurrence. A skipped one (clocks going forward) resolves to the
/// moment of the jump.
fn resolve_local<Tz: TimeZone>(tz: &Tz, wall: NaiveDateTime) -> DateTime<Tz> {
    if let Some(instant) = tz.from_local_datetime(&wall).earliest() {
        return instant;
    }
    // UTC offsets stay within +-14h, so the answer lies in this range.
    let mut lo = (wall - chrono::Duration::hours(15)).and_utc().timestamp();
    let mut hi = (wall + chrono::Duration::hours(15)).and_utc().timestamp();
    let reads = |secs: i64| {
        DateTime::from_timestamp(secs, 0).map(|utc| tz.from_utc_datetime(&utc.naive_utc()))
    };
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        match reads(mid) {
            Some(t) if t.naive_local() >= wall => hi = mid,
            _ => lo = mid,
        }
    }
    reads(hi).unwrap_or_else(|| {
        let offset = tz.offset_from_utc_datetime(&wall).fix();
        tz.from_utc_datetime(&(wall - offset))
    })
}

impl Default for ScheduleWindow {
    fn default() -> Self {
        Self::always_open()
    }
}

impl fmt::Display for ScheduleWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
}

/// Serde adapter storing a `NaiveTime` as `HH:MM[:SS]`.
pub(crate) mod time_of_day {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let text = if time.second() == 0 {
            time.format("%H:%M").to_string()
        } else {
            time.format("%H:%M:%S").to_string()
        };
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw)
            .map_err(|e| serde::de::Error::custom(format!("invalid time of day '{raw}': {e}")))
    }
}

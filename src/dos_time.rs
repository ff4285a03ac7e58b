//! Conversion of timestamps into the packed MS-DOS date and time words used by ZIP headers.
//!
//! Only years 1980 to 2107 can be represented. Earlier timestamps are stored as
//! 1980-01-01 00:00:00, later ones as 2107-12-31 23:59:58.
//! Seconds are stored with 2 second resolution and get rounded down.

use std::time::SystemTime;

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};

const MIN_YEAR: i32 = 1980;
const MAX_YEAR: i32 = 2107;

/// Packed DOS date and time of an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DosDatetime {
    pub date: u16,
    pub time: u16,
}

impl DosDatetime {
    /// 1980-01-01 00:00:00
    pub const MIN: DosDatetime = DosDatetime {
        date: (1 << 5) | 1,
        time: 0,
    };

    /// 2107-12-31 23:59:58
    pub const MAX: DosDatetime = DosDatetime {
        date: (((MAX_YEAR - MIN_YEAR) as u16) << 9) | (12 << 5) | 31,
        time: (23 << 11) | (59 << 5) | 29,
    };

    /// Packs a calendar date and time, clamping it to the representable range.
    pub fn from_datetime(datetime: &NaiveDateTime) -> Self {
        if datetime.year() < MIN_YEAR {
            return Self::MIN;
        }
        if datetime.year() > MAX_YEAR {
            return Self::MAX;
        }

        let date = ((datetime.year() - MIN_YEAR) as u16) << 9
            | (datetime.month() as u16) << 5
            | datetime.day() as u16;
        let time = (datetime.hour() as u16) << 11
            | (datetime.minute() as u16) << 5
            | (datetime.second() / 2) as u16;

        DosDatetime { date, time }
    }

    /// Converts a system time to the calendar representation in the given timezone and packs it.
    pub fn from_system_time<Tz: TimeZone>(system_time: SystemTime, tz: &Tz) -> Self {
        Self::from_datetime(&system_time_in_timezone(system_time, tz))
    }

    pub fn year(&self) -> i32 {
        MIN_YEAR + (self.date >> 9) as i32
    }

    pub fn month(&self) -> u32 {
        ((self.date >> 5) & 0x0f) as u32
    }

    pub fn day(&self) -> u32 {
        (self.date & 0x1f) as u32
    }

    pub fn hour(&self) -> u32 {
        (self.time >> 11) as u32
    }

    pub fn minute(&self) -> u32 {
        ((self.time >> 5) & 0x3f) as u32
    }

    pub fn second(&self) -> u32 {
        ((self.time & 0x1f) * 2) as u32
    }
}

impl Default for DosDatetime {
    fn default() -> Self {
        Self::MIN
    }
}

/// Packs the date part: years since 1980 in bits 9-15, month in bits 5-8, day in bits 0-4.
pub fn encode_date(datetime: &NaiveDateTime) -> u16 {
    DosDatetime::from_datetime(datetime).date
}

/// Packs the time part: hour in bits 11-15, minute in bits 5-10, seconds / 2 in bits 0-4.
pub fn encode_time(datetime: &NaiveDateTime) -> u16 {
    DosDatetime::from_datetime(datetime).time
}

pub(crate) fn system_time_in_timezone<Tz: TimeZone>(
    system_time: SystemTime,
    tz: &Tz,
) -> NaiveDateTime {
    DateTime::<Utc>::from(system_time)
        .with_timezone(tz)
        .naive_local()
}

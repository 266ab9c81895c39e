//! Calendar arithmetic behind the `T` modifiers
//!
//! Units: `S` milliseconds, `s` seconds, `m` minutes, `H` hours, `d` days,
//! `w` weeks (starting Monday), `M` months, `y` years.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let unit = match symbol {
            "S" => TimeUnit::Millisecond,
            "s" => TimeUnit::Second,
            "m" => TimeUnit::Minute,
            "H" => TimeUnit::Hour,
            "d" => TimeUnit::Day,
            "w" => TimeUnit::Week,
            "M" => TimeUnit::Month,
            "y" => TimeUnit::Year,
            _ => return None,
        };
        Some(unit)
    }
}

/// `value + amount units`; `None` on calendar overflow
pub fn shift(value: NaiveDateTime, unit: TimeUnit, amount: i64) -> Option<NaiveDateTime> {
    let by_duration = |duration: Option<Duration>| duration.and_then(|d| value.checked_add_signed(d));
    match unit {
        TimeUnit::Millisecond => by_duration(Duration::try_milliseconds(amount)),
        TimeUnit::Second => by_duration(Duration::try_seconds(amount)),
        TimeUnit::Minute => by_duration(Duration::try_minutes(amount)),
        TimeUnit::Hour => by_duration(Duration::try_hours(amount)),
        TimeUnit::Day => by_duration(Duration::try_days(amount)),
        TimeUnit::Week => by_duration(Duration::try_weeks(amount)),
        TimeUnit::Month => shift_months(value, amount),
        TimeUnit::Year => amount.checked_mul(12).and_then(|months| shift_months(value, months)),
    }
}

fn shift_months(value: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        value.checked_add_months(magnitude)
    } else {
        value.checked_sub_months(magnitude)
    }
}

/// First instant of the unit containing `value`
pub fn start_of(value: NaiveDateTime, unit: TimeUnit) -> Option<NaiveDateTime> {
    let midnight = |date: NaiveDate| date.and_time(NaiveTime::MIN);
    match unit {
        TimeUnit::Millisecond => value.with_nanosecond(value.nanosecond() / 1_000_000 * 1_000_000),
        TimeUnit::Second => value.with_nanosecond(0),
        TimeUnit::Minute => value.with_nanosecond(0)?.with_second(0),
        TimeUnit::Hour => value.with_nanosecond(0)?.with_second(0)?.with_minute(0),
        TimeUnit::Day => Some(midnight(value.date())),
        TimeUnit::Week => {
            let back = i64::from(value.weekday().num_days_from_monday());
            value
                .date()
                .checked_sub_signed(Duration::try_days(back)?)
                .map(midnight)
        }
        TimeUnit::Month => value.date().with_day(1).map(midnight),
        TimeUnit::Year => NaiveDate::from_ymd_opt(value.year(), 1, 1).map(midnight),
    }
}

/// First instant of the unit following the one containing `value`
pub fn start_of_next(value: NaiveDateTime, unit: TimeUnit) -> Option<NaiveDateTime> {
    start_of(value, unit).and_then(|start| shift(start, unit, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_shift_units() {
        let base = at("2008-01-31 10:30:15");
        assert_eq!(shift(base, TimeUnit::Day, 1), Some(at("2008-02-01 10:30:15")));
        assert_eq!(shift(base, TimeUnit::Hour, -11), Some(at("2008-01-30 23:30:15")));
        assert_eq!(shift(base, TimeUnit::Month, 1), Some(at("2008-02-29 10:30:15")));
        assert_eq!(shift(base, TimeUnit::Year, -1), Some(at("2007-01-31 10:30:15")));
        assert_eq!(shift(base, TimeUnit::Week, 1), Some(at("2008-02-07 10:30:15")));
    }

    #[test]
    fn test_start_of_units() {
        // 2008-01-31 is a Thursday
        let base = at("2008-01-31 10:30:15");
        assert_eq!(start_of(base, TimeUnit::Day), Some(at("2008-01-31 00:00:00")));
        assert_eq!(start_of(base, TimeUnit::Week), Some(at("2008-01-28 00:00:00")));
        assert_eq!(start_of(base, TimeUnit::Month), Some(at("2008-01-01 00:00:00")));
        assert_eq!(start_of(base, TimeUnit::Hour), Some(at("2008-01-31 10:00:00")));
        assert_eq!(start_of_next(base, TimeUnit::Year), Some(at("2009-01-01 00:00:00")));
        assert_eq!(start_of_next(base, TimeUnit::Month), Some(at("2008-02-01 00:00:00")));
        assert_eq!(start_of_next(base, TimeUnit::Minute), Some(at("2008-01-31 10:31:00")));
    }

    #[test]
    fn test_overflow_is_none() {
        let base = at("2008-01-31 10:30:15");
        assert_eq!(shift(base, TimeUnit::Year, i64::MAX), None);
        assert_eq!(shift(base, TimeUnit::Day, i64::MAX), None);
    }
}

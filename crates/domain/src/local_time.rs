use chrono::{Duration, NaiveDate};

pub const MINUTES_PER_DAY: i64 = 24 * 60;
const MILLIS_PER_MINUTE: i64 = 1000 * 60;

/// Maps `x` into `[0, m)` regardless of the sign of `x`
pub fn normalize(x: i64, m: i64) -> i64 {
    ((x % m) + m) % m
}

/// A point in time as seen by a user whose clock is shifted a fixed
/// number of minutes from UTC. There is no notion of timezone rules here,
/// only a constant offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    /// Minutes since local midnight, always in `[0, 1439]`
    pub minute_of_day: i64,
    /// Days since 1970-01-01 in local time
    pub day: i64,
}

impl LocalTime {
    pub fn hour(&self) -> i64 {
        self.minute_of_day / 60
    }

    pub fn minute(&self) -> i64 {
        self.minute_of_day % 60
    }

    /// The local calendar date, `None` if it is outside of what chrono
    /// can represent
    pub fn date(&self) -> Option<NaiveDate> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
        epoch.checked_add_signed(Duration::try_days(self.day)?)
    }

    /// Formats the local minute as `YYYY-MM-DD HH:MM`
    pub fn format_minute(&self) -> Option<String> {
        self.date().map(|date| {
            format!(
                "{} {:02}:{:02}",
                date.format("%Y-%m-%d"),
                self.hour(),
                self.minute()
            )
        })
    }
}

/// Converts a UTC timestamp in millis to the local time of a user with the
/// given offset in minutes. Total for every offset, also those outside of a day.
pub fn to_local(now_ts: i64, offset_minutes: i64) -> LocalTime {
    let utc_minute = now_ts.div_euclid(MILLIS_PER_MINUTE);
    let utc_day = utc_minute.div_euclid(MINUTES_PER_DAY);
    let utc_minute_of_day = utc_minute.rem_euclid(MINUTES_PER_DAY);

    // Split the offset so that nothing overflows for huge offsets
    let shifted = utc_minute_of_day + normalize(offset_minutes, MINUTES_PER_DAY);
    let day_carry = offset_minutes.div_euclid(MINUTES_PER_DAY) + shifted / MINUTES_PER_DAY;

    LocalTime {
        minute_of_day: normalize(shifted, MINUTES_PER_DAY),
        day: utc_day.saturating_add(day_carry),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(h: u32, m: u32) -> i64 {
        Utc.with_ymd_and_hms(2021, 3, 10, h, m, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn normalize_is_never_negative() {
        assert_eq!(normalize(-1, 1440), 1439);
        assert_eq!(normalize(-1440, 1440), 0);
        assert_eq!(normalize(1500, 1440), 60);
        assert_eq!(normalize(0, 1440), 0);
        assert_eq!(normalize(-2881, 1440), 1439);
    }

    #[test]
    fn converts_with_common_offsets() {
        let now = ts(12, 0);
        assert_eq!(to_local(now, 0).minute_of_day, 12 * 60);
        assert_eq!(to_local(now, -720).minute_of_day, 0);
        assert_eq!(to_local(now, 720).minute_of_day, 0);
        assert_eq!(to_local(now, 330).minute_of_day, 17 * 60 + 30);
    }

    #[test]
    fn out_of_range_offset_normalizes() {
        let now = ts(8, 15);
        assert_eq!(
            to_local(now, 1500).minute_of_day,
            to_local(now, 60).minute_of_day
        );
        assert_eq!(
            to_local(now, -1500).minute_of_day,
            to_local(now, -60).minute_of_day
        );
    }

    #[test]
    fn local_date_moves_across_midnight() {
        let now = ts(23, 30);
        let local = to_local(now, 60);
        assert_eq!(local.minute_of_day, 30);
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2021, 3, 11));

        let now = ts(0, 30);
        let local = to_local(now, -60);
        assert_eq!(local.minute_of_day, 23 * 60 + 30);
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2021, 3, 9));

        // More than a day ahead
        let local = to_local(ts(0, 0), 1500);
        assert_eq!(local.minute_of_day, 60);
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2021, 3, 11));
    }

    #[test]
    fn handles_timestamps_before_epoch() {
        let local = to_local(-1, 0);
        assert_eq!(local.minute_of_day, 1439);
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(1969, 12, 31));
    }

    #[test]
    fn formats_local_minute() {
        let local = to_local(ts(7, 5), 330);
        assert_eq!(local.format_minute().unwrap(), "2021-03-10 12:35");
    }

    #[test]
    fn is_total_for_extreme_offsets() {
        let local = to_local(ts(7, 5), i64::MAX);
        assert!((0..MINUTES_PER_DAY).contains(&local.minute_of_day));
        let local = to_local(ts(7, 5), i64::MIN);
        assert!((0..MINUTES_PER_DAY).contains(&local.minute_of_day));
    }
}

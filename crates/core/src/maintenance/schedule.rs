//! Wall-clock schedules for maintenance jobs.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Once a day at the given UTC time.
    Daily { at: NaiveTime },
    /// Once a week on `weekday` at the given UTC time.
    Weekly { weekday: Weekday, at: NaiveTime },
    /// On every multiple of `minutes` since the Unix epoch.
    Every { minutes: i64 },
}

/// Returns the first run time strictly after `now`.
pub fn next_run_after(schedule: &Schedule, now: DateTime<Utc>) -> DateTime<Utc> {
    match *schedule {
        Schedule::Daily { at } => {
            let candidate = now.date_naive().and_time(at).and_utc();
            if candidate > now {
                candidate
            } else {
                candidate + Duration::days(1)
            }
        }
        Schedule::Weekly { weekday, at } => {
            let days_ahead = (7 + weekday.num_days_from_monday() as i64
                - now.weekday().num_days_from_monday() as i64)
                % 7;
            let candidate =
                (now.date_naive() + Duration::days(days_ahead)).and_time(at).and_utc();
            if candidate > now {
                candidate
            } else {
                candidate + Duration::days(7)
            }
        }
        Schedule::Every { minutes } => {
            let period = minutes.max(1) * 60;
            let next = (now.timestamp().div_euclid(period) + 1) * period;
            DateTime::from_timestamp(next, 0).unwrap_or(now + Duration::seconds(period))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_daily_later_today() {
        let schedule = Schedule::Daily { at: at(2, 0) };
        let now = utc(2026, 10, 19, 1, 15, 0);
        assert_eq!(next_run_after(&schedule, now), utc(2026, 10, 19, 2, 0, 0));
    }

    #[test]
    fn test_daily_rolls_to_tomorrow_when_passed_or_equal() {
        let schedule = Schedule::Daily { at: at(2, 0) };
        assert_eq!(
            next_run_after(&schedule, utc(2026, 10, 19, 2, 0, 0)),
            utc(2026, 10, 20, 2, 0, 0)
        );
        assert_eq!(
            next_run_after(&schedule, utc(2026, 10, 19, 23, 59, 59)),
            utc(2026, 10, 20, 2, 0, 0)
        );
    }

    #[test]
    fn test_weekly_sunday() {
        let schedule = Schedule::Weekly {
            weekday: Weekday::Sun,
            at: at(3, 0),
        };
        // 2026-10-19 is a Monday
        assert_eq!(
            next_run_after(&schedule, utc(2026, 10, 19, 12, 0, 0)),
            utc(2026, 10, 25, 3, 0, 0)
        );
        // Sunday before 03:00 runs the same day
        assert_eq!(
            next_run_after(&schedule, utc(2026, 10, 25, 2, 0, 0)),
            utc(2026, 10, 25, 3, 0, 0)
        );
        // Sunday after 03:00 waits a week
        assert_eq!(
            next_run_after(&schedule, utc(2026, 10, 25, 3, 0, 0)),
            utc(2026, 11, 1, 3, 0, 0)
        );
    }

    #[test]
    fn test_every_ten_minutes() {
        let schedule = Schedule::Every { minutes: 10 };
        assert_eq!(
            next_run_after(&schedule, utc(2026, 10, 19, 8, 3, 27)),
            utc(2026, 10, 19, 8, 10, 0)
        );
        assert_eq!(
            next_run_after(&schedule, utc(2026, 10, 19, 8, 10, 0)),
            utc(2026, 10, 19, 8, 20, 0)
        );
        assert_eq!(
            next_run_after(&schedule, utc(2026, 10, 19, 23, 55, 0)),
            utc(2026, 10, 20, 0, 0, 0)
        );
    }
}

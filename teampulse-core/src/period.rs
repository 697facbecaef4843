//! Period resolution
//!
//! Maps a [`PeriodKind`] to absolute instants using the local calendar of
//! the supplied "now". Current periods (`this_*`) are open and end at now;
//! historical periods (`last_*`) are closed and end on the last millisecond
//! of their final day.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::types::{Period, PeriodKind};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

impl Period {
    /// Resolve `kind` against `now`, in the time zone `now` carries.
    ///
    /// Weeks start on Sunday. Quarters start in January, April, July and
    /// October.
    pub fn resolve<Tz: TimeZone>(kind: PeriodKind, now: &DateTime<Tz>) -> Period {
        let tz = now.timezone();
        let today = now.date_naive();
        let now_utc = now.with_timezone(&Utc);

        let (start, end) = match kind {
            PeriodKind::ThisWeek => (start_of_day(&tz, week_start(today)), now_utc),
            PeriodKind::LastWeek => {
                let this_sunday = week_start(today);
                let last_sunday = this_sunday - Duration::days(7);
                let last_saturday = this_sunday - Duration::days(1);
                (
                    start_of_day(&tz, last_sunday),
                    end_of_day(&tz, last_saturday),
                )
            }
            PeriodKind::ThisMonth => (start_of_day(&tz, month_start(today)), now_utc),
            PeriodKind::LastMonth => {
                let previous_last_day = month_start(today) - Duration::days(1);
                (
                    start_of_day(&tz, month_start(previous_last_day)),
                    end_of_day(&tz, previous_last_day),
                )
            }
            PeriodKind::ThisQuarter => {
                let mut first = month_start(today);
                for _ in 0..today.month0() % 3 {
                    first = month_start(first - Duration::days(1));
                }
                (start_of_day(&tz, first), now_utc)
            }
        };

        debug_assert!(start <= end, "period {kind} resolved with start after end");
        Period { kind, start, end }
    }

    /// Whether this period runs up to "now".
    pub fn is_open(&self) -> bool {
        self.kind.is_open()
    }

    /// Length of the period in (fractional) days.
    pub fn length_days(&self) -> f64 {
        (self.end - self.start).num_milliseconds().max(0) as f64 / MILLIS_PER_DAY
    }

    /// Number of weeks the period touches, never less than one.
    pub fn weeks(&self) -> u32 {
        ((self.length_days() / 7.0).ceil() as u32).max(1)
    }

    /// Whether a completion at `instant` belongs to this period.
    ///
    /// Open periods ignore their end bound.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && (self.is_open() || instant <= self.end)
    }
}

/// Most recent Sunday on or before `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(tz, date.and_time(NaiveTime::MIN))
}

/// 23:59:59.999 local time on `date`.
fn end_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let next_midnight = (date + Duration::days(1)).and_time(NaiveTime::MIN);
    local_to_utc(tz, next_midnight - Duration::milliseconds(1))
}

/// Map a wall-clock time to an instant.
///
/// Ambiguous times take the earlier instant; times skipped by a DST jump
/// move forward one hour.
fn local_to_utc<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike, Weekday};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_this_week_starts_on_sunday_midnight() {
        // Wednesday
        let now = utc(2025, 1, 15, 14, 30);
        let period = Period::resolve(PeriodKind::ThisWeek, &now);

        assert_eq!(period.start, utc(2025, 1, 12, 0, 0));
        assert_eq!(period.start.weekday(), Weekday::Sun);
        assert_eq!(period.end, now);
        assert!(period.start <= now);
    }

    #[test]
    fn test_this_week_on_a_sunday_starts_today() {
        let now = utc(2025, 1, 12, 9, 0);
        let period = Period::resolve(PeriodKind::ThisWeek, &now);
        assert_eq!(period.start, utc(2025, 1, 12, 0, 0));
    }

    #[test]
    fn test_last_week_is_closed_seven_day_span() {
        let now = utc(2025, 1, 15, 14, 30);
        let this_week = Period::resolve(PeriodKind::ThisWeek, &now);
        let last_week = Period::resolve(PeriodKind::LastWeek, &now);

        assert_eq!(last_week.start, utc(2025, 1, 5, 0, 0));
        assert_eq!(last_week.end.weekday(), Weekday::Sat);
        assert_eq!(last_week.end.nanosecond(), 999_000_000);
        assert!(last_week.end < this_week.start);
        assert_eq!(
            last_week.end - last_week.start,
            Duration::days(7) - Duration::milliseconds(1)
        );
    }

    #[test]
    fn test_last_week_across_year_boundary() {
        let now = utc(2025, 1, 2, 8, 0);
        let period = Period::resolve(PeriodKind::LastWeek, &now);
        assert_eq!(period.start, utc(2024, 12, 22, 0, 0));
        assert_eq!(period.end.date_naive(), NaiveDate::from_ymd_opt(2024, 12, 28).unwrap());
    }

    #[test]
    fn test_this_month_on_march_15() {
        let now = utc(2025, 3, 15, 10, 0);
        let period = Period::resolve(PeriodKind::ThisMonth, &now);
        assert_eq!(period.start, utc(2025, 3, 1, 0, 0));
        assert_eq!(period.end, now);
    }

    #[test]
    fn test_last_month_on_march_15() {
        let now = utc(2025, 3, 15, 10, 0);
        let period = Period::resolve(PeriodKind::LastMonth, &now);
        assert_eq!(period.start, utc(2025, 2, 1, 0, 0));
        assert_eq!(period.end, utc(2025, 3, 1, 0, 0) - Duration::milliseconds(1));

        // Leap year
        let now = utc(2024, 3, 15, 10, 0);
        let period = Period::resolve(PeriodKind::LastMonth, &now);
        assert_eq!(period.end.day(), 29);
    }

    #[test]
    fn test_last_month_ends_on_last_calendar_day() {
        // (now, expected last day of previous month)
        let cases = [
            (utc(2025, 3, 10, 0, 0), 28),
            (utc(2024, 3, 10, 0, 0), 29),
            (utc(2025, 5, 10, 0, 0), 30),
            (utc(2025, 8, 10, 0, 0), 31),
            (utc(2025, 1, 10, 0, 0), 31),
        ];
        for (now, last_day) in cases {
            let this_month = Period::resolve(PeriodKind::ThisMonth, &now);
            let last_month = Period::resolve(PeriodKind::LastMonth, &now);
            assert_eq!(last_month.end.day(), last_day, "now = {now}");
            assert_eq!(last_month.start.day(), 1);
            assert_eq!(this_month.start - last_month.end, Duration::milliseconds(1));
        }
    }

    #[test]
    fn test_this_quarter() {
        let cases = [(1, 1), (2, 1), (3, 1), (4, 4), (6, 4), (9, 7), (10, 10), (12, 10)];
        for (month, quarter_month) in cases {
            let now = utc(2025, month, 20, 12, 0);
            let period = Period::resolve(PeriodKind::ThisQuarter, &now);
            assert_eq!(period.start, utc(2025, quarter_month, 1, 0, 0), "month {month}");
            assert_eq!(period.end, now);
        }
    }

    #[test]
    fn test_resolution_uses_local_calendar() {
        // 2025-01-12 02:00 UTC is still Saturday evening in UTC-5
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = utc(2025, 1, 12, 2, 0).with_timezone(&offset);
        let period = Period::resolve(PeriodKind::ThisWeek, &now);

        // Sunday Jan 5 00:00 local == 05:00 UTC
        assert_eq!(period.start, utc(2025, 1, 5, 5, 0));
    }

    #[test]
    fn test_weeks_never_below_one() {
        let now = utc(2025, 1, 12, 0, 0);
        let period = Period::resolve(PeriodKind::ThisWeek, &now);
        assert_eq!(period.length_days(), 0.0);
        assert_eq!(period.weeks(), 1);

        let now = utc(2025, 3, 15, 10, 0);
        assert_eq!(Period::resolve(PeriodKind::LastWeek, &now).weeks(), 1);
        // Feb 2025: 28 days minus a millisecond
        assert_eq!(Period::resolve(PeriodKind::LastMonth, &now).weeks(), 4);
        // Mar 1 .. Mar 15 10:00
        assert_eq!(Period::resolve(PeriodKind::ThisMonth, &now).weeks(), 3);
    }

    #[test]
    fn test_contains_respects_open_end() {
        let now = utc(2025, 3, 15, 10, 0);
        let later = utc(2025, 3, 20, 0, 0);

        let this_month = Period::resolve(PeriodKind::ThisMonth, &now);
        assert!(this_month.contains(later));
        assert!(!this_month.contains(utc(2025, 2, 28, 0, 0)));

        let last_month = Period::resolve(PeriodKind::LastMonth, &now);
        assert!(last_month.contains(utc(2025, 2, 28, 23, 0)));
        assert!(!last_month.contains(utc(2025, 3, 1, 0, 0)));
    }
}

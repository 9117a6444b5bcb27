//! Booking time windows.
//!
//! A window is a half-open interval `[start, end)` anchored to a booking
//! date. The venue's bookable night can cross midnight (23:00–06:00), so
//! `end <= start` means the window wraps into the next calendar day; the
//! window is a duration anchored to `date`, never two free-standing clock
//! times. All overlap checks run on absolute minutes so a window booked on
//! date D and one booked in the small hours of D+1 compare correctly.
//
//  This module is deliberately pure: no async, no IO.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Build a window. `start == end` is rejected: a zero-length window can
    /// never be satisfied and a full-day booking is expressed as a wrap.
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> anyhow::Result<Self> {
        if start == end {
            anyhow::bail!("time window start and end are equal");
        }
        Ok(Self { date, start, end })
    }

    pub fn wraps_midnight(&self) -> bool {
        self.end <= self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        let raw = minute_of_day(self.end) - minute_of_day(self.start);
        if raw <= 0 { raw + MINUTES_PER_DAY } else { raw }
    }

    fn start_abs(&self) -> i64 {
        i64::from(self.date.num_days_from_ce()) * MINUTES_PER_DAY + minute_of_day(self.start)
    }

    fn end_abs(&self) -> i64 {
        self.start_abs() + self.duration_minutes()
    }

    /// Half-open interval overlap: `[a, b)` and `[c, d)` overlap iff
    /// `a < d && c < b`. Windows that merely touch do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start_abs() < other.end_abs() && other.start_abs() < self.end_abs()
    }

    /// Calendar dates the window occupies: the booking date, plus the next
    /// day when the window wraps past midnight. Used for lock keying.
    pub fn dates_touched(&self) -> Vec<NaiveDate> {
        if self.wraps_midnight() {
            let next = self.date.succ_opt().unwrap_or(self.date);
            vec![self.date, next]
        } else {
            vec![self.date]
        }
    }

    /// Booking dates whose reservations could overlap this window: any
    /// reservation anchored the day before can wrap into us, and we can wrap
    /// into the day after. Store queries read exactly this band.
    pub fn query_dates(&self) -> Vec<NaiveDate> {
        let prev = self.date.pred_opt().unwrap_or(self.date);
        let next = self.date.succ_opt().unwrap_or(self.date);
        vec![prev, self.date, next]
    }
}

fn minute_of_day(t: NaiveTime) -> i64 {
    i64::from(t.num_seconds_from_midnight()) / 60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn window(d: &str, s: &str, e: &str) -> TimeWindow {
        TimeWindow::new(date(d), time(s), time(e)).unwrap()
    }

    #[test]
    fn zero_length_window_rejected() {
        assert!(TimeWindow::new(date("2025-03-14"), time("23:00"), time("23:00")).is_err());
    }

    #[test]
    fn plain_window_duration() {
        let w = window("2025-03-14", "20:00", "23:30");
        assert!(!w.wraps_midnight());
        assert_eq!(w.duration_minutes(), 210);
    }

    #[test]
    fn wrapped_window_duration() {
        let w = window("2025-03-14", "23:00", "06:00");
        assert!(w.wraps_midnight());
        assert_eq!(w.duration_minutes(), 7 * 60);
    }

    #[test]
    fn same_night_overlap() {
        let a = window("2025-03-14", "22:00", "01:00");
        let b = window("2025-03-14", "23:30", "02:00");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_windows_do_not_overlap() {
        // Half-open: an end instant equal to a start instant is free.
        let a = window("2025-03-14", "23:00", "02:00");
        let b = window("2025-03-14", "02:00", "06:00");
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn wrap_overlaps_next_calendar_day() {
        // 23:00–06:00 on D covers 00:30–01:30 on D+1.
        let long_night = window("2025-03-14", "23:00", "06:00");
        let after_midnight = window("2025-03-15", "00:30", "01:30");
        assert!(long_night.overlaps(&after_midnight));
    }

    #[test]
    fn same_clock_times_on_different_days_do_not_overlap() {
        let a = window("2025-03-14", "20:00", "23:00");
        let b = window("2025-03-15", "20:00", "23:00");
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn dates_touched_accounts_for_wrap() {
        let plain = window("2025-03-14", "20:00", "23:00");
        assert_eq!(plain.dates_touched(), vec![date("2025-03-14")]);

        let wrapped = window("2025-03-14", "23:00", "06:00");
        assert_eq!(
            wrapped.dates_touched(),
            vec![date("2025-03-14"), date("2025-03-15")]
        );
    }
}

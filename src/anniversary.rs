//! Relationship counters: time spent together and the countdown to the
//! next anniversary.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{days_between, LocalDay};

const DAYS_PER_YEAR: i64 = 365;

/// Elapsed time since the relationship started, counted in 365-day years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeTogether {
    pub total_days: i64,
    pub years: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NextAnniversary {
    pub date: LocalDay,
    /// Which anniversary this is; 0 when the start day is still ahead
    pub number: i32,
    /// 0 on the anniversary itself
    pub days_until: i64,
    /// Percent of the way from the previous anniversary, 0 to 100
    pub progress: u8,
}

/// Counters anchored on the day a relationship started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anniversary {
    start: LocalDay,
}

impl Anniversary {
    pub fn new(start: LocalDay) -> Self {
        Self { start }
    }

    pub fn start(&self) -> LocalDay {
        self.start
    }

    /// Time elapsed between local midnight of the start day and `now`.
    /// Zero while the start day is in the future.
    pub fn time_together(&self, now: NaiveDateTime) -> TimeTogether {
        let origin = self.start.date().and_time(chrono::NaiveTime::MIN);
        let elapsed = (now - origin).max(chrono::Duration::zero());

        let total_days = elapsed.num_days();
        TimeTogether {
            total_days,
            years: total_days / DAYS_PER_YEAR,
            days: total_days % DAYS_PER_YEAR,
            hours: elapsed.num_hours() % 24,
            minutes: elapsed.num_minutes() % 60,
        }
    }

    /// The next anniversary on or after `today`.
    pub fn next_anniversary(&self, today: LocalDay) -> NextAnniversary {
        if self.start >= today {
            return NextAnniversary {
                date: self.start,
                number: 0,
                days_until: days_between(today, self.start),
                progress: 0,
            };
        }

        let mut next = self.start.with_year(today.year());
        if next < today {
            next = self.start.with_year(today.year() + 1);
        }
        let previous = self.start.with_year(next.year() - 1);
        let since_previous = days_between(previous, today);
        let progress = ((since_previous as f64 / DAYS_PER_YEAR as f64) * 100.0)
            .round()
            .clamp(0.0, 100.0) as u8;

        NextAnniversary {
            date: next,
            number: next.year() - self.start.year(),
            days_until: days_between(today, next),
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> LocalDay {
        s.parse().unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn time_together_uses_365_day_years() {
        let counter = Anniversary::new(day("2023-03-20"));
        let together = counter.time_together(at("2025-03-22 05:30"));
        // 2024 is a leap year: 733 days elapsed
        assert_eq!(together.total_days, 733);
        assert_eq!(together.years, 2);
        assert_eq!(together.days, 3);
        assert_eq!(together.hours, 5);
        assert_eq!(together.minutes, 30);
    }

    #[test]
    fn time_together_is_zero_before_the_start() {
        let counter = Anniversary::new(day("2030-01-01"));
        assert_eq!(counter.time_together(at("2025-01-01 12:00")).total_days, 0);
    }

    #[test]
    fn countdown_is_zero_on_the_day() {
        let counter = Anniversary::new(day("2023-03-20"));
        let next = counter.next_anniversary(day("2025-03-20"));
        assert_eq!(next.date, day("2025-03-20"));
        assert_eq!(next.days_until, 0);
        assert_eq!(next.number, 2);
        assert_eq!(next.progress, 100);
    }

    #[test]
    fn passed_anniversary_rolls_to_next_year() {
        let counter = Anniversary::new(day("2023-03-20"));
        let next = counter.next_anniversary(day("2025-03-21"));
        assert_eq!(next.date, day("2026-03-20"));
        assert_eq!(next.days_until, 364);
        assert_eq!(next.progress, 0);
    }

    #[test]
    fn progress_halfway_through_the_year() {
        let counter = Anniversary::new(day("2023-01-01"));
        let next = counter.next_anniversary(day("2025-07-02"));
        assert_eq!(next.date, day("2026-01-01"));
        assert_eq!(next.progress, 50);
    }

    #[test]
    fn future_start_counts_down_to_the_start() {
        let counter = Anniversary::new(day("2025-06-01"));
        let next = counter.next_anniversary(day("2025-05-30"));
        assert_eq!(next.number, 0);
        assert_eq!(next.days_until, 2);
    }
}

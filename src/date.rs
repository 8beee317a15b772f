//! Local calendar day handling.
//!
//! Every date that enters the calendar is reduced to a [`LocalDay`]: a bare
//! (year, month, day) in the viewer's timezone with no time of day and no
//! offset. Two inputs that name the same day compare equal no matter how
//! they were written.

use std::{fmt, str::FromStr};

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, Locale, NaiveDate, NaiveDateTime, Utc,
};
use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::{CalError, Result};

/// Storage and wire format for a day. The only representation ever persisted.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d";

/// Locale used when none (or an unknown one) is configured.
pub const DEFAULT_LOCALE: &str = "es_ES";

/// Formats tried, in order, for strings without a leading `YYYY-MM-DD`.
const FALLBACK_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%Y%m%d",
];

const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M",
    "%a %b %d %Y %H:%M:%S",
];

/// A calendar day in local time, without time-of-day or UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocalDay(NaiveDate);

impl LocalDay {
    pub fn new(date: NaiveDate) -> Self {
        LocalDay(date)
    }

    /// Builds a day from its components; `None` if they don't form a date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(LocalDay)
    }

    /// The current day in the local timezone.
    pub fn today() -> Self {
        LocalDay(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn add_days(&self, days: i64) -> Self {
        LocalDay(self.0 + Duration::days(days))
    }

    pub fn succ(&self) -> Self {
        self.add_days(1)
    }

    pub fn pred(&self) -> Self {
        self.add_days(-1)
    }

    /// Sunday of the week containing this day. The calendar week starts on Sunday.
    pub fn week_start(&self) -> Self {
        let offset = self.0.weekday().num_days_from_sunday() as i64;
        self.add_days(-offset)
    }

    /// First and last day of the given month, or `None` for an invalid month.
    pub fn month_bounds(year: i32, month: u32) -> Option<(Self, Self)> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some((LocalDay(first), LocalDay(next_first.pred_opt()?)))
    }

    /// Same month and day in another year. Feb 29 falls back to Feb 28.
    pub fn with_year(&self, year: i32) -> Self {
        self.0
            .with_year(year)
            .or_else(|| NaiveDate::from_ymd_opt(year, self.month(), 28))
            .map(LocalDay)
            .unwrap_or(*self)
    }
}

impl fmt::Display for LocalDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_for_storage(*self))
    }
}

impl FromStr for LocalDay {
    type Err = CalError;

    fn from_str(s: &str) -> Result<Self> {
        to_local_day(s)
    }
}

impl TryFrom<String> for LocalDay {
    type Error = CalError;

    fn try_from(value: String) -> Result<Self> {
        to_local_day(DateInput::Text(value))
    }
}

impl From<LocalDay> for String {
    fn from(day: LocalDay) -> Self {
        format_for_storage(day)
    }
}

impl From<NaiveDate> for LocalDay {
    fn from(date: NaiveDate) -> Self {
        LocalDay(date)
    }
}

/// Anything the calendar accepts as "a date".
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    /// No date given; means "now".
    Now,
    Day(NaiveDate),
    /// Wall-clock time already in the local timezone.
    Naive(NaiveDateTime),
    Instant(DateTime<FixedOffset>),
    Utc(DateTime<Utc>),
    Local(DateTime<Local>),
    Text(String),
}

impl From<LocalDay> for DateInput {
    fn from(day: LocalDay) -> Self {
        DateInput::Day(day.0)
    }
}

impl From<&LocalDay> for DateInput {
    fn from(day: &LocalDay) -> Self {
        DateInput::Day(day.0)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Day(date)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(value: NaiveDateTime) -> Self {
        DateInput::Naive(value)
    }
}

impl From<DateTime<FixedOffset>> for DateInput {
    fn from(value: DateTime<FixedOffset>) -> Self {
        DateInput::Instant(value)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        DateInput::Utc(value)
    }
}

impl From<DateTime<Local>> for DateInput {
    fn from(value: DateTime<Local>) -> Self {
        DateInput::Local(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

impl<T: Into<DateInput>> From<Option<T>> for DateInput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DateInput::Now)
    }
}

/// Reduces any date representation to its local calendar day.
///
/// Strings that start with `YYYY-MM-DD` keep those components as written;
/// whatever follows (a time, an offset, a `Z`) is ignored, so the day can
/// never shift. Date-time values are converted to the local timezone first.
pub fn to_local_day(input: impl Into<DateInput>) -> Result<LocalDay> {
    match input.into() {
        DateInput::Now => Ok(LocalDay::today()),
        DateInput::Day(date) => Ok(LocalDay(date)),
        DateInput::Naive(value) => Ok(LocalDay(value.date())),
        DateInput::Instant(value) => Ok(LocalDay(value.with_timezone(&Local).date_naive())),
        DateInput::Utc(value) => Ok(LocalDay(value.with_timezone(&Local).date_naive())),
        DateInput::Local(value) => Ok(LocalDay(value.date_naive())),
        DateInput::Text(text) => parse_text(&text),
    }
}

fn parse_text(raw: &str) -> Result<LocalDay> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(LocalDay::today());
    }

    if let Some(day) = parse_dashed_date(text) {
        return Ok(day);
    }

    trace!("'{}' is not ISO, trying fallback formats", text);

    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Ok(LocalDay(value.with_timezone(&Local).date_naive()));
    }
    if let Ok(value) = DateTime::parse_from_rfc2822(text) {
        return Ok(LocalDay(value.with_timezone(&Local).date_naive()));
    }
    for format in FALLBACK_DATETIME_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(LocalDay(value.date()));
        }
    }
    for format in FALLBACK_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(LocalDay(date));
        }
    }

    Err(CalError::DateParse {
        input: raw.to_string(),
    })
}

/// Reads a leading `YYYY-M-D` date, ignoring any time or offset after it.
fn parse_dashed_date(text: &str) -> Option<LocalDay> {
    let head = text
        .split(|c: char| c == 'T' || c == 't' || c.is_whitespace())
        .next()?;
    let mut parts = head.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let numeric = |part: &str, max_len: usize| {
        !part.is_empty() && part.len() <= max_len && part.chars().all(|c| c.is_ascii_digit())
    };
    if year.len() != 4 || !numeric(year, 4) || !numeric(month, 2) || !numeric(day, 2) {
        return None;
    }
    LocalDay::from_ymd(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// True iff both inputs name the same local calendar day.
pub fn are_same_day(a: impl Into<DateInput>, b: impl Into<DateInput>) -> Result<bool> {
    Ok(to_local_day(a)? == to_local_day(b)?)
}

pub fn is_today(input: impl Into<DateInput>) -> Result<bool> {
    are_same_day(input, DateInput::Now)
}

/// Whole days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: LocalDay, to: LocalDay) -> i64 {
    (to.0 - from.0).num_days()
}

/// Days from today until `target`. Zero today, negative in the past.
pub fn days_until(target: impl Into<DateInput>) -> Result<i64> {
    let target = to_local_day(target)?;
    Ok(days_between(LocalDay::today(), target))
}

/// Renders `YYYY-MM-DD` with zero-padded month and day.
pub fn format_for_storage(day: LocalDay) -> String {
    day.0.format(STORAGE_FORMAT).to_string()
}

/// Long localized rendering: weekday, day, month and year.
pub fn format_for_display(day: LocalDay, locale: &str) -> String {
    let resolved = resolve_locale(locale);
    let pattern = match resolved {
        Locale::en_US | Locale::en_GB | Locale::en_AU | Locale::en_CA => "%A, %B %-d, %Y",
        Locale::es_ES | Locale::es_MX | Locale::es_AR | Locale::pt_BR | Locale::pt_PT => {
            "%A, %-d de %B de %Y"
        }
        _ => "%A %-d %B %Y",
    };
    day.0.format_localized(pattern, resolved).to_string()
}

fn resolve_locale(name: &str) -> Locale {
    let normalized = name.replace('-', "_");
    match Locale::try_from(normalized.as_str()) {
        Ok(locale) => locale,
        Err(_) => {
            warn!(
                "Unknown locale '{}', falling back to {}",
                name, DEFAULT_LOCALE
            );
            Locale::es_ES
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> LocalDay {
        LocalDay::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn iso_strings_keep_their_components() {
        assert_eq!(to_local_day("2025-07-10").unwrap(), day(2025, 7, 10));
        assert_eq!(to_local_day("2025-01-01").unwrap(), day(2025, 1, 1));
        assert_eq!(to_local_day("2025-12-31").unwrap(), day(2025, 12, 31));
    }

    #[test]
    fn time_and_offset_suffixes_do_not_shift_the_day() {
        let inputs = [
            "2025-07-10T00:00:00Z",
            "2025-07-10T23:59:59Z",
            "2025-07-10T23:00:00-05:00",
            "2025-07-10T01:00:00+14:00",
            "2025-07-10 18:30",
        ];
        for input in inputs {
            assert_eq!(to_local_day(input).unwrap(), day(2025, 7, 10), "{}", input);
            assert!(are_same_day(input, "2025-07-10").unwrap());
        }
    }

    #[test]
    fn native_values_use_local_components() {
        let local = Local.with_ymd_and_hms(2025, 7, 10, 23, 45, 0).unwrap();
        assert_eq!(to_local_day(local).unwrap(), day(2025, 7, 10));

        let morning = Local.with_ymd_and_hms(2025, 7, 10, 0, 5, 0).unwrap();
        assert!(are_same_day(local, morning).unwrap());

        let naive = NaiveDate::from_ymd_opt(2025, 7, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(to_local_day(naive).unwrap(), day(2025, 7, 10));
    }

    #[test]
    fn same_instant_in_other_offsets_is_the_same_local_day() {
        let utc = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let shifted = utc.with_timezone(&FixedOffset::east_opt(9 * 3600).unwrap());
        assert!(are_same_day(utc, shifted).unwrap());
    }

    #[test]
    fn fallback_formats_are_accepted() {
        assert_eq!(to_local_day("2025/07/10").unwrap(), day(2025, 7, 10));
        assert_eq!(to_local_day("July 10, 2025").unwrap(), day(2025, 7, 10));
        assert_eq!(to_local_day("10 July 2025").unwrap(), day(2025, 7, 10));
    }

    #[test]
    fn garbage_fails_with_date_parse_error() {
        for input in ["not a date", "2025-13-45", "yesterday-ish"] {
            match to_local_day(input) {
                Err(CalError::DateParse { input: reported }) => assert_eq!(reported, input),
                other => panic!("expected DateParse for {}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn missing_input_means_today() {
        assert_eq!(to_local_day(None::<&str>).unwrap(), LocalDay::today());
        assert_eq!(to_local_day(DateInput::Now).unwrap(), LocalDay::today());
        assert_eq!(to_local_day("").unwrap(), LocalDay::today());
    }

    #[test]
    fn storage_format_round_trips() {
        for input in ["2024-02-29", "2025-7-4T10:00:00Z", "2025-07-04", "July 4, 2025"] {
            let Ok(first) = to_local_day(input) else {
                continue;
            };
            let stored = format_for_storage(first);
            let again = format_for_storage(to_local_day(stored.as_str()).unwrap());
            assert_eq!(stored, again);
        }
        assert_eq!(format_for_storage(day(2025, 7, 4)), "2025-07-04");
    }

    #[test]
    fn days_until_counts_whole_days() {
        let today = LocalDay::today();
        assert_eq!(days_until(today).unwrap(), 0);
        assert_eq!(days_until(today.succ()).unwrap(), 1);
        assert_eq!(days_until(today.pred()).unwrap(), -1);
        assert_eq!(days_between(day(2025, 2, 27), day(2025, 3, 1)), 2);
        assert!(is_today(today).unwrap());
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2025-07-10 is a Thursday
        assert_eq!(day(2025, 7, 10).week_start(), day(2025, 7, 6));
        assert_eq!(day(2025, 7, 6).week_start(), day(2025, 7, 6));
    }

    #[test]
    fn month_bounds_handle_december_and_leap_years() {
        assert_eq!(
            LocalDay::month_bounds(2024, 2),
            Some((day(2024, 2, 1), day(2024, 2, 29)))
        );
        assert_eq!(
            LocalDay::month_bounds(2025, 12),
            Some((day(2025, 12, 1), day(2025, 12, 31)))
        );
        assert_eq!(LocalDay::month_bounds(2025, 13), None);
    }

    #[test]
    fn display_is_localized() {
        let shown = format_for_display(day(2025, 7, 10), "es_ES");
        assert_eq!(shown, "jueves, 10 de julio de 2025");
        let shown = format_for_display(day(2025, 7, 10), "en-US");
        assert_eq!(shown, "Thursday, July 10, 2025");
    }

    #[test]
    fn serde_uses_storage_format() {
        let json = serde_json::to_string(&day(2025, 7, 4)).unwrap();
        assert_eq!(json, "\"2025-07-04\"");
        let back: LocalDay = serde_json::from_str("\"2025-07-04T00:00:00Z\"").unwrap();
        assert_eq!(back, day(2025, 7, 4));
    }
}

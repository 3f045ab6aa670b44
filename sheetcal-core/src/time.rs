//! Timezone-aware calendar arithmetic shared by the placement handlers.
//!
//! All instants are `DateTime<Utc>`; days, weeks and hours-of-day are always
//! resolved in the configured zone so that a week crossing a DST change still
//! maps wall-clock hours onto the same grid rows.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{SheetCalError, SheetCalResult};

pub const MINUTES_PER_HOUR: f64 = 60.0;
pub const HOURS_PER_DAY: f64 = 24.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// The longest DST gap we walk across when a local midnight does not exist.
const MAX_GAP_MINUTES: i64 = 180;

/// First day of the week used to build week and month grids.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }

    /// Weekdays in display order, starting with this week start.
    pub fn weekdays(self) -> [Weekday; 7] {
        let mut day = self.weekday();
        std::array::from_fn(|_| {
            let current = day;
            day = day.succ();
            current
        })
    }
}

/// The first date of the week containing `date`.
pub fn start_of_week(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let back = match week_start {
        WeekStart::Monday => date.weekday().num_days_from_monday(),
        WeekStart::Sunday => date.weekday().num_days_from_sunday(),
    };
    date - Duration::days(i64::from(back))
}

/// The first day of the month containing `date`.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// The last day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Resolve a wall-clock datetime in `tz`:
/// - a single mapping is returned directly;
/// - an ambiguous one (clocks going back) takes the earlier instant;
/// - a non-existent one (clocks going forward) takes the first valid minute
///   after the gap.
pub fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt.with_timezone(&Utc);
    }

    (1..=MAX_GAP_MINUTES)
        .find_map(|minutes| {
            tz.from_local_datetime(&(naive + Duration::minutes(minutes)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// The instant at which `date` begins in `tz`.
pub fn local_midnight(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    resolve_local(tz, date.and_time(NaiveTime::MIN))
}

/// The calendar date of `instant` in `tz`.
pub fn local_date(tz: &Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Wall-clock hours elapsed since the start of `date` for `instant`.
///
/// Uses local clock readings rather than absolute time, so on both sides of
/// a DST change 09:00 local is 9.0.
pub fn wall_clock_hours(tz: &Tz, instant: DateTime<Utc>, date: NaiveDate) -> f64 {
    let local = instant.with_timezone(tz).naive_local();
    let elapsed = local - date.and_time(NaiveTime::MIN);
    elapsed.num_seconds() as f64 / (MINUTES_PER_HOUR * MINUTES_PER_HOUR)
}

/// The UTC offset in effect at `instant`, in minutes east of UTC.
pub fn utc_offset_minutes(tz: &Tz, instant: DateTime<Utc>) -> i32 {
    instant.with_timezone(tz).offset().fix().local_minus_utc() / 60
}

/// Format an offset the way the week grid labels it: `GMT +1`, `GMT -3:30`.
pub fn format_utc_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let hours = minutes.abs() / 60;
    let rest = minutes.abs() % 60;
    if rest == 0 {
        format!("GMT {sign}{hours}")
    } else {
        format!("GMT {sign}{hours}:{rest:02}")
    }
}

/// A half-open `[from, to)` range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Window {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> SheetCalResult<Self> {
        if to < from {
            return Err(SheetCalError::InvalidWindow(format!(
                "end {to} is before start {from}"
            )));
        }
        Ok(Window { from, to })
    }

    /// Whole local days `[first, last_exclusive)` in `tz`.
    pub fn for_dates(tz: &Tz, first: NaiveDate, last_exclusive: NaiveDate) -> SheetCalResult<Self> {
        Window::new(local_midnight(tz, first), local_midnight(tz, last_exclusive))
    }

    /// Parse `YYYY-MM-DD` bounds; `to` is inclusive, so the window ends at the
    /// following local midnight.
    pub fn from_args(from: &str, to: &str, tz: &Tz) -> SheetCalResult<Self> {
        let first = parse_date(from)?;
        let last = parse_date(to)?;
        let last_exclusive = last
            .succ_opt()
            .ok_or_else(|| SheetCalError::InvalidWindow(format!("date out of range: {to}")))?;
        Window::for_dates(tz, first, last_exclusive)
    }

    pub fn is_empty(&self) -> bool {
        self.to <= self.from
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }

    /// Whether `[start, end)` shares at least one instant with the window.
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.to && end > self.from
    }

    pub fn duration(&self) -> Duration {
        self.to - self.from
    }
}

/// Format `date` with a strftime pattern, falling back to ISO when the
/// pattern is malformed.
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return date.to_string();
    }
    out
}

/// Parse YYYY-MM-DD
pub fn parse_date(s: &str) -> SheetCalResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        SheetCalError::InvalidWindow(format!("Invalid date format '{s}'. Expected YYYY-MM-DD"))
    })
}

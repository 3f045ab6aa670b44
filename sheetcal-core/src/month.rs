//! Month view placement.
//!
//! The month sheet is a grid of week rows (4 to 6) by 7 or 5 day columns.
//! Every day cell has a title band on top and a fixed number of event lanes
//! below it. Multi-day events become one bar per week row they touch; a bar
//! takes the lowest lane free in every cell it covers, and a bar that finds
//! none marks those cells as overflowing instead.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::event::{CalendarEvent, LabelKind, SheetEvent, SheetLabel, SheetPosition};
use crate::time::{
    WeekStart, Window, end_of_month, format_date, local_date, local_midnight, start_of_month,
    start_of_week,
};

const DAYS_PER_WEEK: i64 = 7;

/// Month view settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthStyle {
    pub hide_weekends: bool,
    /// Pixel floor applied by the renderer
    pub min_event_height: f64,
    /// Lanes per day cell
    pub max_events: usize,
    /// Share of a cell taken by the day title
    pub day_title_ratio: f64,
    /// Share of a lane slot taken by the event bar
    pub event_height_ratio: f64,
    pub day_label_format: String,
    pub date_format: String,
}

impl Default for MonthStyle {
    fn default() -> Self {
        MonthStyle {
            hide_weekends: false,
            min_event_height: 15.0,
            max_events: 4,
            day_title_ratio: 1.0 / 3.0,
            event_height_ratio: 1.0 / 2.0,
            day_label_format: "%a".to_string(),
            date_format: "%d".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonthLayout {
    style: MonthStyle,
    tz: Tz,
    week_start: WeekStart,
}

/// The visible month grid, fixed at window-selection time.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthWindow {
    first_date: NaiveDate,
    rows: usize,
    days_per_row: usize,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    tz: Tz,
}

impl MonthWindow {
    /// Date in the top-left cell.
    pub fn first_date(&self) -> NaiveDate {
        self.first_date
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.days_per_row
    }

    pub fn first_visible(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn last_visible(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn window(&self) -> Window {
        Window {
            from: self.from,
            to: self.to,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }

    pub fn cell_date(&self, row: usize, column: usize) -> NaiveDate {
        self.first_date + Duration::days(row as i64 * DAYS_PER_WEEK + column as i64)
    }

    /// Grid cell showing `date`, if it is visible.
    pub fn cell_of(&self, date: NaiveDate) -> Option<(usize, usize)> {
        let offset = (date - self.first_date).num_days();
        if offset < 0 {
            return None;
        }
        let row = (offset / DAYS_PER_WEEK) as usize;
        let column = (offset % DAYS_PER_WEEK) as usize;
        (row < self.rows && column < self.days_per_row).then_some((row, column))
    }

    fn last_date(&self) -> NaiveDate {
        self.cell_date(self.rows - 1, self.days_per_row - 1)
    }

    fn cell_index(&self, row: usize, column: usize) -> usize {
        row * self.days_per_row + column
    }
}

/// One row-bound piece of a (possibly multi-week) event bar.
struct Segment {
    row: usize,
    column: usize,
    len: usize,
}

impl MonthLayout {
    pub fn new(style: MonthStyle, tz: Tz, week_start: WeekStart) -> Self {
        MonthLayout {
            style,
            tz,
            week_start,
        }
    }

    pub fn style(&self) -> &MonthStyle {
        &self.style
    }

    /// The grid for the month containing `anchor`.
    pub fn window(&self, anchor: NaiveDate) -> MonthWindow {
        let month_start = start_of_month(anchor);
        let mut first_date = start_of_week(month_start, self.week_start);
        if self.style.hide_weekends && self.week_start == WeekStart::Sunday {
            first_date += Duration::days(1);
        }

        let rows = ((end_of_month(anchor) - first_date).num_days() / DAYS_PER_WEEK + 1) as usize;
        let days_per_row = if self.style.hide_weekends { 5 } else { 7 };
        let last_exclusive =
            first_date + Duration::days((rows as i64 - 1) * DAYS_PER_WEEK + days_per_row as i64);

        let window = MonthWindow {
            first_date,
            rows,
            days_per_row,
            from: local_midnight(&self.tz, first_date),
            to: local_midnight(&self.tz, last_exclusive),
            tz: self.tz,
        };

        tracing::debug!(
            anchor = %anchor,
            first_date = %first_date,
            rows,
            "month window"
        );
        window
    }

    /// Place `events` on the grid. Events come first, then one label per cell.
    pub fn place(&self, window: &MonthWindow, events: &[CalendarEvent]) -> Vec<SheetEvent> {
        let bounds = window.window();
        let mut in_range: Vec<&CalendarEvent> = events
            .iter()
            .filter(|event| bounds.intersects(event.start, event.end))
            .collect();
        // Longer events first within a day so they claim the lower lanes
        in_range.sort_by(|a, b| {
            local_date(&self.tz, a.start)
                .cmp(&local_date(&self.tz, b.start))
                .then(b.end.cmp(&a.end))
        });

        let cells = window.rows * window.days_per_row;
        let lanes = self.style.max_events;
        let mut occupied = vec![vec![false; lanes]; cells];
        let mut hidden_events = vec![0usize; cells];
        let mut sheet = Vec::new();

        for event in in_range {
            for segment in self.segments(window, event) {
                let cell_range = window.cell_index(segment.row, segment.column)
                    ..window.cell_index(segment.row, segment.column) + segment.len;

                let free_lane = (0..lanes).find(|lane| {
                    occupied[cell_range.clone()]
                        .iter()
                        .all(|cell| !cell[*lane])
                });

                match free_lane {
                    Some(lane) => {
                        for cell in &mut occupied[cell_range] {
                            cell[lane] = true;
                        }
                        sheet.push(SheetEvent::event(
                            event.clone(),
                            self.event_position(window, &segment, lane),
                        ));
                    }
                    None => {
                        for hidden in &mut hidden_events[cell_range] {
                            *hidden += 1;
                        }
                    }
                }
            }
        }

        let overflowing = hidden_events.iter().filter(|hidden| **hidden > 0).count();
        if overflowing > 0 {
            tracing::debug!(overflowing, "month cells overflowing");
        }

        for row in 0..window.rows {
            for column in 0..window.days_per_row {
                let hidden = hidden_events[window.cell_index(row, column)];
                sheet.push(self.day_label(window, row, column, hidden));
            }
        }
        sheet
    }

    /// Every event touching the local day `date`, by start.
    pub fn day_events<'a>(&self, events: &'a [CalendarEvent], date: NaiveDate) -> Vec<&'a CalendarEvent> {
        let day_start = local_midnight(&self.tz, date);
        let day_end = local_midnight(&self.tz, date + Duration::days(1));
        let mut listed: Vec<&CalendarEvent> = events
            .iter()
            .filter(|event| event.overlaps(day_start, day_end))
            .collect();
        listed.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
        listed
    }

    /// Split the days `event` covers into one run per grid row, dropping
    /// hidden weekend columns.
    fn segments(&self, window: &MonthWindow, event: &CalendarEvent) -> Vec<Segment> {
        let start_date = local_date(&self.tz, event.start).max(window.first_date);

        // An event ending exactly at midnight does not occupy that day
        let end_local = local_date(&self.tz, event.end);
        let end_date = if event.end == local_midnight(&self.tz, end_local) {
            end_local - Duration::days(1)
        } else {
            end_local
        };
        let end_date = end_date.min(window.last_date()).max(start_date);

        let first = (start_date - window.first_date).num_days();
        let last = (end_date - window.first_date).num_days();
        let last_column = window.days_per_row as i64 - 1;

        (first / DAYS_PER_WEEK..=last / DAYS_PER_WEEK)
            .filter_map(|row| {
                let from = if row == first / DAYS_PER_WEEK { first % DAYS_PER_WEEK } else { 0 };
                let row_end = if row == last / DAYS_PER_WEEK {
                    last % DAYS_PER_WEEK
                } else {
                    DAYS_PER_WEEK - 1
                };
                let to = row_end.min(last_column);
                (from <= to).then(|| Segment {
                    row: row as usize,
                    column: from as usize,
                    len: (to - from + 1) as usize,
                })
            })
            .collect()
    }

    fn event_position(&self, window: &MonthWindow, segment: &Segment, lane: usize) -> SheetPosition {
        let rows = window.rows as f64;
        let columns = window.days_per_row as f64;
        let title = self.style.day_title_ratio;
        let bar = self.style.event_height_ratio;
        let lane_step = (1.0 - title) * (1.0 - bar) / (self.style.max_events.saturating_sub(1).max(1) as f64);

        SheetPosition {
            left: segment.column as f64 / columns,
            width: segment.len as f64 / columns,
            top: (segment.row as f64 + title + lane_step * lane as f64) / rows,
            height: (1.0 - title) * bar / rows,
        }
    }

    fn day_label(&self, window: &MonthWindow, row: usize, column: usize, hidden_events: usize) -> SheetEvent {
        let date = window.cell_date(row, column);
        let rows = window.rows as f64;
        let columns = window.days_per_row as f64;

        SheetEvent::label(
            SheetLabel {
                kind: LabelKind::MonthDay { date, hidden_events },
                title: format_date(date, &self.style.day_label_format),
                description: Some(format_date(date, &self.style.date_format)),
                badge: (hidden_events > 0).then(|| "+".to_string()),
            },
            SheetPosition {
                left: column as f64 / columns,
                width: 1.0 / columns,
                top: row as f64 / rows,
                height: self.style.day_title_ratio / rows,
            },
        )
    }
}

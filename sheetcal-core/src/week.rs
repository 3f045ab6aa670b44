//! Week view placement.
//!
//! The week sheet has one label column followed by one column per visible
//! day. Events lasting a day or more are packed into the header band;
//! shorter ones are bucketed per local day and packed inside their day
//! column, with rows driven by wall-clock hours so a DST change inside the
//! week does not shift the grid.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::event::{CalendarEvent, LabelKind, SheetControl, SheetEvent, SheetLabel, SheetPosition};
use crate::packing::LanePacker;
use crate::time::{
    HOURS_PER_DAY, MINUTES_PER_HOUR, WeekStart, Window, format_date, format_utc_offset, is_weekend,
    local_date, local_midnight, resolve_local, start_of_week, utc_offset_minutes, wall_clock_hours,
};

const LABEL_COLUMNS: f64 = 1.0;
const HOUR_MARK_HEIGHT: f64 = 0.02;
const UTC_LABEL_HEIGHT: f64 = 1.0 / 3.0;
const LANE_MARGIN: f64 = 0.1;
/// Header events never start closer than this to the right edge (in days)
const MIN_HEADER_WIDTH: f64 = 0.4;

/// Week view settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekStyle {
    pub hide_weekends: bool,
    /// Shortest visible in-day event, in hours; keeps late events on screen
    pub min_event_hours: f64,
    pub max_events_header: usize,
    pub max_events_in_day: usize,
    pub show_navigation: bool,
    /// Header lanes freed less than this many minutes ago count as cramped (0 = off)
    pub header_lane_gap_minutes: i64,
    pub day_label_format: String,
    pub date_format: String,
}

impl Default for WeekStyle {
    fn default() -> Self {
        WeekStyle {
            hide_weekends: false,
            min_event_hours: 0.5,
            max_events_header: 4,
            max_events_in_day: 4,
            show_navigation: false,
            header_lane_gap_minutes: 0,
            day_label_format: "%a".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Computes week windows and places events in them.
#[derive(Debug, Clone)]
pub struct WeekLayout {
    style: WeekStyle,
    tz: Tz,
    week_start: WeekStart,
}

/// The visible week, fixed at window-selection time.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekWindow {
    dates: Vec<NaiveDate>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    tz: Tz,
    start_offset: i32,
    end_offset: i32,
}

/// Output of one week placement pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeekPlacement {
    pub header_events: Vec<SheetEvent>,
    pub in_day_events: Vec<SheetEvent>,
    /// Earliest hour among placed in-day events
    pub first_hour: Option<u32>,
    /// Events left out for lack of lanes
    pub skipped: Vec<CalendarEvent>,
}

impl WeekPlacement {
    pub fn events(&self) -> impl Iterator<Item = &SheetEvent> {
        self.header_events
            .iter()
            .chain(self.in_day_events.iter())
            .filter(|sheet_event| sheet_event.is_event())
    }
}

impl WeekWindow {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn window(&self) -> Window {
        Window {
            from: self.from,
            to: self.to,
        }
    }

    pub fn tz(&self) -> &Tz {
        &self.tz
    }

    pub fn day_count(&self) -> usize {
        self.dates.len()
    }

    /// Day columns plus the label column.
    pub fn column_count(&self) -> usize {
        self.dates.len() + 1
    }

    pub fn first_visible(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn last_visible(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }

    /// Offset at the start of the window, in minutes east of UTC.
    pub fn utc_offset_minutes(&self) -> i32 {
        self.start_offset
    }

    /// Whether a DST change happens inside the window.
    pub fn offset_changed(&self) -> bool {
        self.start_offset != self.end_offset
    }

    /// Day column of a visible date.
    pub fn column_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Position of `instant` in day-column units, `0.0..=day_count`.
    ///
    /// The fractional part is the wall-clock time of day. Instants on a
    /// hidden date snap to the start of the next visible column.
    pub fn day_position(&self, instant: DateTime<Utc>) -> f64 {
        if instant <= self.from {
            return 0.0;
        }
        if instant >= self.to {
            return self.dates.len() as f64;
        }
        let date = local_date(&self.tz, instant);
        match self.dates.binary_search(&date) {
            Ok(column) => {
                let fraction = wall_clock_hours(&self.tz, instant, date) / HOURS_PER_DAY;
                column as f64 + fraction.clamp(0.0, 1.0)
            }
            Err(next_column) => next_column as f64,
        }
    }

    fn utc_label(&self) -> String {
        let start = format_utc_offset(self.start_offset);
        if self.offset_changed() {
            let end = format_utc_offset(self.end_offset);
            format!("{start}/{}", end.trim_start_matches("GMT "))
        } else {
            start
        }
    }
}

impl WeekLayout {
    pub fn new(style: WeekStyle, tz: Tz, week_start: WeekStart) -> Self {
        WeekLayout {
            style,
            tz,
            week_start,
        }
    }

    pub fn style(&self) -> &WeekStyle {
        &self.style
    }

    /// The week containing `anchor`.
    pub fn window(&self, anchor: NaiveDate) -> WeekWindow {
        let first = start_of_week(anchor, self.week_start);
        let dates: Vec<NaiveDate> = first
            .iter_days()
            .take(7)
            .filter(|date| !(self.style.hide_weekends && is_weekend(*date)))
            .collect();

        let first_visible = dates.first().copied().unwrap_or(first);
        let last_visible = dates.last().copied().unwrap_or(first);
        let from = local_midnight(&self.tz, first_visible);
        let to = local_midnight(&self.tz, last_visible + Duration::days(1));

        let window = WeekWindow {
            start_offset: utc_offset_minutes(&self.tz, from),
            end_offset: utc_offset_minutes(&self.tz, to),
            dates,
            from,
            to,
            tz: self.tz,
        };

        tracing::debug!(
            anchor = %anchor,
            from = %window.from,
            to = %window.to,
            offset_changed = window.offset_changed(),
            "week window"
        );
        window
    }

    /// Place `events` in `window`.
    pub fn place(&self, window: &WeekWindow, events: &[CalendarEvent]) -> WeekPlacement {
        let bounds = window.window();
        let mut in_range: Vec<&CalendarEvent> = events
            .iter()
            .filter(|event| bounds.intersects(event.start, event.end))
            .collect();
        in_range.sort_by_key(|event| event.start);

        let (header, in_day): (Vec<&CalendarEvent>, Vec<&CalendarEvent>) = in_range
            .into_iter()
            .partition(|event| event.duration() >= Duration::days(1));

        let mut placement = WeekPlacement::default();
        self.push_header_labels(window, &mut placement.header_events);
        self.place_header(window, &header, &mut placement);
        self.place_in_day(window, &in_day, &mut placement);
        push_hour_labels(window, &mut placement.in_day_events);

        let mut seen = HashSet::new();
        placement.skipped.retain(|event| seen.insert(event.id.clone()));

        placement
    }

    fn push_header_labels(&self, window: &WeekWindow, out: &mut Vec<SheetEvent>) {
        let columns = window.column_count() as f64;

        if self.style.show_navigation {
            out.push(SheetEvent::control(
                SheetControl::Navigation,
                SheetPosition {
                    left: 0.0,
                    width: 1.0 / columns,
                    top: 0.0,
                    height: 0.5,
                },
            ));
        }

        out.push(SheetEvent::label(
            SheetLabel {
                kind: LabelKind::UtcOffset,
                title: window.utc_label(),
                description: None,
                badge: None,
            },
            SheetPosition {
                left: 0.0,
                width: 1.0 / columns,
                top: 0.75 - UTC_LABEL_HEIGHT / 2.0,
                height: UTC_LABEL_HEIGHT,
            },
        ));

        for (column, date) in window.dates.iter().enumerate() {
            out.push(SheetEvent::label(
                SheetLabel {
                    kind: LabelKind::WeekDay { date: *date },
                    title: format_date(*date, &self.style.day_label_format),
                    description: Some(format_date(*date, &self.style.date_format)),
                    badge: None,
                },
                SheetPosition {
                    left: (LABEL_COLUMNS + column as f64) / columns,
                    width: 1.0 / columns,
                    top: 0.0,
                    height: 0.5,
                },
            ));
        }
    }

    fn place_header(&self, window: &WeekWindow, events: &[&CalendarEvent], placement: &mut WeekPlacement) {
        let columns = window.column_count() as f64;
        let days = window.day_count() as f64;
        let lanes = self.style.max_events_header.max(1) as f64;

        // Events living only on hidden days have nothing to show
        let visible: Vec<&CalendarEvent> = events
            .iter()
            .copied()
            .filter(|event| window.day_position(event.end) > window.day_position(event.start))
            .collect();

        let draw_map = LanePacker::new(self.style.max_events_header)
            .with_min_start_gap(Duration::minutes(self.style.header_lane_gap_minutes))
            .pack(&visible, window.from);

        for (range, placed) in draw_map.placed() {
            let start = window
                .day_position(placed.event.start)
                .min(days - MIN_HEADER_WIDTH);
            let end = window.day_position(placed.event.end);
            placement.header_events.push(SheetEvent::event(
                placed.event.clone(),
                SheetPosition {
                    left: (LABEL_COLUMNS + start) / columns,
                    width: (end - start) / columns,
                    top: 0.5 + placed.lane as f64 / (4.0 * lanes),
                    height: (1.0 - range.max_lane as f64 / (2.0 * lanes)) / 2.0,
                },
            ));
        }
        placement.skipped.extend(draw_map.skipped.into_iter().cloned());
    }

    fn place_in_day(&self, window: &WeekWindow, events: &[&CalendarEvent], placement: &mut WeekPlacement) {
        let columns = window.column_count() as f64;
        let packer = LanePacker::new(self.style.max_events_in_day);
        let latest_top = (HOURS_PER_DAY - self.style.min_event_hours).max(0.0);

        for (column, date) in window.dates.iter().enumerate() {
            let day_start = local_midnight(&window.tz, *date);
            let day_end = local_midnight(&window.tz, *date + Duration::days(1));
            let bucket: Vec<&CalendarEvent> = events
                .iter()
                .copied()
                .filter(|event| event.overlaps(day_start, day_end))
                .collect();
            if bucket.is_empty() {
                continue;
            }

            // Late events are drawn from `latest_start`, so they are packed
            // where they are drawn
            let latest_minutes = (latest_top * MINUTES_PER_HOUR).round() as i64;
            let latest_start = resolve_local(
                &window.tz,
                date.and_time(NaiveTime::MIN) + Duration::minutes(latest_minutes),
            );
            let drawn: Vec<CalendarEvent> = bucket
                .iter()
                .map(|event| {
                    let mut drawn = (*event).clone();
                    if event.start > latest_start {
                        let lift = event.start - latest_start;
                        drawn.start -= lift;
                        drawn.end -= lift;
                    }
                    drawn
                })
                .collect();
            let drawn_refs: Vec<&CalendarEvent> = drawn.iter().collect();
            let originals: HashMap<&str, &CalendarEvent> =
                bucket.iter().map(|event| (event.id.as_str(), *event)).collect();

            let draw_map = packer.pack(&drawn_refs, day_start);
            for (range, placed) in draw_map.placed() {
                let Some(event) = originals.get(placed.event.id.as_str()).copied() else {
                    continue;
                };
                let start_hours = if event.start <= day_start {
                    0.0
                } else {
                    wall_clock_hours(&window.tz, event.start, *date).clamp(0.0, HOURS_PER_DAY)
                };
                let end_hours = if event.end >= day_end {
                    HOURS_PER_DAY
                } else {
                    wall_clock_hours(&window.tz, event.end, *date).clamp(0.0, HOURS_PER_DAY)
                };

                let lanes = range.lane_count() as f64;
                let top = start_hours.min(latest_top) / HOURS_PER_DAY;
                let height = ((end_hours - start_hours).max(0.0) / HOURS_PER_DAY).min(1.0 - top);

                placement.in_day_events.push(SheetEvent::event(
                    event.clone(),
                    SheetPosition {
                        left: (LABEL_COLUMNS + column as f64 + placed.lane as f64 / lanes) / columns,
                        width: (1.0 - LANE_MARGIN) / lanes / columns,
                        top,
                        height,
                    },
                ));

                let hour = start_hours.floor() as u32;
                placement.first_hour = Some(placement.first_hour.map_or(hour, |first| first.min(hour)));
            }
            placement.skipped.extend(
                draw_map
                    .skipped
                    .into_iter()
                    .filter_map(|skipped| originals.get(skipped.id.as_str()).map(|event| (*event).clone())),
            );
        }
    }
}

fn push_hour_labels(window: &WeekWindow, out: &mut Vec<SheetEvent>) {
    let columns = window.column_count() as f64;
    for hour in 0..24u32 {
        out.push(SheetEvent::label(
            SheetLabel {
                kind: LabelKind::Hour { hour },
                title: format!("{hour:02}:00"),
                description: None,
                badge: None,
            },
            SheetPosition {
                left: 0.0,
                width: 1.0 / columns,
                top: (f64::from(hour) / HOURS_PER_DAY - HOUR_MARK_HEIGHT / 2.0).max(0.0),
                height: HOUR_MARK_HEIGHT,
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SheetEntry;
    use crate::time::resolve_local;
    use chrono::TimeZone;
    use chrono_tz::Europe::Budapest;

    const EPS: f64 = 1e-9;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, m, d, h, min, 0).unwrap()
    }

    fn local(tz: &Tz, d: u32, h: u32) -> DateTime<Utc> {
        resolve_local(tz, date(2025, 3, d).and_hms_opt(h, 0, 0).unwrap())
    }

    fn layout(style: WeekStyle, tz: Tz) -> WeekLayout {
        WeekLayout::new(style, tz, WeekStart::Monday)
    }

    fn placed<'a>(sheet: &'a [SheetEvent], id: &str) -> Vec<&'a SheetPosition> {
        sheet
            .iter()
            .filter(|sheet_event| sheet_event.entry.as_event().is_some_and(|event| event.id == id))
            .map(|sheet_event| &sheet_event.position)
            .collect()
    }

    #[test]
    fn test_window_columns_and_bounds() {
        let week = layout(WeekStyle::default(), chrono_tz::UTC);
        let window = week.window(date(2025, 3, 20));
        assert_eq!(window.column_count(), 8);
        assert_eq!(window.first_visible(), utc(3, 17, 0, 0));
        assert_eq!(window.last_visible(), utc(3, 24, 0, 0));
        assert!(!window.offset_changed());

        let hidden = layout(
            WeekStyle {
                hide_weekends: true,
                ..WeekStyle::default()
            },
            chrono_tz::UTC,
        );
        let window = hidden.window(date(2025, 3, 23));
        assert_eq!(window.column_count(), 6);
        assert_eq!(window.last_visible(), utc(3, 22, 0, 0));
    }

    #[test]
    fn test_three_overlapping_events_split_the_day_column() {
        let week = layout(WeekStyle::default(), chrono_tz::UTC);
        let window = week.window(date(2025, 3, 20));
        let events = vec![
            CalendarEvent::new("a", "A", utc(3, 20, 9, 0), utc(3, 20, 10, 0)),
            CalendarEvent::new("b", "B", utc(3, 20, 9, 30), utc(3, 20, 10, 30)),
            CalendarEvent::new("c", "C", utc(3, 20, 9, 45), utc(3, 20, 11, 0)),
        ];
        let placement = week.place(&window, &events);

        assert!(placement.skipped.is_empty());
        assert_eq!(placement.first_hour, Some(9));

        let a = placed(&placement.in_day_events, "a")[0];
        let b = placed(&placement.in_day_events, "b")[0];
        let c = placed(&placement.in_day_events, "c")[0];
        // Thursday is day column 3, label column in front
        assert!((a.left - 4.0 / 8.0).abs() < EPS);
        assert!((b.left - (4.0 + 1.0 / 3.0) / 8.0).abs() < EPS);
        assert!((c.left - (4.0 + 2.0 / 3.0) / 8.0).abs() < EPS);
        assert!((a.width - b.width).abs() < EPS && (b.width - c.width).abs() < EPS);
        assert!((a.top - 9.0 / 24.0).abs() < EPS);
        assert!((a.height - 1.0 / 24.0).abs() < EPS);
    }

    #[test]
    fn test_multi_day_event_goes_to_header() {
        let week = layout(WeekStyle::default(), chrono_tz::UTC);
        let window = week.window(date(2025, 3, 20));
        let events = vec![CalendarEvent::new("trip", "Trip", utc(3, 18, 12, 0), utc(3, 20, 12, 0))];
        let placement = week.place(&window, &events);

        assert!(placed(&placement.in_day_events, "trip").is_empty());
        let position = placed(&placement.header_events, "trip")[0];
        assert!((position.left - 2.5 / 8.0).abs() < EPS);
        assert!((position.width - 2.0 / 8.0).abs() < EPS);
        assert!((position.top - 0.5).abs() < EPS);
        assert!((position.height - 0.5).abs() < EPS);
        assert_eq!(placement.first_hour, None);
    }

    #[test]
    fn test_header_event_near_week_end_keeps_min_width() {
        let week = layout(WeekStyle::default(), chrono_tz::UTC);
        let window = week.window(date(2025, 3, 20));
        let events = vec![CalendarEvent::new("late", "Late", utc(3, 23, 23, 0), utc(3, 26, 0, 0))];
        let placement = week.place(&window, &events);

        let position = placed(&placement.header_events, "late")[0];
        assert!((position.left - 7.6 / 8.0).abs() < EPS);
        assert!((position.right() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_event_crossing_midnight_is_split() {
        let week = layout(WeekStyle::default(), chrono_tz::UTC);
        let window = week.window(date(2025, 3, 20));
        let events = vec![CalendarEvent::new("night", "Night", utc(3, 18, 22, 0), utc(3, 19, 2, 0))];
        let placement = week.place(&window, &events);

        let parts = placed(&placement.in_day_events, "night");
        assert_eq!(parts.len(), 2);
        assert!((parts[0].left - 2.0 / 8.0).abs() < EPS);
        assert!((parts[0].top - 22.0 / 24.0).abs() < EPS);
        assert!((parts[0].height - 2.0 / 24.0).abs() < EPS);
        assert!((parts[1].left - 3.0 / 8.0).abs() < EPS);
        assert!(parts[1].top.abs() < EPS);
        assert!((parts[1].height - 2.0 / 24.0).abs() < EPS);
        assert_eq!(placement.first_hour, Some(0));
    }

    #[test]
    fn test_dst_week_keeps_wall_clock_rows() {
        let week = layout(WeekStyle::default(), Budapest);
        let window = week.window(date(2025, 3, 27));
        assert!(window.offset_changed());
        assert_eq!(window.column_count(), 8);

        let events = vec![
            CalendarEvent::new("sat", "Sat", local(&Budapest, 29, 9), local(&Budapest, 29, 10)),
            CalendarEvent::new("sun", "Sun", local(&Budapest, 30, 9), local(&Budapest, 30, 10)),
        ];
        let placement = week.place(&window, &events);
        let sat = placed(&placement.in_day_events, "sat")[0];
        let sun = placed(&placement.in_day_events, "sun")[0];

        assert!((sat.top - sun.top).abs() < EPS);
        assert!((sat.top - 9.0 / 24.0).abs() < EPS);
        assert!((sun.left - sat.left - 1.0 / 8.0).abs() < EPS);

        let utc_label = placement
            .header_events
            .iter()
            .find(|sheet_event| {
                matches!(&sheet_event.entry, SheetEntry::Label(label) if label.kind == LabelKind::UtcOffset)
            })
            .expect("Should have a GMT label");
        assert_eq!(utc_label.entry.title(), "GMT +1/+2");
    }

    #[test]
    fn test_hidden_weekend_events_are_not_placed() {
        let week = layout(
            WeekStyle {
                hide_weekends: true,
                ..WeekStyle::default()
            },
            chrono_tz::UTC,
        );
        let window = week.window(date(2025, 3, 20));
        let events = vec![
            CalendarEvent::new("sat", "Sat", utc(3, 22, 9, 0), utc(3, 22, 10, 0)),
            CalendarEvent::new("fri", "Fri", utc(3, 21, 9, 0), utc(3, 21, 10, 0)),
        ];
        let placement = week.place(&window, &events);

        assert!(placed(&placement.in_day_events, "sat").is_empty());
        let fri = placed(&placement.in_day_events, "fri")[0];
        assert!((fri.left - 5.0 / 6.0).abs() < EPS);
    }

    #[test]
    fn test_labels_are_always_present() {
        let week = layout(
            WeekStyle {
                show_navigation: true,
                ..WeekStyle::default()
            },
            chrono_tz::UTC,
        );
        let window = week.window(date(2025, 3, 20));
        let placement = week.place(&window, &[]);

        let day_labels = placement
            .header_events
            .iter()
            .filter(|sheet_event| {
                matches!(&sheet_event.entry, SheetEntry::Label(label) if matches!(label.kind, LabelKind::WeekDay { .. }))
            })
            .count();
        assert_eq!(day_labels, 7);
        assert_eq!(placement.header_events[0].entry.id(), "navigation");
        assert_eq!(placement.in_day_events.len(), 24);
        assert_eq!(placement.in_day_events[9].entry.title(), "09:00");
        assert!(placement.events().next().is_none());
    }

    #[test]
    fn test_events_outside_window_are_ignored() {
        let week = layout(WeekStyle::default(), chrono_tz::UTC);
        let window = week.window(date(2025, 3, 20));
        let events = vec![
            CalendarEvent::new("before", "Before", utc(3, 16, 9, 0), utc(3, 17, 0, 0)),
            CalendarEvent::new("after", "After", utc(3, 24, 0, 0), utc(3, 24, 2, 0)),
        ];
        let placement = week.place(&window, &events);
        assert_eq!(placement.events().count(), 0);
    }

    #[test]
    fn test_in_day_overflow_is_reported_once() {
        let week = layout(WeekStyle::default(), chrono_tz::UTC);
        let window = week.window(date(2025, 3, 20));
        let events: Vec<_> = (0..5)
            .map(|i| CalendarEvent::new(format!("e{i}"), "E", utc(3, 20, 9, 0), utc(3, 20, 10, 0)))
            .collect();
        let placement = week.place(&window, &events);

        assert_eq!(placement.events().count(), 4);
        assert_eq!(placement.skipped.len(), 1);
        assert_eq!(placement.skipped[0].id, "e4");
    }

    #[test]
    fn test_late_event_is_lifted_by_min_height() {
        let week = layout(
            WeekStyle {
                min_event_hours: 1.0,
                ..WeekStyle::default()
            },
            chrono_tz::UTC,
        );
        let window = week.window(date(2025, 3, 20));
        let events = vec![CalendarEvent::new("late", "Late", utc(3, 20, 23, 40), utc(3, 20, 23, 50))];
        let placement = week.place(&window, &events);

        let position = placed(&placement.in_day_events, "late")[0];
        assert!((position.top - 23.0 / 24.0).abs() < EPS);
        assert!(position.bottom() <= 1.0 + EPS);
    }

    #[test]
    fn test_lifted_late_events_do_not_stack() {
        let week = layout(
            WeekStyle {
                min_event_hours: 1.0,
                ..WeekStyle::default()
            },
            chrono_tz::UTC,
        );
        let window = week.window(date(2025, 3, 20));
        let events = vec![
            CalendarEvent::new("first", "First", utc(3, 20, 23, 0), utc(3, 20, 23, 10)),
            CalendarEvent::new("second", "Second", utc(3, 20, 23, 20), utc(3, 20, 23, 30)),
        ];
        let placement = week.place(&window, &events);

        let first = placed(&placement.in_day_events, "first")[0];
        let second = placed(&placement.in_day_events, "second")[0];
        assert!((first.top - second.top).abs() < EPS);
        assert!(first.right() <= second.left + EPS || second.right() <= first.left + EPS);
        assert!(placement.skipped.is_empty());
    }
}

//! Stateful view handlers.
//!
//! A handler remembers the active window of its view so callers can keep
//! the "set the date, then transform" shape of a calendar widget. Before the
//! first `set_actual_date` every query returns an empty result.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::event::{CalendarEvent, SheetEvent};
use crate::month::{MonthLayout, MonthStyle, MonthWindow};
use crate::time::WeekStart;
use crate::week::{WeekLayout, WeekPlacement, WeekStyle, WeekWindow};

/// Common surface of the week and month handlers.
pub trait PlaceHandler {
    type Output: Default;

    /// Select the window containing `date`.
    fn set_actual_date(&mut self, date: NaiveDate);

    fn transform_to_sheet_events(&self, events: &[CalendarEvent]) -> Self::Output;

    /// Zero until a window is set.
    fn column_count(&self) -> usize;

    fn first_visible(&self) -> Option<DateTime<Utc>>;

    fn last_visible(&self) -> Option<DateTime<Utc>>;

    fn is_in_range(&self, instant: DateTime<Utc>) -> bool {
        match (self.first_visible(), self.last_visible()) {
            (Some(from), Some(to)) => from <= instant && instant < to,
            _ => false,
        }
    }
}

pub struct WeekPlaceHandler {
    layout: WeekLayout,
    window: Option<WeekWindow>,
}

impl WeekPlaceHandler {
    pub fn new(style: WeekStyle, tz: Tz, week_start: WeekStart) -> Self {
        WeekPlaceHandler {
            layout: WeekLayout::new(style, tz, week_start),
            window: None,
        }
    }

    pub fn window(&self) -> Option<&WeekWindow> {
        self.window.as_ref()
    }
}

impl PlaceHandler for WeekPlaceHandler {
    type Output = WeekPlacement;

    fn set_actual_date(&mut self, date: NaiveDate) {
        self.window = Some(self.layout.window(date));
    }

    fn transform_to_sheet_events(&self, events: &[CalendarEvent]) -> WeekPlacement {
        match &self.window {
            Some(window) => self.layout.place(window, events),
            None => WeekPlacement::default(),
        }
    }

    fn column_count(&self) -> usize {
        self.window.as_ref().map_or(0, WeekWindow::column_count)
    }

    fn first_visible(&self) -> Option<DateTime<Utc>> {
        self.window.as_ref().map(WeekWindow::first_visible)
    }

    fn last_visible(&self) -> Option<DateTime<Utc>> {
        self.window.as_ref().map(WeekWindow::last_visible)
    }
}

pub struct MonthPlaceHandler {
    layout: MonthLayout,
    window: Option<MonthWindow>,
}

impl MonthPlaceHandler {
    pub fn new(style: MonthStyle, tz: Tz, week_start: WeekStart) -> Self {
        MonthPlaceHandler {
            layout: MonthLayout::new(style, tz, week_start),
            window: None,
        }
    }

    pub fn window(&self) -> Option<&MonthWindow> {
        self.window.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.window.as_ref().map_or(0, MonthWindow::row_count)
    }

    /// Events listed when an overflowing day is opened.
    pub fn day_events<'a>(&self, events: &'a [CalendarEvent], date: NaiveDate) -> Vec<&'a CalendarEvent> {
        self.layout.day_events(events, date)
    }
}

impl PlaceHandler for MonthPlaceHandler {
    type Output = Vec<SheetEvent>;

    fn set_actual_date(&mut self, date: NaiveDate) {
        self.window = Some(self.layout.window(date));
    }

    fn transform_to_sheet_events(&self, events: &[CalendarEvent]) -> Vec<SheetEvent> {
        match &self.window {
            Some(window) => self.layout.place(window, events),
            None => Vec::new(),
        }
    }

    fn column_count(&self) -> usize {
        self.window.as_ref().map_or(0, MonthWindow::column_count)
    }

    fn first_visible(&self) -> Option<DateTime<Utc>> {
        self.window.as_ref().map(MonthWindow::first_visible)
    }

    fn last_visible(&self) -> Option<DateTime<Utc>> {
        self.window.as_ref().map(MonthWindow::last_visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event() -> CalendarEvent {
        CalendarEvent::new(
            "a",
            "A",
            Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 20, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_transform_before_window_is_empty() {
        let week = WeekPlaceHandler::new(WeekStyle::default(), chrono_tz::UTC, WeekStart::Monday);
        let placement = week.transform_to_sheet_events(&[event()]);
        assert!(placement.header_events.is_empty());
        assert!(placement.in_day_events.is_empty());
        assert_eq!(placement.first_hour, None);
        assert_eq!(week.column_count(), 0);
        assert!(week.first_visible().is_none());

        let month = MonthPlaceHandler::new(MonthStyle::default(), chrono_tz::UTC, WeekStart::Monday);
        assert!(month.transform_to_sheet_events(&[event()]).is_empty());
        assert_eq!(month.row_count(), 0);
        assert!(!month.is_in_range(event().start));
    }

    #[test]
    fn test_set_actual_date_selects_window() {
        let mut week = WeekPlaceHandler::new(WeekStyle::default(), chrono_tz::UTC, WeekStart::Monday);
        week.set_actual_date(NaiveDate::from_ymd_opt(2025, 3, 20).unwrap());
        assert_eq!(week.column_count(), 8);
        assert!(week.is_in_range(event().start));
        assert_eq!(week.transform_to_sheet_events(&[event()]).events().count(), 1);

        let mut month = MonthPlaceHandler::new(MonthStyle::default(), chrono_tz::UTC, WeekStart::Monday);
        month.set_actual_date(NaiveDate::from_ymd_opt(2025, 3, 20).unwrap());
        assert_eq!(month.column_count(), 7);
        assert_eq!(month.row_count(), 6);
        assert_eq!(
            month.first_visible(),
            Some(Utc.with_ymd_and_hms(2025, 2, 24, 0, 0, 0).unwrap())
        );
        assert_eq!(month.day_events(&[event()], event().start.date_naive()).len(), 1);
    }
}

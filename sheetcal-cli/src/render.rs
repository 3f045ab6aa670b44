//! Terminal rendering of placed sheets.
//!
//! Extension traits that turn sheet entries into colored lines with
//! owo_colors.

use chrono_tz::Tz;
use owo_colors::OwoColorize;
use sheetcal_core::{
    CalendarEvent, LabelKind, MonthWindow, Occurrence, SheetEntry, SheetEvent, SheetPosition,
    WeekPlacement, WeekWindow,
};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for SheetPosition {
    fn render(&self) -> String {
        format!(
            "x {:>5.3}  w {:>5.3}  y {:>5.3}  h {:>5.3}",
            self.left, self.width, self.top, self.height
        )
    }
}

impl Render for SheetEvent {
    fn render(&self) -> String {
        let position = self.position.render();
        match &self.entry {
            SheetEntry::Event(event) => {
                let badge = event
                    .badge
                    .as_deref()
                    .map(|badge| format!(" ({badge})"))
                    .unwrap_or_default();
                format!("{} {}{}", position.dimmed(), event.title.bold(), badge.cyan())
            }
            SheetEntry::Label(label) => {
                let badge = label.badge.as_deref().unwrap_or_default();
                format!("{} {} {}", position.dimmed(), label.title.dimmed(), badge.yellow())
            }
            SheetEntry::Control(_) => format!("{} {}", position.dimmed(), "<  >".dimmed()),
        }
    }
}

/// Wall-clock span of an event in `tz` (e.g. "Thu 09:00 - 10:30")
pub fn event_span(event: &CalendarEvent, tz: &Tz) -> String {
    let start = event.start.with_timezone(tz);
    let end = event.end.with_timezone(tz);
    if start.date_naive() == end.date_naive() {
        format!("{} - {}", start.format("%a %H:%M"), end.format("%H:%M"))
    } else {
        format!("{} - {}", start.format("%a %H:%M"), end.format("%a %H:%M"))
    }
}

pub fn render_week(window: &WeekWindow, placement: &WeekPlacement) -> String {
    let mut lines = Vec::new();
    let dates = window.dates();
    let (first, last) = match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return "Empty week".dimmed().to_string(),
    };

    lines.push(format!(
        "{} {} - {} {}",
        "Week".bold(),
        first.format("%a %b %-d"),
        last.format("%a %b %-d"),
        format!("({}, {} columns)", window.tz().name(), window.column_count()).dimmed()
    ));

    lines.push(String::new());
    lines.push("Header".bold().to_string());
    for sheet_event in &placement.header_events {
        lines.push(format!("  {}", sheet_event.render()));
    }

    lines.push(String::new());
    lines.push("Day".bold().to_string());
    for sheet_event in placement.in_day_events.iter().filter(|e| e.is_event()) {
        let span = sheet_event
            .entry
            .as_event()
            .map(|event| event_span(event, window.tz()))
            .unwrap_or_default();
        lines.push(format!("  {} {}", sheet_event.render(), span.dimmed()));
    }
    if let Some(hour) = placement.first_hour {
        lines.push(format!("  {}", format!("first hour {hour:02}:00").dimmed()));
    }

    if !placement.skipped.is_empty() {
        lines.push(String::new());
        lines.push(format!("{} {}", "Not shown:".red(), placement.skipped.len()));
        for event in &placement.skipped {
            lines.push(format!("  {} {}", event.title.red(), event_span(event, window.tz()).dimmed()));
        }
    }

    lines.join("\n")
}

/// The month grid as text cells, one line per week row.
pub fn render_month_grid(window: &MonthWindow, sheet: &[SheetEvent]) -> String {
    let mut lines = Vec::new();

    for row in 0..window.row_count() {
        let mut cells = Vec::new();
        for column in 0..window.column_count() {
            let date = window.cell_date(row, column);
            let label = sheet.iter().find_map(|sheet_event| match &sheet_event.entry {
                SheetEntry::Label(label) => match label.kind {
                    LabelKind::MonthDay { date: label_date, .. } if label_date == date => Some(label),
                    _ => None,
                },
                _ => None,
            });
            let title = label.map(|label| label.title.as_str()).unwrap_or_default();
            let cell = match label.and_then(|label| label.badge.as_deref()) {
                Some(badge) => format!("{:>3}{}", title, badge.yellow()),
                None => format!("{:>3} ", title),
            };
            cells.push(cell);
        }
        lines.push(cells.join(" "));
    }

    lines.join("\n")
}

pub fn render_month(window: &MonthWindow, sheet: &[SheetEvent], tz: &Tz) -> String {
    let mut lines = vec![
        format!(
            "{} {}",
            "Month".bold(),
            format!(
                "(from {}, {} x {})",
                window.first_date(),
                window.row_count(),
                window.column_count()
            )
            .dimmed()
        ),
        String::new(),
        render_month_grid(window, sheet),
        String::new(),
    ];

    for sheet_event in sheet.iter().filter(|e| e.is_event()) {
        let span = sheet_event
            .entry
            .as_event()
            .map(|event| event_span(event, tz))
            .unwrap_or_default();
        lines.push(format!("  {} {}", sheet_event.render(), span.dimmed()));
    }

    lines.join("\n")
}

/// A day listing, as opened from an overflow badge
pub fn render_day(events: &[&CalendarEvent], tz: &Tz) -> String {
    if events.is_empty() {
        return "No events found".dimmed().to_string();
    }

    events
        .iter()
        .map(|event| format!("  {} {}", event_span(event, tz), event.title))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_occurrence(occurrence: &Occurrence, tz: &Tz) -> String {
    let start = occurrence.start.with_timezone(tz);
    let end = occurrence.end.with_timezone(tz);
    format!(
        "  {} - {} {}",
        start.format("%a %Y-%m-%d %H:%M"),
        end.format("%H:%M"),
        format!("[{}]", occurrence.id).dimmed()
    )
}

//! Calendar events and the sheet geometry model.
//!
//! A placement handler turns `CalendarEvent`s into `SheetEvent`s: an entry
//! plus a `SheetPosition` whose four fields are fractions of the enclosing
//! sheet. Pixels only appear at the render boundary (`SheetPosition::to_pixels`).

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A time-ranged calendar event (half-open `[start, end)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Short label shown in a corner of the event (e.g. member count)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default)]
    pub hints: RenderHints,
}

/// Opaque render hints, passed through placement untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl CalendarEvent {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        CalendarEvent {
            id: id.into(),
            title: title.into(),
            start,
            end,
            description: None,
            badge: None,
            hints: RenderHints::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.hints.color = Some(color.into());
        self
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether the event shares at least one instant with `[from, to)`.
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start < to && self.end > from
    }
}

/// Container-relative placement, every field a fraction of the sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetPosition {
    pub left: f64,
    pub width: f64,
    pub top: f64,
    pub height: f64,
}

impl SheetPosition {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether the rectangle lies inside the unit square (up to `epsilon`).
    pub fn is_within_unit(&self, epsilon: f64) -> bool {
        self.left >= -epsilon
            && self.top >= -epsilon
            && self.width >= 0.0
            && self.height >= 0.0
            && self.right() <= 1.0 + epsilon
            && self.bottom() <= 1.0 + epsilon
    }

    /// Convert to pixels inside a `width` x `height` container.
    ///
    /// Fractions are clamped to the container, margins and padding are taken
    /// off both sides, and `min_event_height` is applied last.
    pub fn to_pixels(&self, width: f64, height: f64, margins: &SheetMargins) -> PixelRect {
        let top = self.top.min(1.0);
        let frac_height = (1.0 - top).min(self.height);
        let left = self.left.min(1.0);
        let frac_width = (1.0 - left).min(self.width);

        let inner_width =
            frac_width * width - 2.0 * margins.width_margin - 2.0 * margins.padding - 1.0;
        let inner_height =
            frac_height * height - 2.0 * margins.height_margin - 2.0 * margins.padding - 1.0;

        PixelRect {
            left: left * width + margins.width_margin,
            top: top * height + margins.height_margin + 1.0,
            width: inner_width.max(0.0),
            height: inner_height.max(margins.min_event_height).max(0.0),
        }
    }
}

/// Pixel-space spacing applied by the render boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetMargins {
    pub width_margin: f64,
    pub height_margin: f64,
    pub padding: f64,
    pub min_event_height: f64,
}

impl Default for SheetMargins {
    fn default() -> Self {
        SheetMargins {
            width_margin: 1.0,
            height_margin: 1.0,
            padding: 0.0,
            min_event_height: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// What a sheet rectangle shows.
///
/// Real events are domain data; labels and controls are layout decoration
/// generated by the handlers and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SheetEntry {
    Event(CalendarEvent),
    Label(SheetLabel),
    Control(SheetControl),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetLabel {
    pub kind: LabelKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LabelKind {
    /// Day column header of the week grid
    WeekDay { date: NaiveDate },
    /// Day cell header of the month grid; `hidden_events` counts segments
    /// that did not fit into the cell
    MonthDay { date: NaiveDate, hidden_events: usize },
    /// Hour gridline label of the week grid
    Hour { hour: u32 },
    /// The zone offset shown in the week header
    UtcOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetControl {
    /// Previous/next arrows in the week header
    Navigation,
}

impl SheetEntry {
    /// Stable id: the event id for real events, a generated one otherwise.
    pub fn id(&self) -> String {
        match self {
            SheetEntry::Event(event) => event.id.clone(),
            SheetEntry::Label(label) => match label.kind {
                LabelKind::WeekDay { date } => format!("week-day:{date}"),
                LabelKind::MonthDay { date, .. } => format!("month-day:{date}"),
                LabelKind::Hour { hour } => format!("hour:{hour:02}"),
                LabelKind::UtcOffset => "utc-offset".to_string(),
            },
            SheetEntry::Control(SheetControl::Navigation) => "navigation".to_string(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SheetEntry::Event(event) => &event.title,
            SheetEntry::Label(label) => &label.title,
            SheetEntry::Control(_) => "",
        }
    }

    pub fn as_event(&self) -> Option<&CalendarEvent> {
        match self {
            SheetEntry::Event(event) => Some(event),
            _ => None,
        }
    }

    /// Whether a click on this entry should reach the caller's click sink.
    ///
    /// Month day labels are interactive only when they carry an overflow
    /// badge (the click opens the day listing).
    pub fn is_interactive(&self) -> bool {
        match self {
            SheetEntry::Event(_) | SheetEntry::Control(_) => true,
            SheetEntry::Label(label) => {
                matches!(label.kind, LabelKind::MonthDay { hidden_events, .. } if hidden_events > 0)
            }
        }
    }
}

/// A sheet entry with its placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetEvent {
    pub entry: SheetEntry,
    pub position: SheetPosition,
}

impl SheetEvent {
    pub fn event(event: CalendarEvent, position: SheetPosition) -> Self {
        SheetEvent {
            entry: SheetEntry::Event(event),
            position,
        }
    }

    pub fn label(label: SheetLabel, position: SheetPosition) -> Self {
        SheetEvent {
            entry: SheetEntry::Label(label),
            position,
        }
    }

    pub fn control(control: SheetControl, position: SheetPosition) -> Self {
        SheetEvent {
            entry: SheetEntry::Control(control),
            position,
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self.entry, SheetEntry::Event(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_overlaps_is_half_open() {
        let start = Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 20, 10, 0, 0).unwrap();
        let event = CalendarEvent::new("a", "A", start, end);

        assert!(event.overlaps(start, end));
        assert!(!event.overlaps(end, end + Duration::hours(1)));
        assert!(!event.overlaps(start - Duration::hours(1), start));
    }

    #[test]
    fn test_to_pixels_clamps_and_applies_floor() {
        let position = SheetPosition {
            left: 0.5,
            width: 0.8,
            top: 0.9,
            height: 0.01,
        };
        let margins = SheetMargins {
            min_event_height: 15.0,
            ..SheetMargins::default()
        };
        let rect = position.to_pixels(200.0, 1000.0, &margins);

        assert_eq!(rect.left, 101.0);
        // width clamped to the remaining half: 100 - 2 - 1
        assert_eq!(rect.width, 97.0);
        assert_eq!(rect.top, 902.0);
        assert_eq!(rect.height, 15.0);
    }

    #[test]
    fn test_generated_ids_do_not_collide_with_events() {
        let label = SheetEntry::Label(SheetLabel {
            kind: LabelKind::Hour { hour: 7 },
            title: "07:00".into(),
            description: None,
            badge: None,
        });
        assert_eq!(label.id(), "hour:07");
        assert!(!label.is_interactive());
        assert!(label.as_event().is_none());

        let overflowing = SheetEntry::Label(SheetLabel {
            kind: LabelKind::MonthDay {
                date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
                hidden_events: 2,
            },
            title: "Mon".into(),
            description: None,
            badge: Some("+".into()),
        });
        assert!(overflowing.is_interactive());
    }
}

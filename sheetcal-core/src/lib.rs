//! Calendar layout engine.
//!
//! Turns a flat list of time-ranged events and a visible window into
//! non-overlapping sheet rectangles:
//! - `packing` assigns overlapping events to a capped number of lanes
//! - `week` and `month` compute the view windows and the geometry
//! - `handler` wraps them in the stateful "set date, then transform" shape
//! - `recurrence` materializes weekly group schedules into occurrences
//! - `source` provides the event-source seam and its implementations

pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod month;
pub mod packing;
pub mod palette;
pub mod recurrence;
pub mod source;
pub mod time;
pub mod week;

pub use crate::config::SheetCalConfig;
pub use error::{SheetCalError, SheetCalResult};
pub use event::{
    CalendarEvent, LabelKind, PixelRect, RenderHints, SheetControl, SheetEntry, SheetEvent,
    SheetLabel, SheetMargins, SheetPosition,
};
pub use handler::{MonthPlaceHandler, PlaceHandler, WeekPlaceHandler};
pub use month::{MonthLayout, MonthStyle, MonthWindow};
pub use packing::{DrawMap, EventRange, LaneEvent, LanePacker};
pub use recurrence::{GroupTemplate, Occurrence, UiRule, WeeklyRule};
pub use source::{
    EventSource, FixedEventSource, GroupBook, MemoryOccurrenceStore, OccurrenceStore,
    RandomEventSource, RecurringEventSource,
};
pub use time::{WeekStart, Window};
pub use week::{WeekLayout, WeekPlacement, WeekStyle, WeekWindow};

//! Event sources.
//!
//! An `EventSource` yields every event intersecting a window. Placement only
//! runs after the source resolves; source errors are handed back to the
//! caller untouched.

use std::future::Future;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{SheetCalError, SheetCalResult};
use crate::event::CalendarEvent;
use crate::palette::hsl_color;
use crate::recurrence::{GroupTemplate, Occurrence, expand, index_templates, merge};
use crate::time::Window;

pub trait EventSource: Send + Sync {
    /// All events intersecting `window`; empty for an empty window.
    fn get_events(&self, window: &Window) -> impl Future<Output = SheetCalResult<Vec<CalendarEvent>>> + Send;
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> SheetCalResult<T> {
    let contents = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&contents)
        .map_err(|e| SheetCalError::Serialization(format!("{}: {e}", path.display())))
}

/// A fixed list of events held in memory.
#[derive(Debug, Clone, Default)]
pub struct FixedEventSource {
    events: Vec<CalendarEvent>,
}

impl FixedEventSource {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        FixedEventSource { events }
    }

    /// Load a JSON array of events.
    pub async fn from_json_file(path: &Path) -> SheetCalResult<Self> {
        let events: Vec<CalendarEvent> = read_json(path).await?;
        tracing::debug!(path = %path.display(), events = events.len(), "loaded events");
        Ok(FixedEventSource { events })
    }
}

impl EventSource for FixedEventSource {
    async fn get_events(&self, window: &Window) -> SheetCalResult<Vec<CalendarEvent>> {
        if window.is_empty() {
            return Ok(Vec::new());
        }
        let mut events: Vec<CalendarEvent> = self
            .events
            .iter()
            .filter(|event| window.intersects(event.start, event.end))
            .cloned()
            .collect();
        events.sort_by_key(|event| event.start);
        Ok(events)
    }
}

/// Seeded random events for demos and load testing.
///
/// Each event starts somewhere inside the window and lasts up to
/// `max_length` (half the window by default). One extra event starts just
/// before the window end and runs a day past it.
#[derive(Debug, Clone)]
pub struct RandomEventSource {
    count: usize,
    max_length: Option<Duration>,
    seed: u64,
}

impl RandomEventSource {
    pub fn new(count: usize, seed: u64) -> Self {
        RandomEventSource {
            count,
            max_length: None,
            seed,
        }
    }

    pub fn with_max_length(mut self, max_length: Duration) -> Self {
        self.max_length = (max_length > Duration::zero()).then_some(max_length);
        self
    }
}

impl EventSource for RandomEventSource {
    async fn get_events(&self, window: &Window) -> SheetCalResult<Vec<CalendarEvent>> {
        if window.is_empty() {
            return Ok(Vec::new());
        }

        let length = window.duration().num_milliseconds();
        let max_length = self
            .max_length
            .map_or(length / 2, |max_length| max_length.num_milliseconds().min(length))
            .max(1);

        let mut rng = StdRng::seed_from_u64(self.seed ^ window.from.timestamp_millis() as u64);
        let mut events: Vec<CalendarEvent> = (0..self.count)
            .map(|i| {
                let start = window.from + Duration::milliseconds(rng.random_range(0..length));
                let end = start + Duration::milliseconds(rng.random_range(1..=max_length));
                CalendarEvent::new(format!("id_{i}"), format!("title_{i}"), start, end)
                    .with_description(format!("description_{i}"))
                    .with_badge(i.to_string())
                    .with_color(hsl_color(i, self.count))
            })
            .collect();

        let last_start = window.to - Duration::milliseconds(10);
        events.push(
            CalendarEvent::new("id_last", "title_last", last_start, window.to + Duration::days(1))
                .with_description("description_last")
                .with_color(hsl_color(0, self.count)),
        );
        events.sort_by_key(|event| event.start);
        Ok(events)
    }
}

/// Where persisted occurrences come from.
pub trait OccurrenceStore: Send + Sync {
    /// Persisted occurrences (deleted ones included) intersecting `window`.
    fn occurrences(&self, window: &Window) -> impl Future<Output = SheetCalResult<Vec<Occurrence>>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryOccurrenceStore {
    occurrences: Vec<Occurrence>,
}

impl MemoryOccurrenceStore {
    pub fn new(occurrences: Vec<Occurrence>) -> Self {
        MemoryOccurrenceStore { occurrences }
    }

    pub fn upsert(&mut self, occurrence: Occurrence) {
        match self
            .occurrences
            .iter_mut()
            .find(|existing| existing.template_id == occurrence.template_id && existing.start == occurrence.start)
        {
            Some(existing) => *existing = occurrence,
            None => self.occurrences.push(occurrence),
        }
    }
}

impl OccurrenceStore for MemoryOccurrenceStore {
    async fn occurrences(&self, window: &Window) -> SheetCalResult<Vec<Occurrence>> {
        Ok(self
            .occurrences
            .iter()
            .filter(|occurrence| window.intersects(occurrence.start, occurrence.end))
            .cloned()
            .collect())
    }
}

/// On-disk shape of a group schedule: templates plus persisted occurrences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupBook {
    pub groups: Vec<GroupTemplate>,
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
}

impl GroupBook {
    pub async fn from_json_file(path: &Path) -> SheetCalResult<Self> {
        let book: GroupBook = read_json(path).await?;
        tracing::debug!(
            path = %path.display(),
            groups = book.groups.len(),
            occurrences = book.occurrences.len(),
            "loaded group book"
        );
        Ok(book)
    }
}

/// Persisted occurrences merged with slots materialized from group rules.
///
/// Slots are only synthesized from `max(now, from)` on, so the past shows
/// what was actually persisted.
pub struct RecurringEventSource<S> {
    store: S,
    groups: Vec<GroupTemplate>,
    tz: Tz,
    now: Option<DateTime<Utc>>,
    group_restriction: Option<String>,
}

impl RecurringEventSource<MemoryOccurrenceStore> {
    pub fn from_book(book: GroupBook, tz: Tz) -> Self {
        RecurringEventSource::new(MemoryOccurrenceStore::new(book.occurrences), book.groups, tz)
    }
}

impl<S: OccurrenceStore> RecurringEventSource<S> {
    pub fn new(store: S, groups: Vec<GroupTemplate>, tz: Tz) -> Self {
        RecurringEventSource {
            store,
            groups,
            tz,
            now: None,
            group_restriction: None,
        }
    }

    /// Pin the clock used to decide which slots are in the past.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Only show the group with this id (`None` shows every group).
    pub fn set_group_restriction(&mut self, group_id: Option<String>) {
        self.group_restriction = group_id;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn is_shown(&self, template_id: &str) -> bool {
        self.group_restriction
            .as_deref()
            .is_none_or(|restriction| restriction == template_id)
    }
}

impl<S: OccurrenceStore> EventSource for RecurringEventSource<S> {
    async fn get_events(&self, window: &Window) -> SheetCalResult<Vec<CalendarEvent>> {
        if window.is_empty() || self.groups.is_empty() {
            return Ok(Vec::new());
        }

        let templates = index_templates(&self.groups);
        let mut persisted: Vec<Occurrence> = self
            .store
            .occurrences(window)
            .await?
            .into_iter()
            .filter(|occurrence| self.is_shown(&occurrence.template_id))
            .collect();
        for occurrence in &mut persisted {
            if let Some(template) = templates.get(occurrence.template_id.as_str()) {
                occurrence.show_members = template.show_members;
            }
        }

        let now = self.now.unwrap_or_else(Utc::now);
        let mut materialized = Vec::new();
        if now < window.to {
            let upcoming = Window::new(now.max(window.from), window.to)?;
            for group in self.groups.iter().filter(|group| self.is_shown(&group.id)) {
                materialized.extend(expand(group, &upcoming, &self.tz)?);
            }
        }

        Ok(merge(persisted, materialized)
            .iter()
            .map(Occurrence::to_calendar_event)
            .collect())
    }
}

pub mod config;
pub mod expand;
pub mod month;
pub mod week;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use sheetcal_core::time::parse_date;
use sheetcal_core::{
    CalendarEvent, EventSource, FixedEventSource, GroupBook, MemoryOccurrenceStore,
    RandomEventSource, RecurringEventSource, SheetCalResult, Window,
};

use crate::SourceArgs;
use crate::utils::tui::create_spinner;

/// The event source picked on the command line
pub enum LoadedSource {
    Empty,
    Fixed(FixedEventSource),
    Random(RandomEventSource),
    Recurring(RecurringEventSource<MemoryOccurrenceStore>),
}

impl LoadedSource {
    pub async fn load(args: &SourceArgs, tz: Tz) -> Result<Self> {
        if let Some(path) = &args.events {
            return Ok(LoadedSource::Fixed(FixedEventSource::from_json_file(path).await?));
        }

        if let Some(count) = args.random {
            return Ok(LoadedSource::Random(RandomEventSource::new(count, args.seed)));
        }

        if let Some(path) = &args.groups {
            let book = GroupBook::from_json_file(path).await?;
            let mut source = RecurringEventSource::from_book(book, tz);
            source.set_group_restriction(args.group.clone());
            return Ok(LoadedSource::Recurring(source));
        }

        Ok(LoadedSource::Empty)
    }

    pub async fn get_events(&self, window: &Window) -> SheetCalResult<Vec<CalendarEvent>> {
        match self {
            LoadedSource::Empty => Ok(Vec::new()),
            LoadedSource::Fixed(source) => source.get_events(window).await,
            LoadedSource::Random(source) => source.get_events(window).await,
            LoadedSource::Recurring(source) => source.get_events(window).await,
        }
    }
}

/// Load the source and fetch the events of `window` behind a spinner.
pub async fn fetch_events(args: &SourceArgs, tz: Tz, window: &Window) -> Result<Vec<CalendarEvent>> {
    let spinner = create_spinner("Loading events...".to_string());

    let result = async {
        let source = LoadedSource::load(args, tz).await?;
        let events = source.get_events(window).await?;
        tracing::debug!(from = %window.from, to = %window.to, events = events.len(), "fetched events");
        Ok::<_, anyhow::Error>(events)
    }
    .await;

    spinner.finish_and_clear();
    result
}

/// The `--date` argument, or today in `tz`.
pub fn anchor_date(date: Option<&str>, tz: Tz) -> Result<NaiveDate> {
    match date {
        Some(date) => Ok(parse_date(date)?),
        None => Ok(Utc::now().with_timezone(&tz).date_naive()),
    }
}

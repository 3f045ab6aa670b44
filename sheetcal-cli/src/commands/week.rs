use anyhow::Result;
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use sheetcal_core::{PlaceHandler, SheetCalConfig, WeekPlaceHandler};

use super::{anchor_date, fetch_events};
use crate::SheetArgs;
use crate::render::render_week;

pub async fn run(config: &SheetCalConfig, tz: Tz, args: SheetArgs) -> Result<()> {
    let anchor = anchor_date(args.date.as_deref(), tz)?;

    let mut handler = WeekPlaceHandler::new(config.week.clone(), tz, config.week_start);
    handler.set_actual_date(anchor);
    let window = handler
        .window()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No week window for {anchor}"))?;

    let events = fetch_events(&args.source, tz, &window.window()).await?;
    let placement = handler.transform_to_sheet_events(&events);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&placement)?);
        return Ok(());
    }

    println!("{}", render_week(&window, &placement));
    if events.is_empty() {
        println!("{}", "No events found".dimmed());
    }

    Ok(())
}

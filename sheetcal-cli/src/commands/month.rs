use anyhow::Result;
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use sheetcal_core::time::parse_date;
use sheetcal_core::{MonthPlaceHandler, PlaceHandler, SheetCalConfig};

use super::{anchor_date, fetch_events};
use crate::SheetArgs;
use crate::render::{render_day, render_month};

pub async fn run(config: &SheetCalConfig, tz: Tz, args: SheetArgs, day: Option<&str>) -> Result<()> {
    let anchor = anchor_date(args.date.as_deref(), tz)?;

    let mut handler = MonthPlaceHandler::new(config.month.clone(), tz, config.week_start);
    handler.set_actual_date(anchor);
    let window = handler
        .window()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No month window for {anchor}"))?;

    let events = fetch_events(&args.source, tz, &window.window()).await?;

    if let Some(day) = day {
        let date = parse_date(day)?;
        if window.cell_of(date).is_none() {
            anyhow::bail!("{date} is not on the sheet of {anchor}");
        }
        let day_events = handler.day_events(&events, date);

        if args.json {
            println!("{}", serde_json::to_string_pretty(&day_events)?);
        } else {
            println!("{}", date.format("%a %b %-d").bold());
            println!("{}", render_day(&day_events, &tz));
        }
        return Ok(());
    }

    let sheet = handler.transform_to_sheet_events(&events);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sheet)?);
        return Ok(());
    }

    println!("{}", render_month(&window, &sheet, &tz));
    if events.is_empty() {
        println!("{}", "No events found".dimmed());
    }

    Ok(())
}

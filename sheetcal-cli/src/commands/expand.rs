use anyhow::Result;
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use sheetcal_core::recurrence::expand;
use sheetcal_core::{GroupTemplate, SheetCalConfig, UiRule, WeeklyRule, Window};

use crate::render::render_occurrence;

/// Bounds and slot length of an expansion, as given on the command line
pub struct ExpandRange {
    pub from: String,
    pub to: String,
    pub duration: String,
}

/// Build the rule from either `--rule` or `--days` + `--time`.
pub fn parse_rule(rule: Option<&str>, days: &[String], time: Option<&str>) -> Result<WeeklyRule> {
    match (rule, time) {
        (Some(rule), _) => Ok(rule.parse::<WeeklyRule>()?),
        (None, Some(time)) => {
            let ui = UiRule {
                days: days.to_vec(),
                time: time.to_string(),
            };
            Ok(WeeklyRule::try_from(&ui)?)
        }
        (None, None) => anyhow::bail!(
            "No rule given.\n\n\
            Pass a cron-style rule:\n  \
            sheetcal expand --rule \"0 18 * * 1,3\" --from 2025-03-01 --to 2025-03-31\n\n\
            Or weekdays and a time:\n  \
            sheetcal expand --days Mon,Wed --time 18:00 --from 2025-03-01 --to 2025-03-31"
        ),
    }
}

fn parse_duration(input: &str) -> Result<i64> {
    let std_dur = humantime::parse_duration(input).map_err(|e| anyhow::anyhow!("{}", e))?;
    let minutes = i64::try_from(std_dur.as_secs() / 60)?;
    if minutes == 0 {
        anyhow::bail!("Duration must be at least one minute, got '{input}'");
    }
    Ok(minutes)
}

pub fn run(config: &SheetCalConfig, tz: Tz, rule: WeeklyRule, range: ExpandRange, json: bool) -> Result<()> {
    let window = Window::from_args(&range.from, &range.to, &tz)?;
    let template = GroupTemplate {
        id: "cli".to_string(),
        name: rule.to_string(),
        owner_id: String::new(),
        owner_name: String::new(),
        duration_minutes: parse_duration(&range.duration)?,
        color: None,
        rules: vec![rule.clone()],
        show_members: false,
    };

    let occurrences = expand(&template, &window, &tz)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&occurrences)?);
        return Ok(());
    }

    let ui = UiRule::from_rule(&rule, config.week_start);
    println!(
        "{} {} {}",
        rule.to_string().bold(),
        format!("({} at {})", ui.days.join(", "), ui.time).dimmed(),
        format!("[{}]", tz.name()).dimmed()
    );

    if occurrences.is_empty() {
        println!("{}", "No occurrences in range".dimmed());
        return Ok(());
    }

    for occurrence in &occurrences {
        println!("{}", render_occurrence(occurrence, &tz));
    }

    Ok(())
}

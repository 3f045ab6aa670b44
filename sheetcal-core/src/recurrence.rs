//! Weekly recurrence rules and their expansion into concrete occurrences.
//!
//! A group template carries one or more `WeeklyRule`s. Expansion turns every
//! rule into an RRULE, lets the `rrule` crate walk it across the window, and
//! produces synthetic occurrences whose ids are derived from their start
//! instants. Persisted occurrences (manual edits, member lists, soft
//! deletes) are then merged over the synthetic ones.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};

use crate::error::{SheetCalError, SheetCalResult};
use crate::event::CalendarEvent;
use crate::time::{WeekStart, Window, local_date};

/// A weekly rule: the same wall-clock time on a set of weekdays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeeklyRule {
    pub minute: u32,
    pub hour: u32,
    /// Sorted Sunday-first, no duplicates
    pub days: Vec<Weekday>,
}

impl WeeklyRule {
    pub fn new(hour: u32, minute: u32, days: impl IntoIterator<Item = Weekday>) -> SheetCalResult<Self> {
        if hour > 23 || minute > 59 {
            return Err(SheetCalError::InvalidRule(format!(
                "time out of range: {hour:02}:{minute:02}"
            )));
        }
        let mut days: Vec<Weekday> = days.into_iter().collect();
        days.sort_by_key(|day| day.num_days_from_sunday());
        days.dedup();
        if days.is_empty() {
            return Err(SheetCalError::InvalidRule("no weekdays selected".into()));
        }
        Ok(WeeklyRule { minute, hour, days })
    }

    pub fn time_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    /// RFC 5545 text for the `rrule` crate.
    ///
    /// DTSTART is the first date on or after `first_date` that matches one of
    /// the rule's weekdays, at the rule's wall-clock time in `tz`.
    pub fn to_rrule(&self, first_date: NaiveDate, tz: &Tz) -> String {
        let start = first_date
            .iter_days()
            .take(7)
            .find(|date| self.days.contains(&date.weekday()))
            .unwrap_or(first_date);

        let by_day = self
            .days
            .iter()
            .map(|day| weekday_code(*day))
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "DTSTART;TZID={}:{}T{:02}{:02}00\nRRULE:FREQ=WEEKLY;BYDAY={};BYHOUR={};BYMINUTE={};BYSECOND=0",
            tz.name(),
            start.format("%Y%m%d"),
            self.hour,
            self.minute,
            by_day,
            self.hour,
            self.minute,
        )
    }
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn weekday_from_sunday(n: u32) -> Option<Weekday> {
    match n {
        0 | 7 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

fn parse_field(field: &str, what: &str, max: u32) -> SheetCalResult<u32> {
    field
        .parse::<u32>()
        .ok()
        .filter(|value| *value <= max)
        .ok_or_else(|| SheetCalError::InvalidRule(format!("invalid {what} field '{field}'")))
}

fn parse_days(field: &str) -> SheetCalResult<Vec<Weekday>> {
    let mut days = Vec::new();
    for part in field.split(',') {
        let (low, high) = match part.split_once('-') {
            Some((low, high)) => (parse_field(low, "weekday", 7)?, parse_field(high, "weekday", 7)?),
            None => {
                let day = parse_field(part, "weekday", 7)?;
                (day, day)
            }
        };
        if low > high {
            return Err(SheetCalError::InvalidRule(format!("invalid weekday range '{part}'")));
        }
        days.extend((low..=high).filter_map(weekday_from_sunday));
    }
    Ok(days)
}

/// Parses the 5-field form `"M H * * d,d"` (0 = Sunday, 7 also Sunday).
impl FromStr for WeeklyRule {
    type Err = SheetCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [minute, hour, day_of_month, month, days] = fields.as_slice() else {
            return Err(SheetCalError::InvalidRule(format!(
                "expected 5 fields, got {} in '{s}'",
                fields.len()
            )));
        };
        if *day_of_month != "*" || *month != "*" {
            return Err(SheetCalError::InvalidRule(format!(
                "only weekly rules are supported: '{s}'"
            )));
        }

        WeeklyRule::new(
            parse_field(hour, "hour", 23)?,
            parse_field(minute, "minute", 59)?,
            parse_days(days)?,
        )
    }
}

impl fmt::Display for WeeklyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self
            .days
            .iter()
            .map(|day| day.num_days_from_sunday().to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{} {} * * {}", self.minute, self.hour, days)
    }
}

impl TryFrom<String> for WeeklyRule {
    type Error = SheetCalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeeklyRule> for String {
    fn from(rule: WeeklyRule) -> Self {
        rule.to_string()
    }
}

/// The editing-form shape of a rule: weekday names plus `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiRule {
    pub days: Vec<String>,
    pub time: String,
}

impl UiRule {
    /// Weekday names listed in display order for `week_start`.
    pub fn from_rule(rule: &WeeklyRule, week_start: WeekStart) -> Self {
        let days = week_start
            .weekdays()
            .into_iter()
            .filter(|day| rule.days.contains(day))
            .map(|day| day.to_string())
            .collect();
        UiRule {
            days,
            time: rule.time_label(),
        }
    }
}

fn parse_hh_mm(time: &str) -> SheetCalResult<(u32, u32)> {
    let invalid = || SheetCalError::InvalidRule(format!("time must be HH:MM, got '{time}'"));
    let (hour, minute) = time.split_once(':').ok_or_else(invalid)?;
    if hour.len() != 2 || minute.len() != 2 {
        return Err(invalid());
    }
    let hour = hour.parse::<u32>().map_err(|_| invalid())?;
    let minute = minute.parse::<u32>().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

impl TryFrom<&UiRule> for WeeklyRule {
    type Error = SheetCalError;

    fn try_from(ui: &UiRule) -> Result<Self, Self::Error> {
        let (hour, minute) = parse_hh_mm(&ui.time)?;
        let days = ui
            .days
            .iter()
            .map(|name| {
                name.trim()
                    .parse::<Weekday>()
                    .map_err(|_| SheetCalError::InvalidRule(format!("unknown weekday '{name}'")))
            })
            .collect::<SheetCalResult<Vec<_>>>()?;
        WeeklyRule::new(hour, minute, days)
    }
}

impl From<&WeeklyRule> for UiRule {
    fn from(rule: &WeeklyRule) -> Self {
        UiRule::from_rule(rule, WeekStart::default())
    }
}

/// A recurring group: who runs it, how long each slot lasts, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTemplate {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub owner_name: String,
    pub duration_minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub rules: Vec<WeeklyRule>,
    #[serde(default)]
    pub show_members: bool,
}

/// One concrete booking slot, either persisted or synthesized from a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: String,
    pub template_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub deletable: bool,
    #[serde(default)]
    pub show_members: bool,
}

impl Occurrence {
    /// A not-yet-persisted occurrence of `template` starting at `start`.
    /// The id is the template id plus the start instant in epoch
    /// milliseconds, so two groups meeting at the same time stay distinct.
    pub fn synthetic(template: &GroupTemplate, start: DateTime<Utc>) -> Self {
        Occurrence {
            id: format!("{}-{}", template.id, start.timestamp_millis()),
            template_id: template.id.clone(),
            start,
            end: start + Duration::minutes(template.duration_minutes),
            title: template.owner_name.clone(),
            text: template.name.clone(),
            color: template.color.clone(),
            member_ids: Vec::new(),
            deleted: false,
            deletable: false,
            show_members: template.show_members,
        }
    }

    pub fn to_calendar_event(&self) -> CalendarEvent {
        let badge = if self.show_members {
            self.member_ids.len().to_string()
        } else {
            "0".to_string()
        };
        let mut event = CalendarEvent::new(&self.id, &self.title, self.start, self.end)
            .with_description(&self.text)
            .with_badge(badge);
        event.hints.color = self.color.clone();
        event
    }
}

/// Every occurrence of `template` with `window.from <= start < window.to`,
/// de-duplicated by start instant and sorted.
pub fn expand(template: &GroupTemplate, window: &Window, tz: &Tz) -> SheetCalResult<Vec<Occurrence>> {
    if window.is_empty() {
        return Ok(Vec::new());
    }

    // Start one day early so the rule also covers a window that begins mid-day
    let first_date = local_date(tz, window.from) - Duration::days(1);
    let weeks = window.duration().num_days() / 7 + 2;

    let utc: rrule::Tz = Utc.into();
    let after = (window.from - Duration::seconds(1)).with_timezone(&utc);
    let before = (window.to + Duration::seconds(1)).with_timezone(&utc);

    let mut by_start: BTreeMap<DateTime<Utc>, Occurrence> = BTreeMap::new();
    for rule in &template.rules {
        let rrule_str = rule.to_rrule(first_date, tz);
        let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| {
            SheetCalError::InvalidRule(format!(
                "Failed to expand rule '{rule}' of group '{}': {e}",
                template.id
            ))
        })?;

        let limit = u16::try_from(weeks * rule.days.len() as i64).unwrap_or(u16::MAX);
        let result = rrule_set.after(after).before(before).all(limit);

        for start in result.dates.iter().map(|dt| dt.with_timezone(&Utc)) {
            if window.contains(start) {
                by_start
                    .entry(start)
                    .or_insert_with(|| Occurrence::synthetic(template, start));
            }
        }
    }

    tracing::debug!(
        group = %template.id,
        occurrences = by_start.len(),
        "expanded recurrence"
    );

    Ok(by_start.into_values().collect())
}

/// Merge persisted occurrences over materialized ones.
///
/// A persisted occurrence with the same (template, start) replaces the
/// synthetic one. Deleted persisted occurrences are left out of the result
/// and still keep their slot from being regenerated.
pub fn merge(persisted: Vec<Occurrence>, materialized: Vec<Occurrence>) -> Vec<Occurrence> {
    let taken: HashSet<(String, DateTime<Utc>)> = persisted
        .iter()
        .map(|occurrence| (occurrence.template_id.clone(), occurrence.start))
        .collect();

    let materialized_count = materialized.len();
    let mut merged: Vec<Occurrence> = persisted
        .into_iter()
        .filter(|occurrence| !occurrence.deleted)
        .collect();
    merged.extend(
        materialized
            .into_iter()
            .filter(|occurrence| !taken.contains(&(occurrence.template_id.clone(), occurrence.start))),
    );
    merged.sort_by_key(|occurrence| occurrence.start);

    tracing::debug!(
        persisted = taken.len(),
        materialized = materialized_count,
        visible = merged.len(),
        "merged occurrences"
    );

    merged
}

/// Templates indexed by id, for looking up the group of a persisted occurrence.
pub fn index_templates(templates: &[GroupTemplate]) -> HashMap<&str, &GroupTemplate> {
    templates
        .iter()
        .map(|template| (template.id.as_str(), template))
        .collect()
}

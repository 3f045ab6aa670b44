//! Global sheetcal configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{SheetCalError, SheetCalResult};
use crate::handler::{MonthPlaceHandler, WeekPlaceHandler};
use crate::month::MonthStyle;
use crate::time::WeekStart;
use crate::week::WeekStyle;

static DEFAULT_TIMEZONE: &str = "UTC";

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

/// Configuration at ~/.config/sheetcal/config.toml
///
/// Every field has a default, so an empty or missing file is valid.
/// `SHEETCAL_*` environment variables override the file, with `__`
/// separating nested keys (`SHEETCAL_WEEK__HIDE_WEEKENDS=true`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SheetCalConfig {
    /// IANA zone used for days, weeks and wall-clock hours
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub week_start: WeekStart,

    #[serde(default)]
    pub week: WeekStyle,

    #[serde(default)]
    pub month: MonthStyle,
}

impl Default for SheetCalConfig {
    fn default() -> Self {
        SheetCalConfig {
            timezone: default_timezone(),
            week_start: WeekStart::default(),
            week: WeekStyle::default(),
            month: MonthStyle::default(),
        }
    }
}

impl SheetCalConfig {
    pub fn config_path() -> SheetCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SheetCalError::Config("Could not determine config directory".into()))?
            .join("sheetcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first
    /// if no file exists yet.
    pub fn load() -> SheetCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> SheetCalResult<Self> {
        let config: SheetCalConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("SHEETCAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| SheetCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SheetCalError::Config(e.to_string()))?;

        tracing::debug!(path = %path.display(), timezone = %config.timezone, "loaded config");
        Ok(config)
    }

    pub fn tz(&self) -> SheetCalResult<Tz> {
        self.timezone
            .parse()
            .map_err(|_| SheetCalError::UnknownTimezone(self.timezone.clone()))
    }

    pub fn week_handler(&self) -> SheetCalResult<WeekPlaceHandler> {
        Ok(WeekPlaceHandler::new(self.week.clone(), self.tz()?, self.week_start))
    }

    pub fn month_handler(&self) -> SheetCalResult<MonthPlaceHandler> {
        Ok(MonthPlaceHandler::new(self.month.clone(), self.tz()?, self.week_start))
    }

    /// Save the current config to ~/.config/sheetcal/config.toml
    pub fn save(&self) -> SheetCalResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> SheetCalResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| SheetCalError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| SheetCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SheetCalResult<()> {
        let week = WeekStyle::default();
        let month = MonthStyle::default();
        let contents = format!(
            "\
# sheetcal configuration

# Timezone used to lay out days and hours:
# timezone = \"{DEFAULT_TIMEZONE}\"

# First day of the week (\"monday\" or \"sunday\"):
# week_start = \"monday\"

[week]
# hide_weekends = {}
# min_event_hours = {}
# max_events_header = {}
# max_events_in_day = {}
# show_navigation = {}
# header_lane_gap_minutes = {}
# day_label_format = \"{}\"
# date_format = \"{}\"

[month]
# hide_weekends = {}
# min_event_height = {}
# max_events = {}
# day_title_ratio = {}
# event_height_ratio = {}
# day_label_format = \"{}\"
# date_format = \"{}\"
",
            week.hide_weekends,
            week.min_event_hours,
            week.max_events_header,
            week.max_events_in_day,
            week.show_navigation,
            week.header_lane_gap_minutes,
            week.day_label_format,
            week.date_format,
            month.hide_weekends,
            month.min_event_height,
            month.max_events,
            month.day_title_ratio,
            month.event_height_ratio,
            month.day_label_format,
            month.date_format,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SheetCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SheetCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let config = SheetCalConfig::load_from(&dir.path().join("absent.toml")).expect("Should load");
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.week_start, WeekStart::Monday);
        assert_eq!(config.week.max_events_header, 4);
        assert_eq!(config.month.max_events, 4);
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("nested").join("config.toml");
        SheetCalConfig::create_default_config(&path).expect("Should write template");

        let config = SheetCalConfig::load_from(&path).expect("Should load");
        assert_eq!(config, SheetCalConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "timezone = \"Europe/Budapest\"\nweek_start = \"sunday\"\n\n[month]\nhide_weekends = true\n",
        )
        .expect("Should write file");

        let config = SheetCalConfig::load_from(&path).expect("Should load");
        assert_eq!(config.tz().expect("Should parse tz"), chrono_tz::Europe::Budapest);
        assert_eq!(config.week_start, WeekStart::Sunday);
        assert!(config.month.hide_weekends);
        assert_eq!(config.month.max_events, 4);
        assert_eq!(config.week, WeekStyle::default());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("config.toml");
        let mut config = SheetCalConfig::default();
        config.timezone = "America/New_York".into();
        config.week.show_navigation = true;
        config.week.max_events_in_day = 6;

        config.save_to(&path).expect("Should save");
        let loaded = SheetCalConfig::load_from(&path).expect("Should load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unknown_timezone() {
        let config = SheetCalConfig {
            timezone: "Mars/Olympus".into(),
            ..SheetCalConfig::default()
        };
        assert!(matches!(config.tz(), Err(SheetCalError::UnknownTimezone(_))));
        assert!(config.week_handler().is_err());
    }
}

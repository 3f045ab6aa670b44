use std::path::{Path, PathBuf};

use anyhow::Result;
use owo_colors::OwoColorize;
use sheetcal_core::SheetCalConfig;

fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(SheetCalConfig::config_path()?),
    }
}

pub fn run(path: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(path)?;
    let config = SheetCalConfig::load_from(&config_path)?;
    let exists = config_path.exists();

    println!("{}", "Paths".bold());
    print!("  Config:     {}", config_path.display());
    if exists {
        println!();
    } else {
        println!(" {}", "(not created yet)".dimmed());
    }

    println!();
    println!("{}", "Settings".bold());
    println!("  Timezone:   {}", config.timezone);
    println!("  Week start: {:?}", config.week_start);
    println!();
    println!("{}", toml::to_string_pretty(&config)?.dimmed());

    Ok(())
}

pub fn init(path: Option<&Path>, tz: Option<&str>, force: bool) -> Result<()> {
    let config_path = resolve_path(path)?;

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}\n\n\
            Overwrite it with:\n  \
            sheetcal config init --force",
            config_path.display()
        );
    }

    let timezone = match tz {
        Some(tz) => tz.to_string(),
        None => iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string()),
    };
    let config = SheetCalConfig {
        timezone,
        ..SheetCalConfig::default()
    };
    config.tz()?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    config.save_to(&config_path)?;

    println!(
        "{} {} {}",
        "Wrote".green(),
        config_path.display(),
        format!("(timezone {})", config.timezone).dimmed()
    );

    Ok(())
}

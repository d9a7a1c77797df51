use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use time::macros::format_description;
use time::Date;

use crate::fetch::{Location, ARCHIVE_URL};
use crate::report::ChartFormat;
use crate::week::{WeekRequest, YearWindow};

/// Summarise a week of historical weather at one place across several years.
#[derive(Parser, Debug)]
#[command(name = "weather-week")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(long, default_value_t = 42.35, allow_negative_numbers = true)]
    pub latitude: f64,

    #[arg(long, default_value_t = -71.05, allow_negative_numbers = true)]
    pub longitude: f64,

    /// First day of the week, and first year of the history window
    #[arg(long, default_value = "2010-12-01", value_parser = parse_date)]
    pub start_date: Date,

    /// Number of consecutive years sampled for each day
    #[arg(long, default_value_t = 5)]
    pub years: u32,

    /// Number of consecutive days to collect
    #[arg(long, default_value_t = 7)]
    pub week_length: u32,

    /// Whether days after New Year keep the start date's year window
    #[arg(long, value_enum, default_value_t = YearWindow::Fixed)]
    pub year_window: YearWindow,

    /// SQLite database receiving the week
    #[arg(long, default_value = "weather.db")]
    pub database: PathBuf,

    /// Directory receiving the charts
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = ChartFormat::Png)]
    pub format: ChartFormat,

    /// Per-request timeout in seconds, 0 to wait forever
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Archive endpoint to query
    #[arg(long, default_value = ARCHIVE_URL)]
    pub endpoint: String,

    /// Only collect and store, without drawing charts
    #[arg(long)]
    pub no_charts: bool,
}

fn parse_date(s: &str) -> Result<Date, String> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Latitude {0} is outside -90..=90")]
    Latitude(f64),
    #[error("Longitude {0} is outside -180..=180")]
    Longitude(f64),
    #[error("At least one year of history is needed")]
    NoYears,
    #[error("At least one day must be collected")]
    NoDays,
}

/// Everything a run needs, fixed before the first request.
#[derive(Debug, Clone)]
pub struct Config {
    pub week: WeekRequest,
    pub database: PathBuf,
    pub output_dir: PathBuf,
    pub format: ChartFormat,
    pub timeout: Option<Duration>,
    pub endpoint: String,
    pub charts: bool,
}

impl TryFrom<Cli> for Config {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        if !(-90.0..=90.0).contains(&cli.latitude) {
            return Err(ConfigError::Latitude(cli.latitude));
        }
        if !(-180.0..=180.0).contains(&cli.longitude) {
            return Err(ConfigError::Longitude(cli.longitude));
        }
        if cli.years == 0 {
            return Err(ConfigError::NoYears);
        }
        if cli.week_length == 0 {
            return Err(ConfigError::NoDays);
        }

        Ok(Config {
            week: WeekRequest {
                location: Location {
                    latitude: cli.latitude,
                    longitude: cli.longitude,
                },
                start: cli.start_date,
                week_length: cli.week_length,
                years: cli.years,
                year_window: cli.year_window,
            },
            database: cli.database,
            output_dir: cli.output_dir,
            format: cli.format,
            timeout: (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout)),
            endpoint: cli.endpoint,
            charts: !cli.no_charts,
        })
    }
}

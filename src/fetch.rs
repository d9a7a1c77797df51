use std::time::Duration;

use log::debug;
use serde::Deserialize;
use thiserror::Error;
use time::{Date, Month};

pub const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

const DAILY_FIELDS: &str = "temperature_2m_mean,windspeed_10m_mean,precipitation_sum";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn day(&self, month: u8, day: u8) -> DayQuery {
        DayQuery {
            latitude: self.latitude,
            longitude: self.longitude,
            month,
            day,
        }
    }
}

/// A recurring calendar day at a fixed point, without a year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub month: u8,
    pub day: u8,
}

impl DayQuery {
    /// Resolve the calendar day in `year`. Fails for dates such as Feb 29 of a non-leap year.
    pub fn date_in(&self, year: i32) -> Result<Date, FetchError> {
        let invalid = |source| FetchError::InvalidDate {
            year,
            month: self.month,
            day: self.day,
            source,
        };
        let month = Month::try_from(self.month).map_err(invalid)?;
        Date::from_calendar_date(year, month, self.day).map_err(invalid)
    }
}

/// One year's daily values, in °F, mph and inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDayObservation {
    pub temperature: f64,
    pub wind_speed: f64,
    pub precipitation: f64,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{year:04}-{month:02}-{day:02} is not a calendar date")]
    InvalidDate {
        year: i32,
        month: u8,
        day: u8,
        #[source]
        source: time::error::ComponentRange,
    },
    #[error("Could not reach the archive: {0}")]
    Transport(#[from] Box<ureq::Transport>),
    #[error("Archive answered with status {code}: {reason}")]
    Status { code: u16, reason: String },
    #[error("Could not read the archive response: {0}")]
    Body(#[from] std::io::Error),
    #[error("Malformed archive response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Archive response has no value for `{0}`")]
    MissingField(&'static str),
}

/// Anything able to produce one day of raw observations.
pub trait DailySource {
    fn fetch_day(&self, query: &DayQuery, year: i32) -> Result<RawDayObservation, FetchError>;
}

impl<F> DailySource for F
where
    F: Fn(&DayQuery, i32) -> Result<RawDayObservation, FetchError>,
{
    fn fetch_day(&self, query: &DayQuery, year: i32) -> Result<RawDayObservation, FetchError> {
        self(query, year)
    }
}

/// Blocking client for the Open-Meteo historical archive.
pub struct ArchiveClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl ArchiveClient {
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            agent: builder.build(),
            endpoint: String::from(ARCHIVE_URL),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl DailySource for ArchiveClient {
    fn fetch_day(&self, query: &DayQuery, year: i32) -> Result<RawDayObservation, FetchError> {
        let params = query_params(query, year)?;
        debug!(
            "GET {} for {year}-{:02}-{:02}",
            self.endpoint, query.month, query.day
        );

        let mut request = self.agent.get(&self.endpoint);
        for (name, value) in &params {
            request = request.query(name, value);
        }

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(FetchError::Status {
                    code,
                    reason: error_reason(&body),
                });
            }
            Err(ureq::Error::Transport(transport)) => return Err(Box::new(transport).into()),
        };

        parse_daily(&response.into_string()?)
    }
}

/// Query string for a single-date window (start date = end date).
pub fn query_params(
    query: &DayQuery,
    year: i32,
) -> Result<Vec<(&'static str, String)>, FetchError> {
    let date = query.date_in(year)?;
    let date = format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    );

    Ok(vec![
        ("latitude", query.latitude.to_string()),
        ("longitude", query.longitude.to_string()),
        ("start_date", date.clone()),
        ("end_date", date),
        ("daily", String::from(DAILY_FIELDS)),
        ("temperature_unit", String::from("fahrenheit")),
        ("wind_speed_unit", String::from("mph")),
        ("precipitation_unit", String::from("inch")),
        ("timezone", String::from("auto")),
    ])
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: Option<Daily>,
}

// The archive reports missing measurements as `null`.
#[derive(Debug, Deserialize)]
struct Daily {
    #[serde(default)]
    temperature_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    windspeed_10m_mean: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ArchiveErrorBody {
    reason: String,
}

fn first(values: &[Option<f64>], field: &'static str) -> Result<f64, FetchError> {
    values
        .first()
        .copied()
        .flatten()
        .ok_or(FetchError::MissingField(field))
}

/// Extract the first daily value of each field from an archive response body.
pub fn parse_daily(body: &str) -> Result<RawDayObservation, FetchError> {
    let response: ArchiveResponse = serde_json::from_str(body)?;
    let daily = response.daily.ok_or(FetchError::MissingField("daily"))?;

    Ok(RawDayObservation {
        temperature: first(&daily.temperature_2m_mean, "temperature_2m_mean")?,
        wind_speed: first(&daily.windspeed_10m_mean, "windspeed_10m_mean")?,
        precipitation: first(&daily.precipitation_sum, "precipitation_sum")?,
    })
}

fn error_reason(body: &str) -> String {
    match serde_json::from_str::<ArchiveErrorBody>(body) {
        Ok(error) => error.reason,
        Err(_) if body.trim().is_empty() => String::from("no details"),
        Err(_) => body.trim().to_string(),
    }
}

use clap::ValueEnum;
use log::info;
use thiserror::Error;
use time::{Date, Duration};

use crate::fetch::{DailySource, FetchError, Location};
use crate::stats::{aggregate, AggregateError, DayStatistics};

/// Which year each day's history window starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum YearWindow {
    /// Every day of the week samples the years following the start date's year,
    /// even once the week has rolled into January.
    #[default]
    Fixed,
    /// Each day samples the years following its own year.
    Rolling,
}

/// What to collect: `week_length` days from `start`, `years` years each.
#[derive(Debug, Clone, Copy)]
pub struct WeekRequest {
    pub location: Location,
    pub start: Date,
    pub week_length: u32,
    pub years: u32,
    pub year_window: YearWindow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayResult {
    /// `MM-DD`
    pub date_label: String,
    pub stats: DayStatistics,
}

#[derive(Debug, Error)]
pub enum WeekError {
    #[error("Could not fetch {label} of {year}")]
    Fetch {
        label: String,
        year: i32,
        #[source]
        source: FetchError,
    },
    #[error("Day {offset} after {start} is outside the supported calendar")]
    OutOfRange { start: Date, offset: u32 },
    #[error("{years} years from {anchor} run past the last representable year")]
    YearsOutOfRange { anchor: i32, years: u32 },
    #[error("Could not aggregate {label}: {source}")]
    Aggregate {
        label: String,
        #[source]
        source: AggregateError,
    },
}

pub fn date_label(date: Date) -> String {
    format!("{:02}-{:02}", u8::from(date.month()), date.day())
}

/// `years` consecutive years starting at `anchor`, checked before any request is made.
fn year_window(anchor: i32, years: u32) -> Result<std::ops::Range<i32>, WeekError> {
    i32::try_from(years)
        .ok()
        .and_then(|years| anchor.checked_add(years))
        .map(|end| anchor..end)
        .ok_or(WeekError::YearsOutOfRange { anchor, years })
}

/// Fetch and aggregate every day of the requested week, in day order.
///
/// The first failing fetch aborts the whole week.
pub fn collect_week<S>(source: &S, request: &WeekRequest) -> Result<Vec<DayResult>, WeekError>
where
    S: DailySource + ?Sized,
{
    let mut results = Vec::with_capacity(request.week_length as usize);

    for offset in 0..request.week_length {
        let date = request
            .start
            .checked_add(Duration::days(i64::from(offset)))
            .ok_or(WeekError::OutOfRange {
                start: request.start,
                offset,
            })?;
        let label = date_label(date);

        let anchor = match request.year_window {
            YearWindow::Fixed => request.start.year(),
            YearWindow::Rolling => date.year(),
        };

        let window = year_window(anchor, request.years)?;

        let query = request.location.day(u8::from(date.month()), date.day());
        let mut observations = Vec::with_capacity(request.years as usize);
        for year in window {
            let observation = source
                .fetch_day(&query, year)
                .map_err(|source| WeekError::Fetch {
                    label: label.clone(),
                    year,
                    source,
                })?;
            observations.push(observation);
        }

        let stats = aggregate(&observations).map_err(|source| WeekError::Aggregate {
            label: label.clone(),
            source,
        })?;
        info!(
            "{label}: {:.1}°F avg, {:.1} mph avg, {:.2} in total",
            stats.avg_temp, stats.avg_wind, stats.sum_precip
        );

        results.push(DayResult {
            date_label: label,
            stats,
        });
    }

    Ok(results)
}

/// Stand-in source for tests: the temperature is the year, the wind speed the
/// day of month, and it always rains one inch.
#[cfg(test)]
pub(crate) fn year_as_temperature(
    query: &crate::fetch::DayQuery,
    year: i32,
) -> Result<crate::fetch::RawDayObservation, FetchError> {
    Ok(crate::fetch::RawDayObservation {
        temperature: f64::from(year),
        wind_speed: f64::from(query.day),
        precipitation: 1.0,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use time::macros::date;

    use super::*;
    use crate::fetch::DayQuery;

    fn request(start: Date, year_window: YearWindow) -> WeekRequest {
        WeekRequest {
            location: Location {
                latitude: 42.35,
                longitude: -71.05,
            },
            start,
            week_length: 7,
            years: 5,
            year_window,
        }
    }

    fn labels(results: &[DayResult]) -> Vec<&str> {
        results.iter().map(|r| r.date_label.as_str()).collect()
    }

    #[test]
    fn first_week_of_december() {
        let results =
            collect_week(&year_as_temperature, &request(date!(2010 - 12 - 01), YearWindow::Fixed))
                .unwrap();

        assert_eq!(
            labels(&results),
            ["12-01", "12-02", "12-03", "12-04", "12-05", "12-06", "12-07"]
        );
        for (day, result) in results.iter().enumerate() {
            assert_eq!(result.stats.avg_temp, 2012.0);
            assert_eq!(result.stats.min_temp, 2010.0);
            assert_eq!(result.stats.max_temp, 2014.0);
            assert_eq!(result.stats.avg_wind, (day + 1) as f64);
            assert_eq!(result.stats.sum_precip, 5.0);
        }
    }

    #[test]
    fn week_across_new_year_keeps_start_year() {
        let calls = RefCell::new(Vec::new());
        let source = |query: &DayQuery, year: i32| {
            calls.borrow_mut().push((query.month, query.day, year));
            year_as_temperature(query, year)
        };

        let results =
            collect_week(&source, &request(date!(2010 - 12 - 29), YearWindow::Fixed)).unwrap();

        assert_eq!(
            labels(&results),
            ["12-29", "12-30", "12-31", "01-01", "01-02", "01-03", "01-04"]
        );
        for result in &results {
            assert_eq!(result.stats.min_temp, 2010.0);
            assert_eq!(result.stats.max_temp, 2014.0);
        }

        let calls = calls.into_inner();
        assert_eq!(calls.len(), 35);
        // New Year's Day is the fourth day and still starts at 2010.
        assert_eq!(
            &calls[15..20],
            &[
                (1, 1, 2010),
                (1, 1, 2011),
                (1, 1, 2012),
                (1, 1, 2013),
                (1, 1, 2014),
            ]
        );
    }

    #[test]
    fn rolling_window_reanchors_in_january() {
        let results =
            collect_week(&year_as_temperature, &request(date!(2010 - 12 - 29), YearWindow::Rolling))
                .unwrap();

        for result in &results[..3] {
            assert_eq!(result.stats.min_temp, 2010.0);
        }
        for result in &results[3..] {
            assert_eq!(result.stats.min_temp, 2011.0);
            assert_eq!(result.stats.max_temp, 2015.0);
        }
    }

    #[test]
    fn fetch_failure_aborts_the_week() {
        let calls = RefCell::new(0);
        let source = |query: &DayQuery, year: i32| {
            *calls.borrow_mut() += 1;
            if query.day == 4 && year == 2012 {
                return Err(FetchError::Status {
                    code: 502,
                    reason: String::from("Bad Gateway"),
                });
            }
            year_as_temperature(query, year)
        };

        let error =
            collect_week(&source, &request(date!(2010 - 12 - 01), YearWindow::Fixed)).unwrap_err();

        match error {
            WeekError::Fetch { label, year, .. } => {
                assert_eq!(label, "12-04");
                assert_eq!(year, 2012);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Three full days, then the first three years of the fourth.
        assert_eq!(calls.into_inner(), 18);
    }

    #[test]
    fn no_years_cannot_be_aggregated() {
        let mut request = request(date!(2010 - 12 - 01), YearWindow::Fixed);
        request.years = 0;

        let error = collect_week(&year_as_temperature, &request).unwrap_err();
        assert!(matches!(error, WeekError::Aggregate { ref label, .. } if label == "12-01"));
    }

    #[test]
    fn oversized_window_fails_before_fetching() {
        let calls = RefCell::new(0);
        let source = |query: &DayQuery, year: i32| {
            *calls.borrow_mut() += 1;
            year_as_temperature(query, year)
        };
        let mut request = request(date!(2010 - 12 - 01), YearWindow::Fixed);
        request.years = u32::MAX;

        let error = collect_week(&source, &request).unwrap_err();

        assert!(matches!(
            error,
            WeekError::YearsOutOfRange {
                anchor: 2010,
                years: u32::MAX
            }
        ));
        assert_eq!(calls.into_inner(), 0);
    }

    #[test]
    fn year_window_bounds() {
        assert_eq!(year_window(2010, 5).unwrap(), 2010..2015);
        assert!(year_window(2010, 0).unwrap().is_empty());
        assert!(year_window(i32::MAX - 3, 5).is_err());
    }

    #[test]
    fn labels_are_zero_padded() {
        assert_eq!(date_label(date!(2011 - 03 - 07)), "03-07");
        assert_eq!(date_label(date!(2011 - 11 - 30)), "11-30");
    }
}

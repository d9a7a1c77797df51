pub mod config;
pub mod error;
pub mod fetch;
pub mod report;
pub mod stats;
pub mod store;
pub mod week;

use log::info;

pub use config::{Cli, Config};
pub use error::{Error, Result};
pub use fetch::{ArchiveClient, DailySource, DayQuery, Location, RawDayObservation};
pub use report::{chart_specs, render, ChartFormat, ChartSpec};
pub use stats::{aggregate, DayStatistics};
pub use store::{SqliteStore, WeekRecord, WeekStore};
pub use week::{collect_week, DayResult, WeekRequest, YearWindow};

/// Collect the configured week and replace the stored one with it.
///
/// Every day of the week is fetched over several consecutive years from the
/// source and aggregated per calendar day before anything is written.
///
/// Returns the rows as read back from the store. If collection fails the
/// store is left untouched.
pub fn run<S, W>(request: &WeekRequest, source: &S, store: &mut W) -> Result<Vec<WeekRecord>>
where
    S: DailySource + ?Sized,
    W: WeekStore + ?Sized,
{
    info!(
        "Collecting {} days from {} over {} years at ({}, {})",
        request.week_length,
        request.start,
        request.years,
        request.location.latitude,
        request.location.longitude
    );
    let days = collect_week(source, request)?;

    store.replace_week(request.location, &days)?;
    Ok(store.load_week()?)
}

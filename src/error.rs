use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::report::ReportError;
use crate::store::StoreError;
use crate::week::WeekError;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(
        code(weather_week::config),
        help("run with --help to see the accepted values")
    )]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(
        code(weather_week::fetch),
        help("nothing was stored; check the network, the endpoint and the requested dates")
    )]
    Week(#[from] WeekError),

    #[error(transparent)]
    #[diagnostic(code(weather_week::store))]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(
        code(weather_week::report),
        help("the week was stored; only the charts are missing")
    )]
    Report(#[from] ReportError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

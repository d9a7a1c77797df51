use clap::Parser;
use log::{info, warn};

use weather_week::{render, run, ArchiveClient, Cli, Config, SqliteStore};

fn main() -> miette::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::try_from(Cli::parse()).map_err(weather_week::Error::from)?;

    let client = ArchiveClient::new(config.timeout).with_endpoint(config.endpoint.as_str());
    info!("Querying {}", client.endpoint());
    let mut store = SqliteStore::open(&config.database).map_err(weather_week::Error::from)?;

    let records = run(&config.week, &client, &mut store)?;

    for record in &records {
        println!(
            "{}  temp {:6.1} ({:6.1}..{:6.1}) °F  wind {:5.1} ({:5.1}..{:5.1}) mph  precip {:5.2} ({:.2}..{:.2}) in",
            record.date_label,
            record.stats.avg_temp,
            record.stats.min_temp,
            record.stats.max_temp,
            record.stats.avg_wind,
            record.stats.min_wind,
            record.stats.max_wind,
            record.stats.sum_precip,
            record.stats.min_precip,
            record.stats.max_precip,
        );
    }

    if !config.charts {
        return Ok(());
    }

    match render(&records, config.week.years, &config.output_dir, config.format) {
        Ok(paths) => {
            for path in paths {
                println!("{}", path.display());
            }
            Ok(())
        }
        Err(e) => {
            warn!("Charts were not written; the week is stored in {}", config.database.display());
            Err(weather_week::Error::from(e).into())
        }
    }
}

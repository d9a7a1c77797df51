use std::ops::Range;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;

use crate::store::WeekRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ChartFormat {
    #[default]
    Png,
    Svg,
}

impl ChartFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No stored days to draw")]
    Empty,
    #[error("Could not create {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not draw {path}: {message}")]
    Draw { path: String, message: String },
}

/// One line chart: a value per stored day, in storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub file_stem: &'static str,
    pub caption: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<(String, f64)>,
}

impl ChartSpec {
    fn new(
        file_stem: &'static str,
        caption: String,
        y_label: &'static str,
        records: &[WeekRecord],
        value: fn(&WeekRecord) -> f64,
    ) -> Self {
        Self {
            file_stem,
            caption,
            x_label: "Date",
            y_label,
            points: records
                .iter()
                .map(|record| (record.date_label.clone(), value(record)))
                .collect(),
        }
    }

    /// Value range padded so that the line never sits on the frame.
    fn y_range(&self) -> Range<f64> {
        let (min, max) = self
            .points
            .iter()
            .map(|(_, v)| *v)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
                (min.min(v), max.max(v))
            });

        if !min.is_finite() || !max.is_finite() {
            return 0.0..1.0;
        }
        let padding = if max > min { (max - min) * 0.1 } else { 1.0 };
        (min - padding)..(max + padding)
    }
}

/// The temperature, wind and precipitation charts for a stored week.
pub fn chart_specs(records: &[WeekRecord], years: u32) -> [ChartSpec; 3] {
    [
        ChartSpec::new(
            "temperature",
            format!("Week Long Average Temperature Across {years} Years"),
            "Temperature (°F)",
            records,
            |r| r.stats.avg_temp,
        ),
        ChartSpec::new(
            "wind_speed",
            format!("Week Long Average Wind Speed Across {years} Years"),
            "Wind Speed (mph)",
            records,
            |r| r.stats.avg_wind,
        ),
        ChartSpec::new(
            "precipitation",
            format!("Week Long Total Precipitation Across {years} Years"),
            "Precipitation (Inches)",
            records,
            |r| r.stats.sum_precip,
        ),
    ]
}

/// Write the three charts into `out_dir` and return their paths.
pub fn render(
    records: &[WeekRecord],
    years: u32,
    out_dir: &Path,
    format: ChartFormat,
) -> Result<Vec<PathBuf>, ReportError> {
    if records.is_empty() {
        return Err(ReportError::Empty);
    }

    std::fs::create_dir_all(out_dir).map_err(|source| ReportError::OutputDir {
        path: out_dir.display().to_string(),
        source,
    })?;

    let mut written = Vec::new();
    for spec in chart_specs(records, years) {
        let path = out_dir.join(format!("{}.{}", spec.file_stem, format.extension()));
        let result = match format {
            ChartFormat::Png => draw(BitMapBackend::new(&path, (1280, 720)).into_drawing_area(), &spec),
            ChartFormat::Svg => draw(SVGBackend::new(&path, (1280, 720)).into_drawing_area(), &spec),
        };
        result.map_err(|message| ReportError::Draw {
            path: path.display().to_string(),
            message,
        })?;

        info!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

fn draw<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, spec: &ChartSpec) -> Result<(), String> {
    let labels: Vec<&str> = spec.points.iter().map(|(label, _)| label.as_str()).collect();
    let last = labels.len().saturating_sub(1).max(1);

    root.fill(&WHITE).map_err(|e| e.to_string())?;
    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.caption, ("sans-serif", 36).into_font())
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(0usize..last, spec.y_range())
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|i| labels.get(*i).map(|l| l.to_string()).unwrap_or_default())
        .x_desc(spec.x_label)
        .y_desc(spec.y_label)
        .draw()
        .map_err(|e| e.to_string())?;

    let points = spec.points.iter().enumerate().map(|(i, (_, v))| (i, *v));
    chart
        .draw_series(LineSeries::new(points.clone(), BLUE))
        .map_err(|e| e.to_string())?;
    chart
        .draw_series(points.map(|point| Circle::new(point, 5, BLUE.filled())))
        .map_err(|e| e.to_string())?;

    root.present().map_err(|e| e.to_string())?;
    Ok(())
}

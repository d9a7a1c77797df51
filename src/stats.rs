use thiserror::Error;

use crate::fetch::RawDayObservation;

/// Summary of one calendar day across a window of years.
///
/// Precipitation is summed across the window rather than averaged: it is the
/// total that fell on that calendar day over all the sampled years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayStatistics {
    pub avg_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,

    pub avg_wind: f64,
    pub min_wind: f64,
    pub max_wind: f64,

    pub sum_precip: f64,
    pub min_precip: f64,
    pub max_precip: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Cannot aggregate an empty set of observations")]
    Empty,
}

/// Running sum/min/max of a single metric.
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new(first: f64) -> Self {
        Self {
            sum: first,
            min: first,
            max: first,
        }
    }

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn mean(&self, count: usize) -> f64 {
        self.sum / count as f64
    }
}

/// Compute the statistics of a non-empty set of observations.
pub fn aggregate(observations: &[RawDayObservation]) -> Result<DayStatistics, AggregateError> {
    let (first, rest) = observations.split_first().ok_or(AggregateError::Empty)?;

    let mut temp = Accumulator::new(first.temperature);
    let mut wind = Accumulator::new(first.wind_speed);
    let mut precip = Accumulator::new(first.precipitation);

    for observation in rest {
        temp.push(observation.temperature);
        wind.push(observation.wind_speed);
        precip.push(observation.precipitation);
    }

    let count = observations.len();

    Ok(DayStatistics {
        avg_temp: temp.mean(count),
        min_temp: temp.min,
        max_temp: temp.max,
        avg_wind: wind.mean(count),
        min_wind: wind.min,
        max_wind: wind.max,
        sum_precip: precip.sum,
        min_precip: precip.min,
        max_precip: precip.max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(temperature: f64, wind_speed: f64, precipitation: f64) -> RawDayObservation {
        RawDayObservation {
            temperature,
            wind_speed,
            precipitation,
        }
    }

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn five_year_temperatures() {
        let observations: Vec<_> = [30.0, 32.0, 34.0, 36.0, 38.0]
            .into_iter()
            .map(|t| obs(t, 10.0, 0.1))
            .collect();

        let stats = aggregate(&observations).unwrap();
        assert!(close(stats.avg_temp, 34.0));
        assert_eq!(stats.min_temp, 30.0);
        assert_eq!(stats.max_temp, 38.0);
    }

    #[test]
    fn precipitation_is_summed_not_averaged() {
        let observations = [
            obs(40.0, 5.0, 0.25),
            obs(41.0, 6.0, 0.0),
            obs(42.0, 7.0, 1.5),
        ];

        let stats = aggregate(&observations).unwrap();
        assert!(close(stats.sum_precip, 1.75));
        assert_eq!(stats.min_precip, 0.0);
        assert_eq!(stats.max_precip, 1.5);
        assert!(close(stats.avg_wind, 6.0));
    }

    #[test]
    fn single_observation() {
        let stats = aggregate(&[obs(-4.5, 12.0, 0.3)]).unwrap();
        assert_eq!(stats.avg_temp, -4.5);
        assert_eq!(stats.min_temp, -4.5);
        assert_eq!(stats.max_temp, -4.5);
        assert_eq!(stats.sum_precip, 0.3);
    }

    #[test]
    fn empty_is_rejected() {
        assert_eq!(aggregate(&[]), Err(AggregateError::Empty));
    }

    #[test]
    fn average_lies_between_extremes() {
        let samples: &[&[(f64, f64)]] = &[
            &[(12.0, 3.0), (-8.0, 21.5), (33.3, 0.0)],
            &[(70.1, 9.9), (70.1, 9.9)],
            &[(-40.0, 50.0), (120.0, 1.0), (0.0, 0.5), (15.5, 18.2), (99.0, 7.0)],
        ];

        for sample in samples {
            let observations: Vec<_> = sample.iter().map(|&(t, w)| obs(t, w, 0.0)).collect();
            let stats = aggregate(&observations).unwrap();

            let mean = sample.iter().map(|(t, _)| t).sum::<f64>() / sample.len() as f64;
            assert!(close(stats.avg_temp, mean));
            assert!(stats.min_temp <= stats.avg_temp && stats.avg_temp <= stats.max_temp);
            assert!(stats.min_wind <= stats.avg_wind && stats.avg_wind <= stats.max_wind);
        }
    }
}

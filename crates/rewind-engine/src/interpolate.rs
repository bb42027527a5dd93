//! Position interpolation: a car's state at an arbitrary session time.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::{DriverId, ReplayDataset, Sample, TelemetrySeries};

/// How positions between two telemetry samples are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Most recent sample at or before the query time
    #[default]
    Step,
    /// Blend position and speed with the following sample
    Linear,
}

impl FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "step" => Ok(Interpolation::Step),
            "linear" => Ok(Interpolation::Linear),
            other => Err(format!("unknown interpolation mode '{}'", other)),
        }
    }
}

/// Reconstructed state of one car.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarState {
    pub driver_id: DriverId,
    pub x: f64,
    pub y: f64,
    pub speed_kmh: f64,
    pub gear: i32,
    pub drs_active: bool,
    /// Direction of travel in degrees, counter-clockwise from +x
    pub heading_deg: f64,
    pub lap_number: u32,
    pub position: Option<u32>,
    pub compound: Option<String>,
    pub gap_to_leader_ms: Option<f64>,
    pub interval_ms: Option<f64>,
}

/// Step-interpolate `driver` at `time_ms`.
///
/// Returns `None` when the time is outside every lap of the driver or the
/// lap has no telemetry. Inside a lap but past its last sample, the last
/// sample is used.
pub fn interpolate(dataset: &ReplayDataset, driver: DriverId, time_ms: f64) -> Option<CarState> {
    interpolate_with(dataset, driver, time_ms, Interpolation::Step)
}

/// Interpolate `driver` at `time_ms` using the given mode.
pub fn interpolate_with(
    dataset: &ReplayDataset,
    driver: DriverId,
    time_ms: f64,
    mode: Interpolation,
) -> Option<CarState> {
    let lap = dataset
        .laps_for(driver)
        .iter()
        .find(|lap| lap.contains(time_ms))?;
    let lap_relative_ms = time_ms - lap.lap_start_time_ms?;

    let series = dataset.telemetry_for(driver, lap.lap_number)?;
    let index = series.index_at(lap_relative_ms)?;
    let current = series.sample(index)?;
    let next = series.sample(index + 1);

    let (x, y, speed_kmh) = match (mode, next) {
        (Interpolation::Linear, Some(next)) => blend(&current, &next, lap_relative_ms),
        _ => (current.x, current.y, current.speed_kmh),
    };

    Some(CarState {
        driver_id: driver,
        x,
        y,
        speed_kmh,
        gear: current.gear,
        drs_active: current.drs > 0,
        heading_deg: heading(series, index),
        lap_number: lap.lap_number,
        position: lap.position,
        compound: lap.compound.clone(),
        gap_to_leader_ms: lap.gap_to_leader_ms,
        interval_ms: lap.interval_ms,
    })
}

fn blend(a: &Sample, b: &Sample, at_ms: f64) -> (f64, f64, f64) {
    let span = b.timestamp_ms - a.timestamp_ms;
    if span <= 0.0 || at_ms <= a.timestamp_ms {
        return (a.x, a.y, a.speed_kmh);
    }
    let t = ((at_ms - a.timestamp_ms) / span).clamp(0.0, 1.0);
    (
        a.x + (b.x - a.x) * t,
        a.y + (b.y - a.y) * t,
        a.speed_kmh + (b.speed_kmh - a.speed_kmh) * t,
    )
}

/// Heading from the position delta around `index`.
fn heading(series: &TelemetrySeries, index: usize) -> f64 {
    let pair = match (series.sample(index), series.sample(index + 1)) {
        (Some(a), Some(b)) => Some((a, b)),
        (Some(b), None) if index > 0 => series.sample(index - 1).map(|a| (a, b)),
        _ => None,
    };
    match pair {
        Some((a, b)) => {
            let (dx, dy) = (b.x - a.x, b.y - a.y);
            if dx == 0.0 && dy == 0.0 {
                0.0
            } else {
                dy.atan2(dx).to_degrees().rem_euclid(360.0)
            }
        }
        None => 0.0,
    }
}

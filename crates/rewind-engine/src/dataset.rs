//! In-memory replay dataset: laps, telemetry series and the driver roster.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::TelemetryRecord;

/// A driver identifier as recorded in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(pub u32);

impl std::fmt::Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recorded lap of one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    pub driver_id: DriverId,
    /// 1-based, unique per driver
    pub lap_number: u32,
    /// Session-relative start of the lap
    pub lap_start_time_ms: Option<f64>,
    pub lap_time_ms: Option<f64>,
    /// Race position during the lap
    pub position: Option<u32>,
    pub gap_to_leader_ms: Option<f64>,
    pub interval_ms: Option<f64>,
    pub compound: Option<String>,
}

impl Lap {
    /// End of the lap, when both bounds are known.
    pub fn end_time_ms(&self) -> Option<f64> {
        Some(self.lap_start_time_ms? + self.lap_time_ms?)
    }

    /// Whether `time_ms` falls inside the closed lap interval.
    ///
    /// Laps without a start never match. A missing lap time collapses the
    /// interval to its start instant.
    pub fn contains(&self, time_ms: f64) -> bool {
        match self.lap_start_time_ms {
            Some(start) => {
                let end = start + self.lap_time_ms.unwrap_or(0.0);
                start <= time_ms && time_ms <= end
            }
            None => false,
        }
    }
}

/// Summary of a classified driver, taken from the declared results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSummary {
    pub driver_id: DriverId,
    pub team_id: Option<u32>,
    pub position: Option<u32>,
}

/// A single telemetry sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp_ms: f64,
    pub x: f64,
    pub y: f64,
    pub speed_kmh: f64,
    pub gear: i32,
    pub drs: i32,
}

/// Parallel telemetry arrays for one (driver, lap).
///
/// All arrays have the same length; `timestamps_ms` is non-decreasing and
/// serves as the lookup index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySeries {
    timestamps_ms: Vec<f64>,
    pos_x: Vec<f64>,
    pos_y: Vec<f64>,
    speed_kmh: Vec<f64>,
    gear: Vec<i32>,
    drs: Vec<i32>,
}

impl TelemetrySeries {
    /// Build a series, truncating every array to the shortest one.
    pub fn new(
        mut timestamps_ms: Vec<f64>,
        mut pos_x: Vec<f64>,
        mut pos_y: Vec<f64>,
        mut speed_kmh: Vec<f64>,
        mut gear: Vec<i32>,
        mut drs: Vec<i32>,
    ) -> Self {
        let len = [
            timestamps_ms.len(),
            pos_x.len(),
            pos_y.len(),
            speed_kmh.len(),
            gear.len(),
            drs.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0);

        timestamps_ms.truncate(len);
        pos_x.truncate(len);
        pos_y.truncate(len);
        speed_kmh.truncate(len);
        gear.truncate(len);
        drs.truncate(len);

        Self {
            timestamps_ms,
            pos_x,
            pos_y,
            speed_kmh,
            gear,
            drs,
        }
    }

    /// Number of usable samples.
    pub fn len(&self) -> usize {
        self.timestamps_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps_ms.is_empty()
    }

    /// Index of the last sample at or before `lap_relative_ms`.
    ///
    /// Ties resolve to the highest matching index; a time before the first
    /// sample maps to index 0. Returns `None` for an empty series.
    pub fn index_at(&self, lap_relative_ms: f64) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let at_or_before = self
            .timestamps_ms
            .partition_point(|&t| t <= lap_relative_ms);
        Some(at_or_before.saturating_sub(1).min(self.len() - 1))
    }

    /// Sample at `index`, if in range.
    pub fn sample(&self, index: usize) -> Option<Sample> {
        if index >= self.len() {
            return None;
        }
        Some(Sample {
            timestamp_ms: self.timestamps_ms[index],
            x: self.pos_x[index],
            y: self.pos_y[index],
            speed_kmh: self.speed_kmh[index],
            gear: self.gear[index],
            drs: self.drs[index],
        })
    }
}

impl From<TelemetryRecord> for TelemetrySeries {
    fn from(record: TelemetryRecord) -> Self {
        let lengths = [
            record.timestamps_ms.len(),
            record.pos_x.len(),
            record.pos_y.len(),
            record.speed_kmh.len(),
            record.gear.len(),
            record.drs.len(),
        ];
        if lengths.iter().any(|&l| l != record.sample_count) {
            warn!(
                driver = %record.driver_id,
                lap = record.lap_number,
                sample_count = record.sample_count,
                ?lengths,
                "Telemetry arrays disagree with sample count, truncating"
            );
        }
        TelemetrySeries::new(
            record.timestamps_ms,
            record.pos_x,
            record.pos_y,
            record.speed_kmh,
            record.gear,
            record.drs,
        )
    }
}

/// Everything needed to replay one archived session.
///
/// Built once by the loader and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct ReplayDataset {
    session_id: u64,
    total_laps: u32,
    drivers: BTreeMap<DriverId, DriverSummary>,
    laps: HashMap<DriverId, Vec<Lap>>,
    telemetry: HashMap<(DriverId, u32), TelemetrySeries>,
    total_duration_ms: f64,
}

impl ReplayDataset {
    /// Assemble a dataset, indexing laps per driver in lap order.
    pub fn new(
        session_id: u64,
        total_laps: u32,
        drivers: impl IntoIterator<Item = DriverSummary>,
        laps: impl IntoIterator<Item = Lap>,
        telemetry: impl IntoIterator<Item = ((DriverId, u32), TelemetrySeries)>,
    ) -> Self {
        let drivers: BTreeMap<_, _> = drivers.into_iter().map(|d| (d.driver_id, d)).collect();

        let mut by_driver: HashMap<DriverId, Vec<Lap>> = HashMap::new();
        let mut total_duration_ms = 0.0f64;
        for lap in laps {
            if let Some(end) = lap.end_time_ms() {
                total_duration_ms = total_duration_ms.max(end);
            }
            by_driver.entry(lap.driver_id).or_default().push(lap);
        }
        for laps in by_driver.values_mut() {
            laps.sort_by_key(|l| l.lap_number);
        }

        Self {
            session_id,
            total_laps,
            drivers,
            laps: by_driver,
            telemetry: telemetry.into_iter().collect(),
            total_duration_ms,
        }
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn total_laps(&self) -> u32 {
        self.total_laps
    }

    /// Latest known lap end across all drivers.
    pub fn total_duration_ms(&self) -> f64 {
        self.total_duration_ms
    }

    /// Classified drivers in id order.
    pub fn drivers(&self) -> impl Iterator<Item = &DriverSummary> {
        self.drivers.values()
    }

    pub fn driver(&self, driver: DriverId) -> Option<&DriverSummary> {
        self.drivers.get(&driver)
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    /// A driver's laps ordered by lap number.
    pub fn laps_for(&self, driver: DriverId) -> &[Lap] {
        self.laps.get(&driver).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn telemetry_for(&self, driver: DriverId, lap_number: u32) -> Option<&TelemetrySeries> {
        self.telemetry.get(&(driver, lap_number))
    }

    pub fn has_telemetry(&self) -> bool {
        !self.telemetry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lap(driver: u32, number: u32, start: Option<f64>, time: Option<f64>) -> Lap {
        Lap {
            driver_id: DriverId(driver),
            lap_number: number,
            lap_start_time_ms: start,
            lap_time_ms: time,
            position: None,
            gap_to_leader_ms: None,
            interval_ms: None,
            compound: None,
        }
    }

    #[test]
    fn lap_interval_is_closed() {
        let l = lap(1, 1, Some(1000.0), Some(500.0));
        assert!(l.contains(1000.0));
        assert!(l.contains(1500.0));
        assert!(!l.contains(999.9));
        assert!(!l.contains(1500.1));
    }

    #[test]
    fn lap_without_start_never_matches() {
        let l = lap(1, 1, None, Some(500.0));
        assert!(!l.contains(0.0));
        assert_eq!(l.end_time_ms(), None);
    }

    #[test]
    fn lap_without_time_is_single_instant() {
        let l = lap(1, 1, Some(200.0), None);
        assert!(l.contains(200.0));
        assert!(!l.contains(200.5));
    }

    #[test]
    fn series_truncates_to_shortest_array() {
        let series = TelemetrySeries::new(
            vec![0.0, 1.0, 2.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0, 2.0],
            vec![100.0, 110.0, 120.0],
            vec![3, 4, 4],
            vec![0, 0, 1],
        );
        assert_eq!(series.len(), 2);
        assert!(series.sample(2).is_none());
    }

    #[test]
    fn index_lookup_uses_last_sample_at_or_before() {
        let series = TelemetrySeries::new(
            vec![0.0, 500.0, 500.0, 1000.0],
            vec![0.0; 4],
            vec![0.0; 4],
            vec![0.0; 4],
            vec![0; 4],
            vec![0; 4],
        );
        assert_eq!(series.index_at(-10.0), Some(0));
        assert_eq!(series.index_at(250.0), Some(0));
        // Ties go to the highest matching index.
        assert_eq!(series.index_at(500.0), Some(2));
        assert_eq!(series.index_at(999.0), Some(2));
        assert_eq!(series.index_at(5000.0), Some(3));
        assert_eq!(TelemetrySeries::default().index_at(0.0), None);
    }

    #[test]
    fn dataset_orders_laps_and_computes_duration() {
        let dataset = ReplayDataset::new(
            7,
            2,
            vec![DriverSummary {
                driver_id: DriverId(1),
                team_id: Some(3),
                position: Some(1),
            }],
            vec![
                lap(1, 2, Some(90_000.0), Some(88_000.0)),
                lap(1, 1, Some(0.0), Some(90_000.0)),
                lap(2, 1, Some(0.0), None),
            ],
            Vec::new(),
        );

        let laps = dataset.laps_for(DriverId(1));
        assert_eq!(laps[0].lap_number, 1);
        assert_eq!(laps[1].lap_number, 2);
        assert_eq!(dataset.total_duration_ms(), 178_000.0);
        assert_eq!(dataset.driver_count(), 1);
        assert!(!dataset.has_telemetry());
        assert!(dataset.laps_for(DriverId(9)).is_empty());
    }
}

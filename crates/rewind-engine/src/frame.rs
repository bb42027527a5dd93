//! Frame assembly: one snapshot of every resolvable car at one instant.

use serde::{Deserialize, Serialize};

use crate::dataset::{DriverId, ReplayDataset};
use crate::interpolate::{interpolate_with, CarState, Interpolation};

/// Per-car entry of a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarFrame {
    pub driver_id: DriverId,
    pub team_id: Option<u32>,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub speed_kmh: f64,
    pub gear: i32,
    pub lap_number: u32,
    pub position: Option<u32>,
    pub gap_to_leader_ms: Option<f64>,
    pub interval_ms: Option<f64>,
    pub compound: Option<String>,
    pub drs_active: bool,
}

impl CarFrame {
    fn new(state: CarState, team_id: Option<u32>) -> Self {
        Self {
            driver_id: state.driver_id,
            team_id,
            x: state.x,
            y: state.y,
            heading: state.heading_deg,
            speed_kmh: state.speed_kmh,
            gear: state.gear,
            lap_number: state.lap_number,
            position: state.position,
            gap_to_leader_ms: state.gap_to_leader_ms,
            interval_ms: state.interval_ms,
            compound: state.compound,
            drs_active: state.drs_active,
        }
    }
}

/// Snapshot of the whole field at one virtual instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub timestamp_ms: f64,
    pub current_lap: u32,
    pub total_laps: u32,
    pub elapsed_time_str: String,
    pub replay_speed: f64,
    pub cars: Vec<CarFrame>,
    pub track_status: Option<String>,
}

/// Clock values a frame is taken at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    pub time_ms: f64,
    pub replay_speed: f64,
    /// Lap shown by the previous frame, kept when no car resolves
    pub current_lap: u32,
}

/// Build the frame for `clock` without touching any playback state.
///
/// Drivers that cannot be resolved are left out. The current lap is the
/// leader's lap, the leader being the car with the smallest race position.
pub fn assemble(dataset: &ReplayDataset, clock: FrameClock, mode: Interpolation) -> Frame {
    let cars: Vec<CarFrame> = dataset
        .drivers()
        .filter_map(|driver| {
            interpolate_with(dataset, driver.driver_id, clock.time_ms, mode)
                .map(|state| CarFrame::new(state, driver.team_id))
        })
        .collect();

    let current_lap = cars
        .iter()
        .min_by_key(|car| car.position.unwrap_or(u32::MAX))
        .map(|leader| leader.lap_number)
        .unwrap_or(clock.current_lap);

    Frame {
        timestamp_ms: clock.time_ms,
        current_lap,
        total_laps: dataset.total_laps(),
        elapsed_time_str: format_elapsed(clock.time_ms),
        replay_speed: clock.replay_speed,
        cars,
        track_status: None,
    }
}

/// Format virtual time as `HH:MM:SS`, truncating partial seconds.
pub fn format_elapsed(time_ms: f64) -> String {
    let total_secs = (time_ms.max(0.0) / 1000.0).floor() as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn clock(time_ms: f64, current_lap: u32) -> FrameClock {
        FrameClock {
            time_ms,
            replay_speed: 2.0,
            current_lap,
        }
    }

    #[test]
    fn elapsed_time_floors_to_seconds() {
        assert_eq!(format_elapsed(0.0), "00:00:00");
        assert_eq!(format_elapsed(59_999.0), "00:00:59");
        assert_eq!(format_elapsed(3_661_000.0), "01:01:01");
        assert_eq!(format_elapsed(-5.0), "00:00:00");
    }

    #[test]
    fn unavailable_drivers_are_omitted() {
        let dataset = fixtures::two_driver_dataset();
        let frame = assemble(&dataset, clock(500.0, 0), Interpolation::Step);

        // Driver 3 never raced.
        let ids: Vec<_> = frame.cars.iter().map(|c| c.driver_id).collect();
        assert_eq!(ids, vec![DriverId(1), DriverId(2)]);
        assert_eq!(frame.total_laps, 2);
        assert_eq!(frame.replay_speed, 2.0);
        assert_eq!(frame.track_status, None);
        assert_eq!(frame.cars[0].team_id, Some(10));
    }

    #[test]
    fn current_lap_follows_leader() {
        let dataset = fixtures::two_driver_dataset();

        let lap_one = assemble(&dataset, clock(500.0, 0), Interpolation::Step);
        assert_eq!(lap_one.current_lap, 1);

        // Driver 2 has no lap 2 telemetry, so driver 1 leads by default.
        let lap_two = assemble(&dataset, clock(95_000.0, 1), Interpolation::Step);
        assert_eq!(lap_two.cars.len(), 1);
        assert_eq!(lap_two.current_lap, 2);
    }

    #[test]
    fn current_lap_holds_when_no_car_resolves() {
        let dataset = fixtures::two_driver_dataset();
        let frame = assemble(&dataset, clock(180_000.0, 2), Interpolation::Step);
        assert!(frame.cars.is_empty());
        assert_eq!(frame.current_lap, 2);
    }

    #[test]
    fn assembly_is_repeatable() {
        let dataset = fixtures::two_driver_dataset();
        let a = assemble(&dataset, clock(750.0, 0), Interpolation::Step);
        let b = assemble(&dataset, clock(750.0, 0), Interpolation::Step);
        assert_eq!(a, b);
        assert_eq!(a.elapsed_time_str, "00:00:00");
    }

    #[test]
    fn frame_serializes_wire_fields() {
        let dataset = fixtures::single_lap_dataset();
        let frame = assemble(&dataset, clock(750.0, 0), Interpolation::Step);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["cars"][0]["x"], 10.0);
        assert_eq!(json["cars"][0]["drs_active"], true);
        assert_eq!(json["cars"][0]["compound"], "HARD");
        assert!(json["track_status"].is_null());
    }
}

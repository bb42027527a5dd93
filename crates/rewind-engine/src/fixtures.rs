//! Shared test data.

use crate::dataset::{DriverId, Lap, ReplayDataset};
use crate::loader::build_dataset;
use crate::store::{MemoryStore, SessionRecord, SessionResult, TelemetryRecord};

pub const SESSION_ID: u64 = 1;

pub fn lap(
    driver: u32,
    number: u32,
    start: f64,
    time: f64,
    position: Option<u32>,
    compound: &str,
) -> Lap {
    Lap {
        driver_id: DriverId(driver),
        lap_number: number,
        lap_start_time_ms: Some(start),
        lap_time_ms: Some(time),
        position,
        gap_to_leader_ms: position.map(|p| (p as f64 - 1.0) * 1000.0),
        interval_ms: position.filter(|&p| p > 1).map(|_| 1000.0),
        compound: Some(compound.to_string()),
    }
}

/// Telemetry with speed `200 + 10i`, gear `3 + i` and DRS open on odd samples.
pub fn telemetry(
    driver: u32,
    lap: u32,
    timestamps: &[f64],
    positions: &[(f64, f64)],
) -> TelemetryRecord {
    let n = timestamps.len();
    TelemetryRecord {
        driver_id: DriverId(driver),
        lap_number: lap,
        sample_count: n,
        timestamps_ms: timestamps.to_vec(),
        pos_x: positions.iter().map(|p| p.0).collect(),
        pos_y: positions.iter().map(|p| p.1).collect(),
        speed_kmh: (0..n).map(|i| 200.0 + i as f64 * 10.0).collect(),
        gear: (0..n).map(|i| 3 + i as i32).collect(),
        drs: (0..n).map(|i| (i as i32 % 2) * 10).collect(),
    }
}

fn result(driver: u32, team: u32, position: Option<u32>) -> SessionResult {
    SessionResult {
        driver_id: DriverId(driver),
        team_id: Some(team),
        position,
    }
}

/// Two racing drivers over two laps plus a classified non-starter (driver 3).
///
/// Driver 1 leads lap 1, driver 2 leads lap 2. The last lap ends at 181 s.
pub fn two_driver_session() -> SessionRecord {
    SessionRecord {
        session_id: SESSION_ID,
        total_laps: 2,
        laps: vec![
            lap(1, 1, 0.0, 90_000.0, Some(1), "SOFT"),
            lap(2, 1, 0.0, 91_000.0, Some(2), "MEDIUM"),
            lap(1, 2, 90_000.0, 88_000.0, Some(2), "SOFT"),
            lap(2, 2, 91_000.0, 90_000.0, Some(1), "MEDIUM"),
        ],
        results: vec![result(1, 10, Some(1)), result(2, 20, Some(2)), result(3, 30, None)],
    }
}

pub fn two_driver_telemetry() -> Vec<TelemetryRecord> {
    vec![
        telemetry(1, 1, &[0.0, 500.0, 1000.0], &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]),
        telemetry(1, 2, &[0.0, 1000.0], &[(100.0, 0.0), (110.0, 0.0)]),
        telemetry(2, 1, &[0.0, 1000.0], &[(0.0, 5.0), (8.0, 5.0)]),
    ]
}

pub fn two_driver_store() -> MemoryStore {
    MemoryStore::new().with_session(two_driver_session(), two_driver_telemetry())
}

pub fn two_driver_dataset() -> ReplayDataset {
    build_dataset(&two_driver_store(), SESSION_ID).expect("fixture session loads")
}

/// One driver, one 90 s lap, samples at 0/500/1000 ms moving along x.
pub fn single_lap_dataset() -> ReplayDataset {
    let session = SessionRecord {
        session_id: SESSION_ID,
        total_laps: 1,
        laps: vec![lap(1, 1, 0.0, 90_000.0, Some(1), "HARD")],
        results: vec![result(1, 10, Some(1))],
    };
    let store = MemoryStore::new().with_session(
        session,
        vec![telemetry(1, 1, &[0.0, 500.0, 1000.0], &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)])],
    );
    build_dataset(&store, SESSION_ID).expect("fixture session loads")
}

/// One driver tracing a loop: diagonal, back along -x, down -y, a stop,
/// then off towards -x/-y. Samples every 100 ms.
pub fn turning_lap_dataset() -> ReplayDataset {
    let session = SessionRecord {
        session_id: SESSION_ID,
        total_laps: 1,
        laps: vec![lap(1, 1, 0.0, 90_000.0, Some(1), "HARD")],
        results: vec![result(1, 10, Some(1))],
    };
    let path = [(0.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0), (0.0, 0.0), (-5.0, -5.0)];
    let timestamps: Vec<f64> = (0..path.len()).map(|i| i as f64 * 100.0).collect();
    let store = MemoryStore::new().with_session(session, vec![telemetry(1, 1, &timestamps, &path)]);
    build_dataset(&store, SESSION_ID).expect("fixture session loads")
}

//! Session loader: pulls one archived session into a [`ReplayDataset`].

use std::sync::Arc;

use tracing::{debug, info};

use crate::dataset::{DriverSummary, ReplayDataset, TelemetrySeries};
use crate::error::{Error, Result};
use crate::store::TelemetryStore;

/// Load a session from the store without blocking the async runtime.
pub async fn load_dataset(
    store: Arc<dyn TelemetryStore>,
    session_id: u64,
) -> Result<ReplayDataset> {
    tokio::task::spawn_blocking(move || build_dataset(store.as_ref(), session_id))
        .await
        .map_err(|e| Error::Internal(format!("loader task failed: {}", e)))?
}

/// Read a session and its telemetry and index them.
///
/// The roster comes from the declared results. Telemetry may be missing
/// entirely or for some (driver, lap) pairs.
pub fn build_dataset(store: &dyn TelemetryStore, session_id: u64) -> Result<ReplayDataset> {
    let session = store.get_session(session_id)?;
    let telemetry = store.get_telemetry(session_id)?;

    let drivers = session.results.into_iter().map(|r| DriverSummary {
        driver_id: r.driver_id,
        team_id: r.team_id,
        position: r.position,
    });

    let series_count = telemetry.len();
    let series = telemetry
        .into_iter()
        .map(|record| ((record.driver_id, record.lap_number), TelemetrySeries::from(record)))
        .filter(|(key, series)| {
            if series.is_empty() {
                debug!(driver = %key.0, lap = key.1, "Dropping empty telemetry series");
            }
            !series.is_empty()
        });

    let dataset = ReplayDataset::new(
        session_id,
        session.total_laps,
        drivers,
        session.laps,
        series,
    );

    info!(
        session_id,
        drivers = dataset.driver_count(),
        telemetry_series = series_count,
        total_duration_ms = dataset.total_duration_ms(),
        "Loaded replay dataset"
    );

    Ok(dataset)
}

//! Per-viewer playback state: the virtual clock and its transport controls.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dataset::ReplayDataset;
use crate::frame::{assemble, Frame, FrameClock};
use crate::interpolate::Interpolation;
use crate::protocol::Command;

/// Slowest accepted speed multiplier.
pub const MIN_SPEED: f64 = 0.1;
/// Fastest accepted speed multiplier.
pub const MAX_SPEED: f64 = 60.0;

/// Whether the virtual clock is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Clock is held (also the stopped state)
    Paused,
    /// Clock advances with wall time
    Playing,
}

/// Outcome of advancing the clock by one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not playing, nothing to emit
    Idle,
    /// Clock moved, emit a frame
    Advanced,
    /// Clock reached the end for the first time
    Finished,
    /// Clock was already at the end and has been paused again
    Halted,
}

/// Playback of one dataset for one viewer.
pub struct PlaybackSession {
    dataset: ReplayDataset,
    interpolation: Interpolation,
    current_time_ms: f64,
    total_duration_ms: f64,
    state: PlaybackState,
    speed: f64,
    current_lap: u32,
    finished: bool,
}

impl PlaybackSession {
    /// Start paused at time 0 at normal speed.
    pub fn new(dataset: ReplayDataset, interpolation: Interpolation) -> Self {
        let total_duration_ms = dataset.total_duration_ms();
        Self {
            dataset,
            interpolation,
            current_time_ms: 0.0,
            total_duration_ms,
            state: PlaybackState::Paused,
            speed: 1.0,
            current_lap: 0,
            finished: false,
        }
    }

    pub fn current_time_ms(&self) -> f64 {
        self.current_time_ms
    }

    pub fn total_duration_ms(&self) -> f64 {
        self.total_duration_ms
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn current_lap(&self) -> u32 {
        self.current_lap
    }

    /// Start or resume playback.
    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    /// Hold the clock.
    pub fn pause(&mut self) {
        self.state = PlaybackState::Paused;
    }

    /// Pause and rewind to the start.
    pub fn stop(&mut self) {
        self.state = PlaybackState::Paused;
        self.current_time_ms = 0.0;
        self.finished = false;
    }

    /// Jump to `time_ms`, clamped to the session. Play state is kept.
    pub fn seek(&mut self, time_ms: f64) {
        if time_ms.is_nan() {
            return;
        }
        self.current_time_ms = time_ms.clamp(0.0, self.total_duration_ms);
        if self.current_time_ms < self.total_duration_ms {
            self.finished = false;
        }
    }

    /// Set the speed multiplier, clamped to `[MIN_SPEED, MAX_SPEED]`.
    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_nan() {
            return;
        }
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Apply a viewer command. Returns true when the clock was repositioned.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::Stop => {
                self.stop();
                return true;
            }
            Command::Seek { time_ms } => {
                self.seek(time_ms);
                return !time_ms.is_nan();
            }
            Command::Speed { speed } => self.set_speed(speed),
            Command::Unknown => {}
        }
        false
    }

    /// Advance the clock by `elapsed` wall time scaled by the speed.
    ///
    /// Reaching the end pauses playback; only the first arrival reports
    /// [`Tick::Finished`] until a seek or stop moves the clock back.
    pub fn advance(&mut self, elapsed: Duration) -> Tick {
        if !self.is_playing() {
            return Tick::Idle;
        }

        self.current_time_ms += elapsed.as_secs_f64() * 1000.0 * self.speed;

        if self.current_time_ms >= self.total_duration_ms {
            self.current_time_ms = self.total_duration_ms;
            self.state = PlaybackState::Paused;
            if self.finished {
                return Tick::Halted;
            }
            self.finished = true;
            return Tick::Finished;
        }

        Tick::Advanced
    }

    /// Assemble the frame at the current time and remember its lap.
    pub fn frame(&mut self) -> Frame {
        let frame = assemble(
            &self.dataset,
            FrameClock {
                time_ms: self.current_time_ms,
                replay_speed: self.speed,
                current_lap: self.current_lap,
            },
            self.interpolation,
        );
        self.current_lap = frame.current_lap;
        frame
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus::from(self)
    }

    pub fn init_info(&self) -> InitInfo {
        InitInfo {
            total_duration_ms: self.total_duration_ms,
            total_laps: self.dataset.total_laps(),
            driver_count: self.dataset.driver_count(),
            has_telemetry: self.dataset.has_telemetry(),
        }
    }
}

/// Playback status for sending to the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub is_playing: bool,
    pub current_time_ms: f64,
    pub replay_speed: f64,
}

impl From<&PlaybackSession> for PlaybackStatus {
    fn from(session: &PlaybackSession) -> Self {
        Self {
            is_playing: session.is_playing(),
            current_time_ms: session.current_time_ms,
            replay_speed: session.speed,
        }
    }
}

/// Replay summary sent once per connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitInfo {
    pub total_duration_ms: f64,
    pub total_laps: u32,
    pub driver_count: usize,
    pub has_telemetry: bool,
}

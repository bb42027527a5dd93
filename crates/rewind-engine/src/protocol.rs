//! Messages exchanged with a replay viewer.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::frame::Frame;
use crate::playback::{InitInfo, PlaybackStatus};

/// A control command sent by the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Stop,
    Seek { time_ms: f64 },
    Speed { speed: f64 },
    /// Any action this engine does not know; ignored
    Unknown,
}

#[derive(Deserialize)]
struct RawCommand {
    action: String,
    time_ms: Option<f64>,
    speed: Option<f64>,
}

impl Command {
    /// Parse `{action, time_ms?, speed?}`.
    ///
    /// Only invalid JSON is an error. A seek without a time goes to 0 and a
    /// speed change without a value resets to 1x.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawCommand = serde_json::from_str(text)?;
        Ok(match raw.action.as_str() {
            "play" => Command::Play,
            "pause" => Command::Pause,
            "stop" => Command::Stop,
            "seek" => Command::Seek {
                time_ms: raw.time_ms.unwrap_or(0.0),
            },
            "speed" => Command::Speed {
                speed: raw.speed.unwrap_or(1.0),
            },
            _ => Command::Unknown,
        })
    }
}

/// Everything the engine sends to a viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once when the replay is ready
    Init { data: InitInfo },
    /// Acknowledges a processed command
    Status { data: PlaybackStatus },
    /// One snapshot of the field
    Frame { data: Frame },
    /// The virtual clock reached the end of the session
    Finished,
    /// The replay could not start; the connection closes afterwards
    Error { message: String },
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_actions() {
        assert_eq!(Command::parse(r#"{"action":"play"}"#).unwrap(), Command::Play);
        assert_eq!(Command::parse(r#"{"action":"pause"}"#).unwrap(), Command::Pause);
        assert_eq!(Command::parse(r#"{"action":"stop"}"#).unwrap(), Command::Stop);
        assert_eq!(
            Command::parse(r#"{"action":"seek","time_ms":1234.5}"#).unwrap(),
            Command::Seek { time_ms: 1234.5 }
        );
        assert_eq!(
            Command::parse(r#"{"action":"speed","speed":4}"#).unwrap(),
            Command::Speed { speed: 4.0 }
        );
    }

    #[test]
    fn missing_arguments_use_defaults() {
        assert_eq!(
            Command::parse(r#"{"action":"seek"}"#).unwrap(),
            Command::Seek { time_ms: 0.0 }
        );
        assert_eq!(
            Command::parse(r#"{"action":"speed"}"#).unwrap(),
            Command::Speed { speed: 1.0 }
        );
    }

    #[test]
    fn unknown_action_is_not_an_error() {
        assert_eq!(Command::parse(r#"{"action":"rewind"}"#).unwrap(), Command::Unknown);
        assert!(Command::parse("not json").is_err());
        assert!(Command::parse(r#"{"time_ms":5}"#).is_err());
    }

    #[test]
    fn messages_are_tagged_by_type() {
        let finished = ServerMessage::Finished.to_json().unwrap();
        assert_eq!(finished, r#"{"type":"finished"}"#);

        let error = ServerMessage::Error {
            message: "Session not found".into(),
        };
        let json: serde_json::Value = serde_json::from_str(&error.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "Session not found");

        let status = ServerMessage::Status {
            data: PlaybackStatus {
                is_playing: true,
                current_time_ms: 10.0,
                replay_speed: 1.0,
            },
        };
        let json: serde_json::Value = serde_json::from_str(&status.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["data"]["is_playing"], true);
    }
}

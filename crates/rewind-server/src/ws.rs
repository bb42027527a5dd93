//! WebSocket replay streaming.
//!
//! Connect to `/ws/replay/{session_id}`; the server answers with `init`,
//! then `status` for every command and `frame` messages while playing.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use rewind_engine::{Error, ReplayConnection, Result, ServerMessage};
use tracing::{debug, info};

use crate::node::ServerState;

/// A viewer's WebSocket as a replay connection.
pub struct WsConnection {
    socket: WebSocket,
}

impl WsConnection {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

impl ReplayConnection for WsConnection {
    async fn recv(&mut self) -> Option<Result<String>> {
        loop {
            match self.socket.recv().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Ping(data)) => {
                    if let Err(e) = self.socket.send(Message::Pong(data)).await {
                        return Some(Err(Error::Transport(e.to_string())));
                    }
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => debug!("Ignoring non-text WebSocket message"),
                Err(e) => return Some(Err(Error::Transport(e.to_string()))),
            }
        }
    }

    async fn send(&mut self, message: &ServerMessage) -> Result<()> {
        let json = message.to_json()?;
        self.socket
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.socket.send(Message::Close(None)).await {
            debug!("Close frame not delivered: {}", e);
        }
    }
}

/// WebSocket handler for replay streams
pub async fn ws_replay_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<u64>,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    info!(session_id, "Replay viewer connecting");
    ws.on_upgrade(move |socket| async move {
        state
            .scheduler
            .serve(session_id, WsConnection::new(socket))
            .await
    })
}

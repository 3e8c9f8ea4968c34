//! Live console over WebSocket.
//!
//! A viewer receives the backlog first, then every line published after it
//! joined, one JSON text frame per line.

use crate::{ApiResult, AppState, Caller, LogLineDto, Role};

use gsm_core::LogLine;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use log::{debug, warn};

/// GET /api/v1/server/logs/ws
pub async fn stream_logs(
    State(state): State<AppState>,
    caller: Caller,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    caller.require(Role::Viewer)?;

    Ok(ws.on_upgrade(move |socket| pump_logs(socket, state)))
}

async fn pump_logs(socket: WebSocket, state: AppState) {
    let (mut sender, mut incoming) = socket.split();
    let (backlog, mut receiver) = state.supervisor.broadcaster().subscribe();
    let mut shutdown = state.shutdown.subscribe_guard();

    debug!("Log viewer connected, sending {} backlog lines", backlog.len());
    for line in backlog {
        if send_line(&mut sender, line, 0).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            line = receiver.recv() => {
                let Some(line) = line else { break };
                let dropped = receiver.dropped_lines();
                if send_line(&mut sender, line, dropped).await.is_err() {
                    break;
                }
            }
            message = incoming.next() => match message {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Viewers have nothing to say; pings are answered by axum
                Some(Ok(_)) => {}
            },
            _ = shutdown.wait() => {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    }

    receiver.unsubscribe();
    debug!(
        "Log viewer disconnected after dropping {} lines",
        receiver.dropped_lines()
    );
}

async fn send_line<S>(sender: &mut S, line: LogLine, dropped_lines: u64) -> Result<(), ()>
where
    S: futures::Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let frame = match serde_json::to_string(&LogLineDto::new(line, dropped_lines)) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Failed to encode log line: {}", e);
            return Ok(());
        }
    };

    sender.send(Message::Text(frame.into())).await.map_err(|e| {
        debug!("Log viewer send failed: {}", e);
    })
}

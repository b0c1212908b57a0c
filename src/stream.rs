//! The Stream Gateway: one WebSocket subscriber per room, with a later
//! connection displacing an earlier one rather than being rejected.
//!
//! The room owns its frame channel (see `rooms::RoomEntry`); this module
//! just drives the WebSocket side of whichever subscription is currently
//! live for a room, closing the socket the moment a newer subscriber takes
//! over.

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use log::{info, warn};

use crate::model::Frame;

/// Drives one WebSocket connection for `room`: reads the room's batch,
/// starts the scheduler the first time any subscriber reaches this room, and
/// forwards every frame produced to the socket until the terminal `completed`
/// frame or until a later subscriber displaces this one. Reconnecting to an
/// already-running room reattaches to its output without starting a second run.
pub async fn serve(mut socket: WebSocket, room: String) {
    let Some(entry) = crate::rooms::take(&room).await else {
        let unavailable = Frame::GatewayError {
            error: "room not found or expired".to_string(),
        };
        if let Ok(text) = serde_json::to_string(&unavailable) {
            let _ = socket.send(Message::Text(text.into())).await;
        }
        return;
    };

    let mut subscription = entry.subscribe();

    if entry.mark_started() {
        let batch = (*entry.batch).clone();
        let worker_frame_tx = entry.frame_sender();
        let sink_tx = crate::sink::sender();
        tokio::spawn(async move {
            crate::scheduler::run_batch(batch, worker_frame_tx, sink_tx).await;
        });
    }

    let mut delivered = false;
    let mut displaced = false;
    loop {
        match subscription.recv().await {
            Some(frame) => {
                let is_terminal = matches!(frame, Frame::Completed { .. });
                match serde_json::to_string(&frame) {
                    Ok(text) => {
                        if socket.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!("room {room}: failed to encode frame: {err}"),
                }
                if is_terminal {
                    delivered = true;
                    break;
                }
            }
            None => {
                displaced = true;
                break;
            }
        }
    }

    if displaced {
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: 4000,
                reason: "displaced by a newer subscriber".into(),
            })))
            .await;
    }
    if delivered {
        crate::rooms::remove(&room).await;
    }
    info!("room {room}: stream closed");
}

//! The Host Worker: owns one row's lifecycle — connect (direct or via a jump
//! host), then run every command in the row's command list, each retried and
//! reconnected independently by the Command Runner.
//!
//! Connect-phase retries are capped at three attempts with the same
//! exponential backoff as command-phase retries; a row that never connects
//! emits a single `RowError` frame and never reaches the runner.

use std::sync::Arc;

use futures::future::BoxFuture;
use log::warn;
use tokio::sync::{Semaphore, mpsc};

use crate::error::ConnectError;
use crate::model::{Frame, Row};
use crate::pool::{self, security::ConnectionSecurityOptions};
use crate::pool::session::SshSession;
use crate::runner::{self, ReconnectFn, jittered_backoff};
use crate::sink::SinkEvent;

const CONNECT_MAX_ATTEMPTS: u32 = 3;
/// How many of a row's commands may run concurrently over the same
/// multiplexed session.
const HOST_CONCURRENCY: usize = 5;

/// Connects to a row's host, retrying with exponential backoff. Tunnels
/// through `jump_session` when present instead of connecting directly.
async fn connect_with_retry(
    row: &Row,
    security: &ConnectionSecurityOptions,
    jump_session: Option<Arc<SshSession>>,
) -> Result<Arc<SshSession>, ConnectError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let result = match &jump_session {
            Some(jump) => pool::acquire_via_jump(row, jump.clone(), security).await,
            None => pool::acquire_direct(row, security).await,
        };

        match result {
            Ok(session) => return Ok(session),
            Err(err) if attempt >= CONNECT_MAX_ATTEMPTS => return Err(err),
            Err(err) => {
                let backoff = jittered_backoff(attempt);
                warn!(
                    "row {}: connect attempt {attempt}/{CONNECT_MAX_ATTEMPTS} failed: {err}; retrying in {backoff:?}",
                    row.row_id
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

/// Runs one row to completion: connects, fans its commands out across a
/// bounded set of concurrent exec channels, and pushes every frame produced
/// onto `frame_tx` (results also go to `sink_tx` for persistence).
pub async fn run_row(
    row: Row,
    security: ConnectionSecurityOptions,
    frame_tx: mpsc::Sender<Frame>,
    sink_tx: mpsc::Sender<SinkEvent>,
) {
    let jump_session = if row.uses_jump_server() {
        let jump_cfg = row
            .jump_server
            .clone()
            .expect("uses_jump_server implies jump_server is Some");
        match pool::acquire_jump(&jump_cfg, &security).await {
            Ok(session) => Some(session),
            Err(err) => {
                let _ = frame_tx
                    .send(Frame::RowError {
                        row_id: row.row_id.clone(),
                        error: format!("jump host connect failed: {err}"),
                    })
                    .await;
                return;
            }
        }
    } else {
        None
    };

    let session = match connect_with_retry(&row, &security, jump_session.clone()).await {
        Ok(session) => session,
        Err(err) => {
            let _ = frame_tx
                .send(Frame::RowError {
                    row_id: row.row_id.clone(),
                    error: err.to_string(),
                })
                .await;
            return;
        }
    };

    let semaphore = Arc::new(Semaphore::new(HOST_CONCURRENCY));
    let row = Arc::new(row);
    let mut handles = Vec::with_capacity(row.commands.len());

    for command in row.commands.clone() {
        let semaphore = semaphore.clone();
        let row = row.clone();
        let session = session.clone();
        let frame_tx = frame_tx.clone();
        let sink_tx = sink_tx.clone();
        let security = security.clone();
        let jump_session = jump_session.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("host semaphore is never closed");

            let reconnect: Box<ReconnectFn<'_>> = Box::new(move || -> BoxFuture<'_, _> {
                let row = row.clone();
                let security = security.clone();
                let jump_session = jump_session.clone();
                Box::pin(async move { connect_with_retry(&row, &security, jump_session).await })
            });

            let outcome = runner::run_command(&row, &command, session, &reconnect).await;
            let _ = frame_tx.send(outcome.frame).await;
            if let Some(persisted) = outcome.persisted {
                let _ = sink_tx.send(SinkEvent::Result(persisted)).await;
            }
        }));
    }

    for handle in handles {
        let _ = handle.await;
    }

    let _ = sink_tx.send(SinkEvent::EndOfRow).await;
}

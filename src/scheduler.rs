//! The Batch Scheduler: fans a batch's rows out to the Host Worker under a
//! batch-wide concurrency cap, then emits the terminal `completed` frame
//! exactly once the rows have all finished (successfully or not).

use std::sync::Arc;

use log::error;
use tokio::sync::{Semaphore, mpsc};

use crate::model::{Batch, Frame};
use crate::pool::security::ConnectionSecurityOptions;
use crate::sink::SinkEvent;
use crate::worker;

const BATCH_CONCURRENCY: usize = 20;

/// Runs every row in `batch` to completion, pushing frames to `frame_tx` and
/// successful results to `sink_tx` as they land.
pub async fn run_batch(
    batch: Batch,
    frame_tx: mpsc::Sender<Frame>,
    sink_tx: mpsc::Sender<SinkEvent>,
) {
    let security = ConnectionSecurityOptions::default();
    let semaphore = Arc::new(Semaphore::new(BATCH_CONCURRENCY));

    let mut handles = Vec::with_capacity(batch.rows.len());
    for row in batch.rows {
        let semaphore = semaphore.clone();
        let security = security.clone();
        let frame_tx = frame_tx.clone();
        let sink_tx = sink_tx.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("batch semaphore is never closed");
            worker::run_row(row, security, frame_tx, sink_tx).await;
        }));
    }

    for handle in handles {
        if let Err(err) = handle.await {
            error!("batch {}: host worker task panicked: {err}", batch.room);
        }
    }

    if frame_tx.send(Frame::completed()).await.is_err() {
        error!(
            "batch {}: completion frame dropped, no subscriber was listening",
            batch.room
        );
    }
}

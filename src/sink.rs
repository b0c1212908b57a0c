//! The Result Sink: buffers command results and flushes them to SQLite in
//! batches rather than one `INSERT` per command, matching the original's
//! `results_batch` accumulator — flushed at 20 rows, or as soon as a host
//! row finishes, whichever comes first, so a small batch doesn't sit
//! unpersisted until the process shuts down.
//!
//! A batch that fails to insert is logged and dropped rather than retried —
//! retrying indefinitely would let a bad batch wedge the sink for every
//! batch behind it.

use log::{debug, error};
use once_cell::sync::OnceCell;
use sqlx::SqlitePool;
use tokio::sync::mpsc;

use crate::model::{PersistedResult, REDACTED_PASSWORD};

const CHANNEL_DEPTH: usize = 1024;
const FLUSH_SIZE: usize = 20;

/// One message on the sink's channel: either a result to buffer, or a
/// signal that a host row has finished and whatever is buffered should be
/// flushed now rather than waiting for the batch to fill up.
pub enum SinkEvent {
    Result(PersistedResult),
    EndOfRow,
}

static SENDER: OnceCell<mpsc::Sender<SinkEvent>> = OnceCell::new();

/// Starts the background batching task. Must run exactly once, at startup.
pub fn init(pool: SqlitePool) {
    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
    SENDER.set(tx).expect("sink::init called more than once");
    tokio::spawn(run(pool, rx));
}

/// Returns a sender events can be queued onto. Panics if `init` has not run.
pub fn sender() -> mpsc::Sender<SinkEvent> {
    SENDER
        .get()
        .expect("sink::init must run before sink::sender is called")
        .clone()
}

async fn run(pool: SqlitePool, mut rx: mpsc::Receiver<SinkEvent>) {
    let mut batch = Vec::with_capacity(FLUSH_SIZE);
    while let Some(event) = rx.recv().await {
        match event {
            SinkEvent::Result(result) => {
                batch.push(result);
                if batch.len() >= FLUSH_SIZE {
                    flush(&pool, &mut batch).await;
                }
            }
            SinkEvent::EndOfRow if !batch.is_empty() => flush(&pool, &mut batch).await,
            SinkEvent::EndOfRow => {}
        }
    }
    if !batch.is_empty() {
        flush(&pool, &mut batch).await;
    }
}

async fn flush(pool: &SqlitePool, batch: &mut Vec<PersistedResult>) {
    match insert_batch(pool, batch).await {
        Ok(()) => debug!("sink: persisted {} results", batch.len()),
        Err(err) => error!(
            "sink: batch insert failed, dropping {} results: {err}",
            batch.len()
        ),
    }
    batch.clear();
}

async fn insert_batch(pool: &SqlitePool, batch: &[PersistedResult]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for result in batch {
        sqlx::query(
            "INSERT INTO command_results (ip, user, password, port, command, output, exit_status, timestamp) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&result.ip)
        .bind(&result.user)
        .bind(REDACTED_PASSWORD)
        .bind(result.port)
        .bind(&result.command)
        .bind(&result.output)
        .bind(result.exit_status)
        .bind(result.timestamp)
        .execute(&mut *tx)
        .await?;
    }
    // An error anywhere above drops `tx` without a commit, which sqlx rolls
    // back automatically; the whole batch is dropped together by `flush`.
    tx.commit().await
}

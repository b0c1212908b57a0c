//! The Room Registry: files a freshly submitted batch under a room token
//! that any number of subscribers may read, dropping anything nobody claims
//! after an hour.
//!
//! `take` is a non-destructive read: reconnecting to the same room (the
//! earlier subscriber having been displaced, or the client simply retrying)
//! finds the same batch rather than an empty room. What *is* one-time is
//! execution — [`RoomEntry::mark_started`] lets the Stream Gateway spawn the
//! scheduler for a room exactly once no matter how many times it's reopened.
//!
//! Each room owns a single, permanent frame channel (not one per
//! subscriber): the scheduler and workers always push onto the same sender
//! for the lifetime of the room, and whichever subscriber currently holds
//! the receiver end is tracked by a generation counter so a later subscriber
//! displaces an earlier one instead of the two ending up on disconnected
//! channels.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::warn;
use moka::future::Cache;
use once_cell::sync::Lazy;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::BatchValidationError;
use crate::model::{Batch, Frame, Row};

const ROOM_TTL: Duration = Duration::from_secs(60 * 60);
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);
const FRAME_QUEUE_DEPTH: usize = 256;

/// A filed batch, its permanent frame channel, and the one-time "has the
/// scheduler started" latch.
pub struct RoomEntry {
    pub batch: Arc<Batch>,
    started: AtomicBool,
    frame_tx: mpsc::Sender<Frame>,
    frame_rx: Mutex<mpsc::Receiver<Frame>>,
    generation: watch::Sender<u64>,
}

impl RoomEntry {
    fn new(batch: Arc<Batch>) -> Self {
        let (frame_tx, frame_rx) = mpsc::channel(FRAME_QUEUE_DEPTH);
        let (generation, _) = watch::channel(0u64);
        Self {
            batch,
            started: AtomicBool::new(false),
            frame_tx,
            frame_rx: Mutex::new(frame_rx),
            generation,
        }
    }

    /// Marks this room as started, returning `true` only to the caller that
    /// made the transition — every later caller (a reconnecting subscriber)
    /// gets `false` and must not spawn a second scheduler run.
    pub fn mark_started(&self) -> bool {
        !self.started.swap(true, Ordering::AcqRel)
    }

    /// A sender onto the room's permanent frame channel, for the scheduler
    /// and workers to push frames from. Outlives any individual subscriber.
    pub fn frame_sender(&self) -> mpsc::Sender<Frame> {
        self.frame_tx.clone()
    }

    /// Registers the caller as the room's current subscriber, displacing
    /// whatever subscriber held it before. The displaced subscriber's next
    /// `recv` call returns `None`, ending its connection.
    pub fn subscribe(&self) -> RoomSubscription<'_> {
        let previous = *self.generation.borrow();
        let current = previous + 1;
        let _ = self.generation.send(current);
        if previous != 0 {
            warn!("room {}: new subscriber displaced an existing one", self.batch.room);
        }
        RoomSubscription {
            entry: self,
            generation: current,
            watch_rx: self.generation.subscribe(),
        }
    }
}

/// A live claim on a room's frame stream. Only one `RoomSubscription` is
/// ever actually reading at a time; an older one is displaced the moment a
/// newer one calls [`RoomEntry::subscribe`].
pub struct RoomSubscription<'a> {
    entry: &'a RoomEntry,
    generation: u64,
    watch_rx: watch::Receiver<u64>,
}

impl RoomSubscription<'_> {
    /// Waits for the next frame. Returns `None` if a later subscriber has
    /// displaced this one (the caller should close its connection), or if
    /// the room's channel has gone away entirely.
    pub async fn recv(&mut self) -> Option<Frame> {
        if *self.watch_rx.borrow() != self.generation {
            return None;
        }
        let mut guard = self.entry.frame_rx.lock().await;
        tokio::select! {
            frame = guard.recv() => frame,
            _ = self.watch_rx.changed() => None,
        }
    }
}

static ROOMS: Lazy<Cache<String, Arc<RoomEntry>>> =
    Lazy::new(|| Cache::builder().time_to_live(ROOM_TTL).max_capacity(10_000).build());

/// Validates a submitted batch and files it under a freshly minted room token.
///
/// A row with jump-server use enabled must carry both a host and a user for
/// it; an empty batch is rejected outright rather than filed as a no-op room.
pub async fn create(rows: Vec<Row>) -> Result<Arc<Batch>, BatchValidationError> {
    if rows.is_empty() {
        return Err(BatchValidationError::EmptyBatch);
    }
    for row in &rows {
        if let Some(jump) = &row.jump_server {
            if jump.enabled && (jump.ip.is_none() || jump.user.is_none()) {
                return Err(BatchValidationError::IncompleteJumpConfig);
            }
        }
    }

    let room = Uuid::new_v4().to_string();
    let request_id = Uuid::new_v4().to_string();
    let batch = Arc::new(Batch::new(room.clone(), request_id, rows));
    ROOMS.insert(room, Arc::new(RoomEntry::new(batch.clone()))).await;
    Ok(batch)
}

/// Reads the entry filed under `room`, if still present and not yet expired.
/// Non-destructive: a second `take` for the same room returns the same entry.
pub async fn take(room: &str) -> Option<Arc<RoomEntry>> {
    ROOMS.get(room).await
}

/// Forces expired entries out of the registry immediately rather than
/// waiting for them to be noticed lazily on the next access.
pub async fn sweep() {
    ROOMS.run_pending_tasks().await;
}

/// Drops a room once its batch has fully delivered, instead of waiting out
/// the rest of its TTL for something nobody will read again.
pub async fn remove(room: &str) {
    ROOMS.invalidate(room).await;
}

/// Spawns a detached background task that sweeps the registry every 5
/// minutes, mirroring the connection pool's reaper so abandoned rooms are
/// collected promptly instead of only on the next access to that key.
pub fn spawn_sweeper() -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            sweep().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;

    fn sample_row() -> Row {
        Row {
            row_id: "r1".into(),
            ip: "10.0.0.1".into(),
            user: "root".into(),
            password: "hunter2".into(),
            port: 22,
            commands: vec!["uptime".into()],
            jump_server: None,
        }
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let result = create(vec![]).await;
        assert!(matches!(result, Err(BatchValidationError::EmptyBatch)));
    }

    #[tokio::test]
    async fn incomplete_jump_config_is_rejected() {
        let mut row = sample_row();
        row.jump_server = Some(crate::model::JumpServerConfig {
            enabled: true,
            ip: None,
            user: None,
            port: 22,
        });
        let result = create(vec![row]).await;
        assert!(matches!(
            result,
            Err(BatchValidationError::IncompleteJumpConfig)
        ));
    }

    #[tokio::test]
    async fn a_room_can_be_taken_more_than_once() {
        let batch = create(vec![sample_row()]).await.expect("valid batch");
        let room = batch.room.clone();

        let first = take(&room).await.expect("room exists");
        let second = take(&room).await.expect("room still exists");
        assert_eq!(first.batch.room, second.batch.room);
    }

    #[tokio::test]
    async fn only_the_first_caller_to_mark_started_gets_true() {
        let batch = create(vec![sample_row()]).await.expect("valid batch");
        let entry = take(&batch.room).await.expect("room exists");

        assert!(entry.mark_started());
        assert!(!entry.mark_started());

        let entry_again = take(&batch.room).await.expect("room still exists");
        assert!(!entry_again.mark_started());
    }

    #[tokio::test]
    async fn taking_an_unknown_room_returns_none() {
        assert!(take("no-such-room").await.is_none());
    }

    #[tokio::test]
    async fn a_second_subscriber_displaces_the_first() {
        let batch = create(vec![sample_row()]).await.expect("valid batch");
        let entry = take(&batch.room).await.expect("room exists");

        let mut first = entry.subscribe();
        entry.frame_sender().send(Frame::completed()).await.expect("send");
        assert!(matches!(first.recv().await, Some(Frame::Completed { .. })));

        let mut second = entry.subscribe();
        // The first subscriber is now displaced: its next recv ends the
        // connection rather than competing with the second for frames.
        assert!(first.recv().await.is_none());

        entry.frame_sender().send(Frame::completed()).await.expect("send");
        assert!(matches!(second.recv().await, Some(Frame::Completed { .. })));
    }
}

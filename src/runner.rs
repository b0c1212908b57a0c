//! The Command Runner: drives one command on an already-connected session
//! through launch, stream and retry, independent of how many other commands
//! or hosts are in flight.
//!
//! State machine: launch the exec channel, stream until exit or the stream
//! timeout, and on any transport error back off exponentially and ask the
//! caller for a fresh session before retrying, up to three attempts total.
//! This mirrors the original's per-command retry loop inside `execute_command`.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use log::warn;
use rand::Rng;

use crate::error::ConnectError;
use crate::model::{Frame, PersistedResult, Row};
use crate::pool::session::SshSession;

const LAUNCH_TIMEOUT: Duration = Duration::from_secs(60);
const STREAM_TIMEOUT: Duration = Duration::from_secs(300);
const MAX_ATTEMPTS: u32 = 3;

/// Exponential backoff with a little jitter so a batch of hosts that all
/// fail at once don't all retry in lockstep.
pub(crate) fn jittered_backoff(attempt: u32) -> Duration {
    let jitter_ms = rand::thread_rng().gen_range(0..250);
    Duration::from_secs(2u64.pow(attempt)) + Duration::from_millis(jitter_ms)
}

/// Asks the caller (the Host Worker) to hand back a live session, reconnecting
/// if the cached one turned out to be dead.
pub type ReconnectFn<'a> = dyn Fn() -> BoxFuture<'a, Result<Arc<SshSession>, ConnectError>> + Send + Sync + 'a;

/// What running one command produced: a frame to push to the stream gateway
/// and, on success, a row ready for the Result Sink.
pub struct CommandOutcome {
    pub frame: Frame,
    pub persisted: Option<PersistedResult>,
}

/// Runs `command` against `session`, retrying through `reconnect` on failure.
pub async fn run_command(
    row: &Row,
    command: &str,
    mut session: Arc<SshSession>,
    reconnect: &ReconnectFn<'_>,
) -> CommandOutcome {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match session.exec(command, LAUNCH_TIMEOUT, STREAM_TIMEOUT).await {
            Ok(outcome) => {
                let persisted = PersistedResult {
                    ip: row.ip.clone(),
                    user: row.user.clone(),
                    port: row.port,
                    command: command.to_string(),
                    output: outcome.output.clone(),
                    exit_status: outcome.exit_status,
                    timestamp: chrono::Utc::now(),
                };
                return CommandOutcome {
                    frame: Frame::CommandSuccess {
                        row_id: row.row_id.clone(),
                        command: command.to_string(),
                        output: outcome.output,
                        exit_status: outcome.exit_status,
                    },
                    persisted: Some(persisted),
                };
            }
            Err(err) => {
                if attempt >= MAX_ATTEMPTS {
                    warn!(
                        "row {}: command '{command}' failed after {attempt} attempts: {err}",
                        row.row_id
                    );
                    return CommandOutcome {
                        frame: Frame::CommandError {
                            row_id: row.row_id.clone(),
                            command: command.to_string(),
                            error: err.to_string(),
                        },
                        persisted: None,
                    };
                }

                let backoff = jittered_backoff(attempt);
                warn!(
                    "row {}: command '{command}' failed (attempt {attempt}/{MAX_ATTEMPTS}): {err}; retrying in {backoff:?}",
                    row.row_id
                );
                tokio::time::sleep(backoff).await;

                match reconnect().await {
                    Ok(fresh) => session = fresh,
                    Err(reconnect_err) => {
                        return CommandOutcome {
                            frame: Frame::CommandError {
                                row_id: row.row_id.clone(),
                                command: command.to_string(),
                                error: reconnect_err.to_string(),
                            },
                            persisted: None,
                        };
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially_with_bounded_jitter() {
        for attempt in 1..MAX_ATTEMPTS {
            let base = Duration::from_secs(2u64.pow(attempt));
            let delay = jittered_backoff(attempt);
            assert!(delay >= base);
            assert!(delay < base + Duration::from_millis(250));
        }
    }
}

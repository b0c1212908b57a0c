//! The connection pool: a cache of live SSH sessions keyed by host/port/user
//! (see [`key`]), shared across every row in every batch so repeated targets
//! reuse one session instead of reconnecting per command.
//!
//! Reuse is gated on a liveness probe (REDESIGN unchanged from the original:
//! a cheap `echo` sentinel) run before a cached session is handed back. A
//! background reaper ([`reaper::spawn_reaper`]) independently evicts idle
//! entries and re-probes stale-but-active ones; see that module for why the
//! two checks must not be chained.

pub mod key;
mod reaper;
pub mod security;
pub mod session;

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::error::ConnectError;
use crate::model::{JumpServerConfig, Row};
use security::ConnectionSecurityOptions;
use session::SshSession;

pub use reaper::spawn_reaper;

const LIVENESS_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const IDLE_EVICT_AFTER: Duration = Duration::from_secs(5 * 60);
pub(crate) const HEALTH_RECHECK_AFTER: Duration = Duration::from_secs(30 * 60);

/// A pooled connection plus the bookkeeping the reaper needs to decide
/// whether it is idle or due for a health re-check.
pub struct PoolEntry {
    pub session: Arc<SshSession>,
    /// Hash of the credential the session was established with, so a row
    /// whose password changed doesn't silently reuse a session authenticated
    /// under the old one. `None` for key-authenticated jump sessions, which
    /// have no per-request secret to compare.
    credential_hash: Option<[u8; 32]>,
    last_used: Mutex<Instant>,
    last_health_check: Mutex<Instant>,
}

/// Hashes a credential so the pool can detect "same key, different secret"
/// without holding plaintext passwords any longer than it has to.
fn hash_credential(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

impl PoolEntry {
    fn fresh(session: Arc<SshSession>, credential_hash: Option<[u8; 32]>) -> Arc<Self> {
        let now = Instant::now();
        Arc::new(Self {
            session,
            credential_hash,
            last_used: Mutex::new(now),
            last_health_check: Mutex::new(now),
        })
    }

    async fn touch(&self) {
        *self.last_used.lock().await = Instant::now();
    }

    pub(crate) async fn idle_for(&self) -> Duration {
        self.last_used.lock().await.elapsed()
    }

    pub(crate) async fn since_last_health_check(&self) -> Duration {
        self.last_health_check.lock().await.elapsed()
    }

    pub(crate) async fn mark_health_checked(&self) {
        *self.last_health_check.lock().await = Instant::now();
    }
}

static POOL: Lazy<Cache<String, Arc<PoolEntry>>> =
    Lazy::new(|| Cache::builder().max_capacity(10_000).build());

pub(crate) fn cache() -> &'static Cache<String, Arc<PoolEntry>> {
    &POOL
}

/// Runs the original's `echo connection_test` sentinel against a session and
/// reports whether it answered sensibly within a short timeout.
pub(crate) async fn is_alive(session: &SshSession) -> bool {
    if !session.is_connected() {
        return false;
    }
    match session
        .exec("echo connection_test", LIVENESS_TIMEOUT, LIVENESS_TIMEOUT)
        .await
    {
        Ok(outcome) => !outcome.timed_out && outcome.output.contains("connection_test"),
        Err(_) => false,
    }
}

async fn get_or_connect<F, Fut>(
    key: String,
    credential_hash: Option<[u8; 32]>,
    connect: F,
) -> Result<Arc<SshSession>, ConnectError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<SshSession, ConnectError>>,
{
    if let Some(entry) = POOL.get(&key).await {
        let credentials_match = match (&credential_hash, &entry.credential_hash) {
            (Some(wanted), Some(cached)) => wanted == cached,
            _ => true,
        };
        if credentials_match && is_alive(&entry.session).await {
            entry.touch().await;
            return Ok(entry.session.clone());
        }
        if !credentials_match {
            info!("evicting connection for {key}: credentials changed");
        } else {
            info!("evicting dead connection for {key}");
        }
        POOL.invalidate(&key).await;
    }

    let entry = POOL
        .entry(key)
        .or_try_insert_with(async {
            let session = connect().await?;
            Ok::<_, ConnectError>(PoolEntry::fresh(Arc::new(session), credential_hash))
        })
        .await
        .map_err(|shared: Arc<ConnectError>| match Arc::try_unwrap(shared) {
            Ok(err) => err,
            Err(shared) => ConnectError::Internal(shared.to_string()),
        })?;

    Ok(entry.into_value().session.clone())
}

/// Acquires (or reuses) a direct, password-authenticated session to a row's host.
pub async fn acquire_direct(
    row: &Row,
    security: &ConnectionSecurityOptions,
) -> Result<Arc<SshSession>, ConnectError> {
    let cache_key = key::direct_key(&row.ip, row.port, &row.user);
    let credential_hash = Some(hash_credential(&row.password));
    let (ip, port, user, password, security) = (
        row.ip.clone(),
        row.port,
        row.user.clone(),
        row.password.clone(),
        security.clone(),
    );
    get_or_connect(cache_key, credential_hash, || async move {
        SshSession::connect_direct(&ip, port, &user, &password, &security).await
    })
    .await
}

/// Acquires (or reuses) a key-authenticated session to a jump host itself.
pub async fn acquire_jump(
    jump: &JumpServerConfig,
    security: &ConnectionSecurityOptions,
) -> Result<Arc<SshSession>, ConnectError> {
    let host = jump
        .ip
        .clone()
        .ok_or_else(|| ConnectError::Internal("jump host missing ip".to_string()))?;
    let user = jump
        .user
        .clone()
        .ok_or_else(|| ConnectError::Internal("jump host missing user".to_string()))?;
    let port = jump.port;
    let cache_key = key::jump_key(&host, port, &user);
    let security = security.clone();
    get_or_connect(cache_key, None, || async move {
        SshSession::connect_jump(&host, port, &user, &security).await
    })
    .await
}

/// Acquires (or reuses) a session tunneled through `jump_session` to a row's host.
pub async fn acquire_via_jump(
    row: &Row,
    jump_session: Arc<SshSession>,
    security: &ConnectionSecurityOptions,
) -> Result<Arc<SshSession>, ConnectError> {
    let cache_key = key::via_jump_key(&row.ip, row.port, &row.user);
    let credential_hash = Some(hash_credential(&row.password));
    let (ip, port, user, password, security) = (
        row.ip.clone(),
        row.port,
        row.user.clone(),
        row.password.clone(),
        security.clone(),
    );
    get_or_connect(cache_key, credential_hash, || async move {
        SshSession::connect_via_jump(&jump_session, &ip, port, &user, &password, &security).await
    })
    .await
}

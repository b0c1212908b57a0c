//! Wire types shared by the HTTP/WebSocket surface and the execution core.
//!
//! These mirror the JSON shapes in the specification's data model: a `Row`
//! is one target host plus its commands, a `Batch` is the set of rows
//! accepted at submission time, and the `Frame` variants are exactly what
//! gets pushed down the stream.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Optional bastion/jump host configuration attached to a [`Row`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct JumpServerConfig {
    #[serde(default)]
    pub enabled: bool,
    pub ip: Option<String>,
    pub user: Option<String>,
    #[serde(default = "default_jump_port")]
    pub port: u16,
}

fn default_jump_port() -> u16 {
    22
}

/// One target host plus the commands to run on it.
///
/// `row_id` is client-chosen and opaque; it is echoed back on every frame
/// produced for this row so the client can correlate results.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Row {
    #[serde(rename = "rowId")]
    pub row_id: String,
    pub ip: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub commands: Vec<String>,
    #[serde(rename = "jump", default)]
    pub jump_server: Option<JumpServerConfig>,
}

impl Row {
    /// Whether this row should be connected to via a jump host.
    pub fn uses_jump_server(&self) -> bool {
        matches!(&self.jump_server, Some(j) if j.enabled)
    }
}

/// A batch of rows accepted at `POST /api/v1/execute`, stored under a room
/// token until a subscriber claims it.
#[derive(Debug, Clone)]
pub struct Batch {
    pub request_id: String,
    pub room: String,
    pub rows: Vec<Row>,
    pub created_at: DateTime<Utc>,
    pub server_count: usize,
    pub command_count: usize,
}

impl Batch {
    pub fn new(room: String, request_id: String, rows: Vec<Row>) -> Self {
        let server_count = rows.len();
        let command_count = rows.iter().map(|r| r.commands.len()).sum();
        Self {
            request_id,
            room,
            rows,
            created_at: Utc::now(),
            server_count,
            command_count,
        }
    }
}

/// One outbound frame pushed down the WebSocket stream for a room.
///
/// Serializes to exactly the JSON shapes named in the specification; the
/// enum itself is untagged so each variant controls its own field set.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Frame {
    /// A command ran to completion.
    CommandSuccess {
        #[serde(rename = "rowId")]
        row_id: String,
        command: String,
        output: String,
        #[serde(rename = "exitStatus")]
        exit_status: Option<i64>,
    },
    /// A command failed after exhausting its retries.
    CommandError {
        #[serde(rename = "rowId")]
        row_id: String,
        command: String,
        error: String,
    },
    /// The host-level connect phase failed; no command frames follow for this row.
    RowError {
        #[serde(rename = "rowId")]
        row_id: String,
        error: String,
    },
    /// Emitted exactly once per batch once the scheduler has joined.
    Completed { status: &'static str },
    /// An unhandled error at the gateway level.
    GatewayError { error: String },
}

impl Frame {
    pub fn completed() -> Self {
        Frame::Completed { status: "completed" }
    }
}

/// A single command outcome, ready to be appended to the Result Sink.
/// The password field is always the literal placeholder; plaintext
/// credentials never reach this type.
#[derive(Debug, Clone)]
pub struct PersistedResult {
    pub ip: String,
    pub user: String,
    pub port: u16,
    pub command: String,
    pub output: String,
    pub exit_status: Option<i64>,
    pub timestamp: DateTime<Utc>,
}

/// Placeholder written to the `password` column of every persisted result.
/// Plaintext credentials are never written to the sink.
pub const REDACTED_PASSWORD: &str = "*****";

/// Body of `POST /api/v1/configs`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ConfigUpsert {
    pub name: String,
    pub data: serde_json::Value,
}

/// One row of `GET /api/v1/configs`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub id: i64,
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

/// Full payload of `GET /api/v1/configs/{id}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDetail {
    pub id: i64,
    pub name: String,
    pub data: serde_json::Value,
}

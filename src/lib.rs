//! # sshfleet - concurrent multi-target SSH command executor
//!
//! `sshfleet` runs the same or different shell commands across many hosts at
//! once, tunneling through jump hosts where needed, streaming results back
//! over a WebSocket as they land, and persisting a redacted record of every
//! command run.
//!
//! ## Main components
//!
//! - [`pool`] - the connection pool: cached, reused SSH sessions with a
//!   background reaper for idle and unhealthy entries
//! - [`worker`] - the Host Worker: one row's connect-and-run lifecycle
//! - [`runner`] - the Command Runner: one command's launch/stream/retry loop
//! - [`scheduler`] - the Batch Scheduler: fans a batch's rows out under a
//!   batch-wide concurrency cap
//! - [`rooms`] - the Room Registry: files a batch under a one-time room token
//! - [`stream`] - the Stream Gateway: the WebSocket push channel per room
//! - [`sink`] - the Result Sink: batched, redacted persistence to SQLite
//! - [`store`] - schema setup and the Config Store CRUD surface
//! - [`http`] - the HTTP/WebSocket router
//! - [`error`] - the failure taxonomy shared across the above
//! - [`config`] - SSH algorithm preference tables
//! - [`model`] - wire types shared by the HTTP surface and the execution core

pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod pool;
pub mod rooms;
pub mod runner;
pub mod scheduler;
pub mod sink;
pub mod store;
pub mod stream;
pub mod worker;

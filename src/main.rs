//! Binary entry point: loads configuration, opens the SQLite store, starts
//! the Result Sink, the connection pool reaper and the room sweeper, and
//! serves the HTTP/WS API.

use log::info;
use sshfleet::{http, pool, rooms, sink, store};

const DEFAULT_DATABASE_URL: &str = "sqlite://sshfleet.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let debug_mode = std::env::var("DEBUG_MODE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("t"))
        .unwrap_or(false);
    let default_filter = if debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let pool = store::connect(&database_url).await?;
    sink::init(pool.clone());
    pool::spawn_reaper();
    rooms::spawn_sweeper();

    let app = http::router(pool);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("sshfleet listening on {bind_addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

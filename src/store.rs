//! SQLite schema setup and the Config Store: named, freeform JSON blobs with
//! create/replace, list, get-by-id and delete operations.
//!
//! `migrate` also carries forward the original's startup check for an older
//! `command_results` table missing the `exit_status` column, adding it in
//! place instead of requiring a fresh database.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row as _, SqlitePool};

use crate::error::ConfigStoreError;
use crate::model::{ConfigDetail, ConfigSummary, ConfigUpsert};

/// Opens the SQLite pool at `database_url`, creating both the database file
/// and the schema if they don't already exist — sqlx otherwise refuses to
/// connect to a file that isn't there yet, unlike the original's
/// SQLAlchemy `create_all` against a fresh deployment.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS command_results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ip TEXT NOT NULL,
            user TEXT NOT NULL,
            password TEXT NOT NULL,
            port INTEGER NOT NULL,
            command TEXT NOT NULL,
            output TEXT NOT NULL,
            timestamp TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    let has_exit_status = sqlx::query(
        "SELECT 1 FROM pragma_table_info('command_results') WHERE name = 'exit_status'",
    )
    .fetch_optional(pool)
    .await?
    .is_some();

    if !has_exit_status {
        info!("store: migrating command_results, adding exit_status column");
        sqlx::query("ALTER TABLE command_results ADD COLUMN exit_status INTEGER")
            .execute(pool)
            .await?;
    }

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS configs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Creates a named config, or replaces the data of an existing one sharing the name.
/// `created_at` is set once and left untouched by later replacements.
pub async fn upsert_config(
    pool: &SqlitePool,
    upsert: ConfigUpsert,
) -> Result<ConfigSummary, ConfigStoreError> {
    let data = serde_json::to_string(&upsert.data)?;
    let now = Utc::now();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO configs (name, data, created_at, updated_at) VALUES (?, ?, ?, ?)
         ON CONFLICT(name) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
         RETURNING id",
    )
    .bind(&upsert.name)
    .bind(&data)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    let updated_at = now;

    Ok(ConfigSummary {
        id,
        name: upsert.name,
        updated_at,
    })
}

pub async fn list_configs(pool: &SqlitePool) -> Result<Vec<ConfigSummary>, ConfigStoreError> {
    let rows = sqlx::query("SELECT id, name, updated_at FROM configs ORDER BY updated_at DESC")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row: SqliteRow| ConfigSummary {
            id: row.get("id"),
            name: row.get("name"),
            updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        })
        .collect())
}

pub async fn get_config(pool: &SqlitePool, id: i64) -> Result<ConfigDetail, ConfigStoreError> {
    let row = sqlx::query("SELECT name, data FROM configs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let row = row.ok_or(ConfigStoreError::NotFound)?;
    let name: String = row.get("name");
    let data_text: String = row.get("data");
    Ok(ConfigDetail {
        id,
        name,
        data: serde_json::from_str(&data_text)?,
    })
}

pub async fn delete_config(pool: &SqlitePool, id: i64) -> Result<(), ConfigStoreError> {
    let result = sqlx::query("DELETE FROM configs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ConfigStoreError::NotFound);
    }
    Ok(())
}

//! Integration tests for schema setup and the Config Store, run against a
//! real file-backed SQLite database rather than mocks, so the startup
//! migration path actually exercises `ALTER TABLE`.

use sshfleet::model::ConfigUpsert;
use sshfleet::store;

async fn temp_db() -> (tempfile::TempDir, sqlx::SqlitePool) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("sshfleet-test.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let pool = store::connect(&url).await.expect("connect and migrate");
    (dir, pool)
}

#[tokio::test]
async fn upsert_then_list_then_get_round_trips() {
    let (_dir, pool) = temp_db().await;

    let created = store::upsert_config(
        &pool,
        ConfigUpsert {
            name: "site-a".to_string(),
            data: serde_json::json!({ "retries": 3 }),
        },
    )
    .await
    .expect("create config");

    let listed = store::list_configs(&pool).await.expect("list configs");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
    assert_eq!(listed[0].name, "site-a");

    let fetched = store::get_config(&pool, created.id).await.expect("get config");
    assert_eq!(fetched.name, "site-a");
    assert_eq!(fetched.data, serde_json::json!({ "retries": 3 }));
}

#[tokio::test]
async fn upserting_the_same_name_replaces_its_data() {
    let (_dir, pool) = temp_db().await;

    let first = store::upsert_config(
        &pool,
        ConfigUpsert {
            name: "site-b".to_string(),
            data: serde_json::json!({ "retries": 1 }),
        },
    )
    .await
    .expect("create config");

    let second = store::upsert_config(
        &pool,
        ConfigUpsert {
            name: "site-b".to_string(),
            data: serde_json::json!({ "retries": 5 }),
        },
    )
    .await
    .expect("replace config");

    assert_eq!(first.id, second.id);
    let fetched = store::get_config(&pool, first.id).await.expect("get config");
    assert_eq!(fetched.data, serde_json::json!({ "retries": 5 }));

    let listed = store::list_configs(&pool).await.expect("list configs");
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn deleting_an_unknown_config_id_is_not_found() {
    let (_dir, pool) = temp_db().await;
    let result = store::delete_config(&pool, 999).await;
    assert!(matches!(result, Err(sshfleet::error::ConfigStoreError::NotFound)));
}

#[tokio::test]
async fn getting_an_unknown_config_id_is_not_found() {
    let (_dir, pool) = temp_db().await;
    let result = store::get_config(&pool, 999).await;
    assert!(matches!(result, Err(sshfleet::error::ConfigStoreError::NotFound)));
}

#[tokio::test]
async fn migrate_adds_exit_status_to_a_pre_existing_table() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("legacy.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());

    let raw_pool = sqlx::SqlitePool::connect(&url).await.expect("connect");
    sqlx::query(
        "CREATE TABLE command_results (
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
    .execute(&raw_pool)
    .await
    .expect("create legacy table");
    raw_pool.close().await;

    // connect() runs the same migration the binary runs at startup.
    let pool = store::connect(&url).await.expect("connect and migrate");
    let has_column: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM pragma_table_info('command_results') WHERE name = 'exit_status'")
            .fetch_optional(&pool)
            .await
            .expect("inspect schema");
    assert!(has_column.is_some());
}

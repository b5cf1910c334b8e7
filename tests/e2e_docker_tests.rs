// Copyright 2025 coScene
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// End-to-end tests against live stores
//
// Expects the stores on their default local ports (override with
// CASSANDRA_CONTACT_POINT, MONGO_URI, POSTGRES_URL, MYSQL_URL, REDIS_URL).
// A test whose store is unreachable prints a note and returns. Each test
// owns one backend's dataset, so the stages of a backend run in sequence.

use sensor_storage::config::{apply_env_overrides, AppConfig};
use sensor_storage::{
    run_workflow, Backend, BackendFactory, BackendKind, SensorRecord, SensorStore, StoreError,
};

fn live_config() -> AppConfig {
    let mut config = AppConfig::default();
    apply_env_overrides(&mut config);
    config
}

/// Connect, or return None when the store is not running
async fn connect_or_skip(kind: BackendKind) -> Option<Backend> {
    let mut store = BackendFactory::create(kind, &live_config().storage);

    match store.connect().await {
        Ok(()) => Some(store),
        Err(e) => {
            eprintln!("Skipping E2E test: {} not available ({})", kind, e);
            None
        }
    }
}

fn test_record(location: &str) -> SensorRecord {
    SensorRecord::new(1_700_000_000, location, "bmp280", "temperature", "C", 27.3)
}

async fn exercise_lifecycle(kind: BackendKind) {
    let Some(mut store) = connect_or_skip(kind).await else {
        return;
    };
    assert!(store.is_connected());

    // Start from an empty dataset
    store.delete_all().await.expect("initial delete_all failed");
    assert!(store.select_all().await.expect("select_all failed").is_empty());

    // Read-your-writes on the same connection
    let first = test_record("e2e-den");
    let second = test_record("e2e-attic");
    store.insert(first.clone()).await.expect("insert failed");
    store.insert(second.clone()).await.expect("insert failed");

    let records = store.select_all().await.expect("select_all failed");
    assert_eq!(records.len(), 2, "{}: {:?}", kind, records);
    assert!(records.contains(&first), "{}: missing {:?}", kind, first);
    assert!(records.contains(&second), "{}: missing {:?}", kind, second);

    // Appends, no upsert
    store.insert(first.clone()).await.expect("duplicate insert failed");
    assert_eq!(store.select_all().await.expect("select_all failed").len(), 3);

    store.delete_all().await.expect("delete_all failed");
    assert!(store.select_all().await.expect("select_all failed").is_empty());

    // A fully defaulted record (empty strings, zero value) is storable too
    let defaulted = SensorRecord::from_json_str("{}").expect("coercion failed");
    store.insert(defaulted.clone()).await.expect("insert of defaulted record failed");
    let records = store.select_all().await.expect("select_all failed");
    assert_eq!(records, vec![defaulted], "{}", kind);

    store.delete_all().await.expect("delete_all failed");
    store.close().await.expect("close failed");
    assert!(!store.is_connected());
}

async fn exercise_workflow(kind: BackendKind) {
    let Some(mut reachable) = connect_or_skip(kind).await else {
        return;
    };
    reachable.delete_all().await.expect("initial delete_all failed");
    reachable.close().await.ok();

    let mut store = BackendFactory::create(kind, &live_config().storage);
    let report = run_workflow(&mut store, SensorRecord::sample())
        .await
        .expect("workflow failed");

    assert_eq!(report.backend, kind.as_str());
    assert_eq!(report.records, vec![report.inserted.clone()]);
    assert!(report.csv.starts_with("location,measurement,recorded,sensor,units,value\nden,"));
    assert!(!store.is_connected());
}

/// A failing CREATE TABLE during connect is reported as a connection error
async fn exercise_provisioning_failure(kind: BackendKind) {
    let Some(mut reachable) = connect_or_skip(kind).await else {
        return;
    };
    reachable.close().await.ok();

    let mut config = live_config();
    config.storage.cassandra.table = "bad-name".to_string();
    config.storage.postgres.table = "bad-name".to_string();
    config.storage.mysql.table = "bad-name".to_string();

    let mut store = BackendFactory::create(kind, &config.storage);
    let err = store.connect().await.unwrap_err();
    assert!(
        matches!(err, StoreError::Connection { .. }),
        "{}: expected connection error, got {:?}",
        kind,
        err
    );
    assert!(!store.is_connected());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_e2e_columnar() {
    exercise_lifecycle(BackendKind::Columnar).await;
    exercise_workflow(BackendKind::Columnar).await;
    exercise_provisioning_failure(BackendKind::Columnar).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_e2e_document() {
    exercise_lifecycle(BackendKind::Document).await;
    exercise_workflow(BackendKind::Document).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_e2e_relational_a() {
    exercise_lifecycle(BackendKind::RelationalA).await;
    exercise_workflow(BackendKind::RelationalA).await;
    exercise_provisioning_failure(BackendKind::RelationalA).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_e2e_relational_b() {
    exercise_lifecycle(BackendKind::RelationalB).await;
    exercise_workflow(BackendKind::RelationalB).await;
    exercise_provisioning_failure(BackendKind::RelationalB).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_e2e_key_value() {
    exercise_lifecycle(BackendKind::KeyValue).await;
    exercise_workflow(BackendKind::KeyValue).await;
}

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

// Workflow orchestration against the in-memory store

mod common;

use common::{reading, MemoryStore};
use sensor_storage::workflow::{ingest, purge, report};
use sensor_storage::{run_all, run_all_concurrent, run_workflow, SensorStore, StoreError};

const CSV_HEADER: &str = "location,measurement,recorded,sensor,units,value";

#[tokio::test]
async fn test_workflow_runs_every_stage_in_order() {
    let mut store = MemoryStore::new("key-value");

    let report = run_workflow(&mut store, reading(24.5)).await.unwrap();

    assert_eq!(
        store.calls(),
        vec!["connect", "insert", "select_all", "delete_all", "close"]
    );
    assert_eq!(report.backend, "key-value");
    assert_eq!(report.inserted, reading(24.5));
    assert_eq!(report.records, vec![reading(24.5)]);
    assert_eq!(
        report.csv,
        format!("{}\nden,temperature,1700000000,bmp280,C,24.5", CSV_HEADER)
    );
    assert_eq!(store.len(), 0, "workflow should leave the dataset empty");
    assert!(!store.is_connected());
}

#[tokio::test]
async fn test_workflow_sees_existing_rows() {
    let mut store = MemoryStore::new("document");
    store.push_raw(&reading(22.4).to_json_string());

    let report = run_workflow(&mut store, reading(30.0)).await.unwrap();

    assert_eq!(report.records.len(), 2);
    assert!(report.records.contains(&reading(30.0)));
    assert_eq!(report.csv.lines().count(), 3);
}

#[tokio::test]
async fn test_workflow_skips_malformed_rows() {
    let mut store = MemoryStore::new("key-value");
    store.push_raw("not json at all");
    store.push_raw("[1, 2, 3]");

    let report = run_workflow(&mut store, reading(25.0)).await.unwrap();

    assert_eq!(report.records, vec![reading(25.0)]);
}

#[tokio::test]
async fn test_connect_failure_is_propagated_unchanged() {
    let mut store = MemoryStore::unreachable("columnar");

    let err = run_workflow(&mut store, reading(25.0)).await.unwrap_err();

    match err {
        StoreError::Connection { backend, .. } => assert_eq!(backend, "columnar"),
        other => panic!("Expected connection error, got {:?}", other),
    }
    assert_eq!(store.calls(), vec!["connect", "close"]);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_close_failure_does_not_fail_the_run() {
    let mut store = MemoryStore::failing_close("relational-a");

    let report = run_workflow(&mut store, reading(26.1)).await;

    assert!(report.is_ok(), "close failure should be non-fatal: {:?}", report.err());
    assert!(!store.is_connected(), "session must be released anyway");
}

#[tokio::test]
async fn test_operations_require_connect() {
    let mut store = MemoryStore::new("relational-b");

    let err = store.insert(reading(1.0)).await.unwrap_err();
    assert!(matches!(err, StoreError::NotConnected { .. }));

    // Closing a never-connected store is a no-op
    assert!(store.close().await.is_ok());
}

#[tokio::test]
async fn test_delete_then_select_is_empty() {
    let mut store = MemoryStore::new("key-value");
    store.connect().await.unwrap();
    store.insert(reading(1.0)).await.unwrap();
    store.insert(reading(2.0)).await.unwrap();

    store.delete_all().await.unwrap();

    assert!(store.select_all().await.unwrap().is_empty());
    store.close().await.unwrap();
}

#[tokio::test]
async fn test_run_all_isolates_failures() {
    let stores = vec![
        MemoryStore::unreachable("columnar"),
        MemoryStore::new("document"),
        MemoryStore::unreachable("relational-a"),
        MemoryStore::new("key-value"),
    ];
    let survivors = [stores[1].clone(), stores[3].clone()];

    let outcomes = run_all(stores).await;

    let backends: Vec<_> = outcomes.iter().map(|o| o.backend).collect();
    assert_eq!(backends, vec!["columnar", "document", "relational-a", "key-value"]);
    let successes: Vec<_> = outcomes.iter().map(|o| o.is_success()).collect();
    assert_eq!(successes, vec![false, true, false, true]);

    for store in &survivors {
        assert_eq!(
            store.calls(),
            vec!["connect", "insert", "select_all", "delete_all", "close"]
        );
    }
}

#[tokio::test]
async fn test_run_all_concurrent_keeps_order_and_isolation() {
    let stores = vec![
        MemoryStore::new("columnar"),
        MemoryStore::unreachable("document"),
        MemoryStore::new("relational-a"),
        MemoryStore::new("relational-b"),
        MemoryStore::new("key-value"),
    ];

    let outcomes = run_all_concurrent(stores).await;

    assert_eq!(outcomes.len(), 5);
    assert_eq!(outcomes[1].backend, "document");
    assert!(matches!(
        outcomes[1].result,
        Err(StoreError::Connection { .. })
    ));
    assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 4);

    for outcome in outcomes.iter().filter(|o| o.is_success()) {
        let report = outcome.result.as_ref().unwrap();
        assert_eq!(report.records.len(), 1);
        assert!(report.csv.starts_with(CSV_HEADER));
    }
}

#[tokio::test]
async fn test_single_stage_calls_close_after_each_stage() {
    let template = MemoryStore::new("key-value");

    ingest(&mut template.clone(), reading(21.0)).await.unwrap();
    ingest(&mut template.clone(), reading(22.0)).await.unwrap();
    let records = report(&mut template.clone()).await.unwrap();
    purge(&mut template.clone()).await.unwrap();

    assert_eq!(records, vec![reading(21.0), reading(22.0)]);
    assert_eq!(template.len(), 0);
    assert_eq!(
        template.calls(),
        vec![
            "connect", "insert", "close",
            "connect", "insert", "close",
            "connect", "select_all", "close",
            "connect", "delete_all", "close",
        ]
    );
}

#[tokio::test]
async fn test_single_stage_connect_failure_skips_the_stage() {
    let mut store = MemoryStore::unreachable("document");

    let err = ingest(&mut store, reading(21.0)).await.unwrap_err();

    assert!(matches!(err, StoreError::Connection { .. }));
    assert_eq!(store.calls(), vec!["connect"]);
}

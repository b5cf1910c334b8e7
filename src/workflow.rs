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

// Workflow orchestration over a storage adapter
//
// Two ways of driving an adapter:
// - `run_workflow`: the full connect -> insert -> select -> export ->
//   delete -> close pipeline, used by the standalone runner
// - `ingest` / `report` / `purge`: one stage per call with its own
//   connect/close, used by request handlers

use crate::error::StoreError;
use crate::export::records_to_csv;
use crate::record::SensorRecord;
use crate::storage::SensorStore;
use futures::future::join_all;
use std::fmt;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Connect,
    Insert,
    SelectAll,
    Export,
    DeleteAll,
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStage::Connect => "connect",
            WorkflowStage::Insert => "insert",
            WorkflowStage::SelectAll => "select_all",
            WorkflowStage::Export => "export",
            WorkflowStage::DeleteAll => "delete_all",
        };
        f.write_str(name)
    }
}

/// What one successful workflow run saw
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    pub backend: &'static str,
    pub inserted: SensorRecord,
    /// Backend contents right after the insert
    pub records: Vec<SensorRecord>,
    pub csv: String,
}

/// Result of one backend in a multi-backend run
#[derive(Debug)]
pub struct BackendOutcome {
    pub backend: &'static str,
    pub result: Result<WorkflowReport, StoreError>,
}

impl BackendOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run the full lifecycle against one adapter.
///
/// The first failing stage ends the run and its error is returned as is.
/// The adapter is closed on every path; a close failure is logged and does
/// not fail an otherwise successful run.
pub async fn run_workflow<S: SensorStore>(
    store: &mut S,
    record: SensorRecord,
) -> Result<WorkflowReport, StoreError> {
    let backend = store.backend_type();
    let result = match run_stages(store, record).await {
        Ok(report) => Ok(report),
        Err((stage, e)) => {
            error!("[{}] workflow failed during {}: {}", backend, stage, e);
            Err(e)
        }
    };

    finish(store, result).await
}

async fn run_stages<S: SensorStore>(
    store: &mut S,
    record: SensorRecord,
) -> Result<WorkflowReport, (WorkflowStage, StoreError)> {
    let backend = store.backend_type();

    store
        .connect()
        .await
        .map_err(|e| (WorkflowStage::Connect, e))?;
    info!("[{}] connected", backend);

    store
        .insert(record.clone())
        .await
        .map_err(|e| (WorkflowStage::Insert, e))?;
    info!("[{}] inserted sensor data", backend);

    let records = store
        .select_all()
        .await
        .map_err(|e| (WorkflowStage::SelectAll, e))?;
    info!("[{}] selected {} records", backend, records.len());

    let csv = records_to_csv(&records).map_err(|e| (WorkflowStage::Export, e))?;

    store
        .delete_all()
        .await
        .map_err(|e| (WorkflowStage::DeleteAll, e))?;
    info!("[{}] deleted all sensor data", backend);

    Ok(WorkflowReport {
        backend,
        inserted: record,
        records,
        csv,
    })
}

/// Run the workflow against every adapter in turn.
///
/// Failures are isolated: a backend that fails is logged and the run moves
/// on to the next one. Each run inserts a fresh synthetic sample.
pub async fn run_all<S, I>(stores: I) -> Vec<BackendOutcome>
where
    S: SensorStore,
    I: IntoIterator<Item = S>,
{
    let mut outcomes = Vec::new();

    for mut store in stores {
        outcomes.push(run_isolated(&mut store).await);
    }

    log_summary(&outcomes);
    outcomes
}

/// Like [`run_all`], but the workflows run concurrently. Each future owns
/// its adapter, so nothing is shared between them. Outcomes keep the input
/// order.
pub async fn run_all_concurrent<S, I>(stores: I) -> Vec<BackendOutcome>
where
    S: SensorStore,
    I: IntoIterator<Item = S>,
{
    let runs = stores.into_iter().map(|mut store| async move {
        run_isolated(&mut store).await
    });

    let outcomes = join_all(runs).await;
    log_summary(&outcomes);
    outcomes
}

async fn run_isolated<S: SensorStore>(store: &mut S) -> BackendOutcome {
    let backend = store.backend_type();
    info!("--- Running workflow for {} ---", backend);

    let result = run_workflow(store, SensorRecord::sample()).await;
    if let Err(e) = &result {
        error!("Error running workflow for {}: {}", backend, e);
    }

    BackendOutcome { backend, result }
}

fn log_summary(outcomes: &[BackendOutcome]) {
    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    info!(
        "All workflows complete: {}/{} succeeded",
        succeeded,
        outcomes.len()
    );
}

/// Connect, insert one record, close
pub async fn ingest<S: SensorStore>(store: &mut S, record: SensorRecord) -> Result<(), StoreError> {
    store.connect().await?;
    let result = store.insert(record).await;
    finish(store, result).await
}

/// Connect, read every record, close
pub async fn report<S: SensorStore>(store: &mut S) -> Result<Vec<SensorRecord>, StoreError> {
    store.connect().await?;
    let result = store.select_all().await;
    finish(store, result).await
}

/// Connect, delete every record, close
pub async fn purge<S: SensorStore>(store: &mut S) -> Result<(), StoreError> {
    store.connect().await?;
    let result = store.delete_all().await;
    finish(store, result).await
}

async fn finish<S: SensorStore, T>(
    store: &mut S,
    result: Result<T, StoreError>,
) -> Result<T, StoreError> {
    if let Err(e) = store.close().await {
        warn!("{}", e);
    }
    result
}

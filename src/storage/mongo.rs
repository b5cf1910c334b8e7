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

// Document backend: every record is one document in a collection

use super::backend::{collect_lenient, SensorStore};
use super::factory::BackendKind;
use crate::config::MongoConfig;
use crate::error::StoreError;
use crate::record::SensorRecord;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection};
use tracing::{debug, info};

const BACKEND: &str = BackendKind::Document.as_str();

/// MongoDB adapter
///
/// Documents are inserted without an application id; the server-assigned
/// `_id` is ignored on read.
pub struct MongoStore {
    config: MongoConfig,
    client: Option<Client>,
}

impl MongoStore {
    pub fn new(config: MongoConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    fn collection(&self) -> Result<Collection<Document>, StoreError> {
        let client = self
            .client
            .as_ref()
            .ok_or(StoreError::NotConnected { backend: BACKEND })?;

        Ok(client
            .database(&self.config.database)
            .collection(&self.config.collection))
    }
}

fn record_to_document(record: SensorRecord) -> Document {
    doc! {
        "recorded": record.recorded_at,
        "location": record.location,
        "sensor": record.sensor_kind,
        "measurement": record.measurement,
        "units": record.units,
        "value": record.value,
    }
}

/// Stored documents go through the same JSON coercion as ingestion, so
/// Int32/Int64/Double numbers and missing fields behave identically.
fn document_to_record(document: Document) -> Result<SensorRecord, StoreError> {
    let value = Bson::Document(document).into_relaxed_extjson();
    SensorRecord::from_json_value(&value)
}

#[async_trait]
impl SensorStore for MongoStore {
    async fn connect(&mut self) -> Result<(), StoreError> {
        let client = Client::with_uri_str(&self.config.uri)
            .await
            .map_err(|e| StoreError::connection(BACKEND, e))?;

        // Client construction is lazy; ping to surface unreachable hosts and bad credentials now.
        client
            .database(&self.config.database)
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| StoreError::connection(BACKEND, e))?;

        info!(
            "[{}] connected to {}/{}",
            BACKEND, self.config.database, self.config.collection
        );
        self.client = Some(client);
        Ok(())
    }

    async fn insert(&mut self, record: SensorRecord) -> Result<(), StoreError> {
        let collection = self.collection()?;

        collection
            .insert_one(record_to_document(record), None)
            .await
            .map_err(|e| StoreError::write(BACKEND, e))?;

        debug!("[{}] inserted 1 document", BACKEND);
        Ok(())
    }

    async fn select_all(&mut self) -> Result<Vec<SensorRecord>, StoreError> {
        let collection = self.collection()?;

        let mut cursor = collection
            .find(None, None)
            .await
            .map_err(|e| StoreError::read(BACKEND, e))?;

        let mut rows = Vec::new();
        while let Some(document) = cursor
            .try_next()
            .await
            .map_err(|e| StoreError::read(BACKEND, e))?
        {
            rows.push(document_to_record(document));
        }

        let read = collect_lenient(BACKEND, rows);
        debug!(
            "[{}] selected {} documents ({} skipped)",
            BACKEND,
            read.records.len(),
            read.skipped
        );
        Ok(read.records)
    }

    async fn delete_all(&mut self) -> Result<(), StoreError> {
        let collection = self.collection()?;

        let result = collection
            .delete_many(doc! {}, None)
            .await
            .map_err(|e| StoreError::write(BACKEND, e))?;

        debug!("[{}] deleted {} documents", BACKEND, result.deleted_count);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        if let Some(client) = self.client.take() {
            client.shutdown().await;
            info!("[{}] client shut down", BACKEND);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    fn backend_type(&self) -> &'static str {
        BACKEND
    }
}

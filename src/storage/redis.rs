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

// Key-value backend: the dataset is one Redis list of JSON blobs

use super::backend::{collect_lenient, SensorStore};
use super::factory::BackendKind;
use crate::config::RedisConfig;
use crate::error::StoreError;
use crate::record::SensorRecord;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, info};

const BACKEND: &str = BackendKind::KeyValue.as_str();

/// Redis adapter
///
/// `insert` appends with RPUSH so the list keeps insertion order,
/// `select_all` reads the whole list with a single LRANGE, and
/// `delete_all` drops the key.
pub struct RedisStore {
    config: RedisConfig,
    conn: Option<MultiplexedConnection>,
}

impl RedisStore {
    pub fn new(config: RedisConfig) -> Self {
        Self { config, conn: None }
    }
}

fn decode_entry(entry: &[u8]) -> Result<SensorRecord, StoreError> {
    SensorRecord::from_json_slice(entry)
}

#[async_trait]
impl SensorStore for RedisStore {
    async fn connect(&mut self) -> Result<(), StoreError> {
        let client = redis::Client::open(self.config.url.as_str())
            .map_err(|e| StoreError::connection(BACKEND, e))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::connection(BACKEND, e))?;

        info!("[{}] connected, list key '{}'", BACKEND, self.config.key);
        self.conn = Some(conn);
        Ok(())
    }

    async fn insert(&mut self, record: SensorRecord) -> Result<(), StoreError> {
        let conn = self
            .conn
            .as_mut()
            .ok_or(StoreError::NotConnected { backend: BACKEND })?;

        let length: usize = conn
            .rpush(&self.config.key, record.to_json_string())
            .await
            .map_err(|e| StoreError::write(BACKEND, e))?;

        debug!("[{}] appended entry, list length {}", BACKEND, length);
        Ok(())
    }

    async fn select_all(&mut self) -> Result<Vec<SensorRecord>, StoreError> {
        let conn = self
            .conn
            .as_mut()
            .ok_or(StoreError::NotConnected { backend: BACKEND })?;

        let entries: Vec<Vec<u8>> = conn
            .lrange(&self.config.key, 0, -1)
            .await
            .map_err(|e| StoreError::read(BACKEND, e))?;

        let read = collect_lenient(BACKEND, entries.iter().map(|entry| decode_entry(entry)));
        debug!("[{}] selected {} entries ({} skipped)", BACKEND, read.records.len(), read.skipped);
        Ok(read.records)
    }

    async fn delete_all(&mut self) -> Result<(), StoreError> {
        let conn = self
            .conn
            .as_mut()
            .ok_or(StoreError::NotConnected { backend: BACKEND })?;

        let removed: usize = conn
            .del(&self.config.key)
            .await
            .map_err(|e| StoreError::write(BACKEND, e))?;

        debug!("[{}] deleted {} key(s)", BACKEND, removed);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        // Dropping the last handle ends the multiplexed connection's driver task.
        if self.conn.take().is_some() {
            info!("[{}] connection closed", BACKEND);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn backend_type(&self) -> &'static str {
        BACKEND
    }
}

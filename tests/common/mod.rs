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

// In-memory SensorStore double shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use sensor_storage::storage::collect_lenient;
use sensor_storage::{SensorRecord, SensorStore, StoreError};
use std::sync::{Arc, Mutex};

/// Stores JSON blobs in a shared list, like the key-value adapter.
///
/// Clones share the stored rows and the call log but not the session, so a
/// clone behaves like a fresh adapter over the same dataset.
#[derive(Clone)]
pub struct MemoryStore {
    name: &'static str,
    rows: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<&'static str>>>,
    connected: bool,
    fail_connect: bool,
    fail_close: bool,
}

impl MemoryStore {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            connected: false,
            fail_connect: false,
            fail_close: false,
        }
    }

    /// A store whose backend is unreachable
    pub fn unreachable(name: &'static str) -> Self {
        Self {
            fail_connect: true,
            ..Self::new(name)
        }
    }

    /// A store whose transport reports an error on shutdown
    pub fn failing_close(name: &'static str) -> Self {
        Self {
            fail_close: true,
            ..Self::new(name)
        }
    }

    /// Write a raw entry, bypassing record encoding
    pub fn push_raw(&self, raw: &str) {
        self.rows.lock().unwrap().push(raw.to_string());
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn ensure_connected(&self) -> Result<(), StoreError> {
        if self.connected {
            Ok(())
        } else {
            Err(StoreError::NotConnected {
                backend: self.name,
            })
        }
    }
}

#[async_trait]
impl SensorStore for MemoryStore {
    async fn connect(&mut self) -> Result<(), StoreError> {
        self.record_call("connect");
        if self.fail_connect {
            return Err(StoreError::connection(self.name, "connection refused"));
        }
        self.connected = true;
        Ok(())
    }

    async fn insert(&mut self, record: SensorRecord) -> Result<(), StoreError> {
        self.record_call("insert");
        self.ensure_connected()?;
        self.rows.lock().unwrap().push(record.to_json_string());
        Ok(())
    }

    async fn select_all(&mut self) -> Result<Vec<SensorRecord>, StoreError> {
        self.record_call("select_all");
        self.ensure_connected()?;
        let rows = self.rows.lock().unwrap().clone();
        let read = collect_lenient(
            self.name,
            rows.iter().map(|row| SensorRecord::from_json_str(row)),
        );
        Ok(read.records)
    }

    async fn delete_all(&mut self) -> Result<(), StoreError> {
        self.record_call("delete_all");
        self.ensure_connected()?;
        self.rows.lock().unwrap().clear();
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.record_call("close");
        let was_connected = std::mem::replace(&mut self.connected, false);
        if was_connected && self.fail_close {
            return Err(StoreError::close(self.name, "socket reset during shutdown"));
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn backend_type(&self) -> &'static str {
        self.name
    }
}

/// A fixed reading, handy for equality checks
pub fn reading(value: f64) -> SensorRecord {
    SensorRecord::new(1_700_000_000, "den", "bmp280", "temperature", "C", value)
}

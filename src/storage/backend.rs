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

// Storage capability trait shared by every backend adapter

use crate::error::StoreError;
use crate::record::SensorRecord;
use async_trait::async_trait;
use std::fmt::Display;
use tracing::warn;

/// Uniform capability set over one sensor dataset.
///
/// An adapter owns at most one live session: `connect` opens it, `close`
/// releases it. Every other operation fails with
/// [`StoreError::NotConnected`] when no session is open. Each call is a
/// single round trip with no internal retry; callers that want retries or
/// deadlines wrap the calls themselves.
///
/// Instances are not meant to be shared. Build a new adapter per workflow
/// or request.
#[async_trait]
pub trait SensorStore: Send {
    /// Open the backend session using the adapter's fixed parameters
    async fn connect(&mut self) -> Result<(), StoreError>;

    /// Persist exactly one record (no uniqueness or upsert semantics)
    async fn insert(&mut self, record: SensorRecord) -> Result<(), StoreError>;

    /// Read every stored record in backend order.
    ///
    /// Entries that cannot be decoded are skipped; only a failed read as a
    /// whole is an error.
    async fn select_all(&mut self) -> Result<Vec<SensorRecord>, StoreError>;

    /// Remove every record of the dataset
    async fn delete_all(&mut self) -> Result<(), StoreError>;

    /// Release the session. A no-op when never connected.
    ///
    /// Local resources are released even when the transport reports a
    /// shutdown error.
    async fn close(&mut self) -> Result<(), StoreError>;

    fn is_connected(&self) -> bool;

    /// Get backend type identifier
    fn backend_type(&self) -> &'static str;
}

/// Records decoded from a read, with the count of skipped entries
#[derive(Debug, Default)]
pub struct LenientRead {
    pub records: Vec<SensorRecord>,
    pub skipped: usize,
}

/// Aggregate per-entry decode results, dropping the failures.
///
/// Each skipped entry is logged with its position in the read.
pub fn collect_lenient<I, E>(backend: &str, rows: I) -> LenientRead
where
    I: IntoIterator<Item = Result<SensorRecord, E>>,
    E: Display,
{
    let mut read = LenientRead::default();

    for (index, row) in rows.into_iter().enumerate() {
        match row {
            Ok(record) => read.records.push(record),
            Err(e) => {
                warn!("[{}] skipping undecodable entry #{}: {}", backend, index, e);
                read.skipped += 1;
            }
        }
    }

    read
}

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

// Columnar backend: one CQL table per dataset

use super::backend::{collect_lenient, SensorStore};
use super::factory::BackendKind;
use crate::config::CassandraConfig;
use crate::error::StoreError;
use crate::record::SensorRecord;
use async_trait::async_trait;
use scylla::{Session, SessionBuilder};
use tracing::{debug, info};

const BACKEND: &str = BackendKind::Columnar.as_str();

type ReadingRow = (
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<f64>,
);

/// Cassandra/ScyllaDB adapter
///
/// Rows are keyed by a server-generated `timeuuid`, so every insert
/// appends and no record field has to be non-empty. The column never
/// leaves this module.
pub struct CassandraStore {
    config: CassandraConfig,
    session: Option<Session>,
}

impl CassandraStore {
    pub fn new(config: CassandraConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    fn qualified_table(&self) -> String {
        format!("{}.{}", self.config.keyspace, self.config.table)
    }

    fn table_schema(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             id TIMEUUID PRIMARY KEY, recorded BIGINT, location TEXT, sensor TEXT, \
             measurement TEXT, units TEXT, value DOUBLE)",
            self.qualified_table()
        )
    }

    async fn ensure_schema(&self, session: &Session) -> Result<(), StoreError> {
        let create_keyspace = format!(
            "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = {{ 'class' : 'SimpleStrategy', 'replication_factor' : 1 }}",
            self.config.keyspace
        );
        session
            .query_unpaged(create_keyspace, ())
            .await
            .map_err(|e| StoreError::connection(BACKEND, e))?;

        let create_table = self.table_schema();
        session
            .query_unpaged(create_table, ())
            .await
            .map_err(|e| StoreError::connection(BACKEND, e))?;

        debug!("[{}] schema ready: {}", BACKEND, self.qualified_table());
        Ok(())
    }
}

#[async_trait]
impl SensorStore for CassandraStore {
    async fn connect(&mut self) -> Result<(), StoreError> {
        let mut builder = SessionBuilder::new().known_node(&self.config.contact_point);
        if let (Some(username), Some(password)) = (&self.config.username, &self.config.password) {
            builder = builder.user(username, password);
        }

        let session = builder
            .build()
            .await
            .map_err(|e| StoreError::connection(BACKEND, e))?;

        if self.config.create_schema {
            self.ensure_schema(&session).await?;
        }

        info!("[{}] connected to {}", BACKEND, self.config.contact_point);
        self.session = Some(session);
        Ok(())
    }

    async fn insert(&mut self, record: SensorRecord) -> Result<(), StoreError> {
        let statement = format!(
            "INSERT INTO {} (location, recorded, id, sensor, measurement, units, value) \
             VALUES (?, ?, now(), ?, ?, ?, ?)",
            self.qualified_table()
        );
        let session = self
            .session
            .as_ref()
            .ok_or(StoreError::NotConnected { backend: BACKEND })?;

        session
            .query_unpaged(
                statement,
                (
                    record.location,
                    record.recorded_at,
                    record.sensor_kind,
                    record.measurement,
                    record.units,
                    record.value,
                ),
            )
            .await
            .map_err(|e| StoreError::write(BACKEND, e))?;

        debug!("[{}] inserted 1 row", BACKEND);
        Ok(())
    }

    async fn select_all(&mut self) -> Result<Vec<SensorRecord>, StoreError> {
        let statement = format!(
            "SELECT recorded, location, sensor, measurement, units, value FROM {}",
            self.qualified_table()
        );
        let session = self
            .session
            .as_ref()
            .ok_or(StoreError::NotConnected { backend: BACKEND })?;

        let result = session
            .query_unpaged(statement, ())
            .await
            .map_err(|e| StoreError::read(BACKEND, e))?;

        let rows = result.rows_typed_or_empty::<ReadingRow>().map(|row| {
            row.map(|(recorded, location, sensor, measurement, units, value)| {
                SensorRecord::from_columns(recorded, location, sensor, measurement, units, value)
            })
        });

        let read = collect_lenient(BACKEND, rows);
        debug!("[{}] selected {} rows ({} skipped)", BACKEND, read.records.len(), read.skipped);
        Ok(read.records)
    }

    async fn delete_all(&mut self) -> Result<(), StoreError> {
        let statement = format!("TRUNCATE {}", self.qualified_table());
        let session = self
            .session
            .as_ref()
            .ok_or(StoreError::NotConnected { backend: BACKEND })?;

        session
            .query_unpaged(statement, ())
            .await
            .map_err(|e| StoreError::write(BACKEND, e))?;

        debug!("[{}] truncated {}", BACKEND, self.qualified_table());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        // The driver has no explicit shutdown; dropping the session closes its pools.
        if self.session.take().is_some() {
            info!("[{}] session closed", BACKEND);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn backend_type(&self) -> &'static str {
        BACKEND
    }
}

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

// Relational backend B: MySQL, row-by-row deletes

use super::backend::{collect_lenient, SensorStore};
use super::factory::BackendKind;
use crate::config::MySqlConfig;
use crate::error::StoreError;
use crate::record::SensorRecord;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::{Connection, Row};
use tracing::{debug, info, warn};

const BACKEND: &str = BackendKind::RelationalB.as_str();

/// MySQL adapter over a single connection
pub struct MySqlStore {
    config: MySqlConfig,
    conn: Option<MySqlConnection>,
}

impl MySqlStore {
    pub fn new(config: MySqlConfig) -> Self {
        Self { config, conn: None }
    }
}

fn row_to_record(row: &MySqlRow) -> Result<SensorRecord, sqlx::Error> {
    Ok(SensorRecord::from_columns(
        row.try_get("recorded")?,
        row.try_get("location")?,
        row.try_get("sensor")?,
        row.try_get("measurement")?,
        row.try_get("units")?,
        row.try_get("value")?,
    ))
}

#[async_trait]
impl SensorStore for MySqlStore {
    async fn connect(&mut self) -> Result<(), StoreError> {
        let mut conn = MySqlConnection::connect(&self.config.url)
            .await
            .map_err(|e| StoreError::connection(BACKEND, e))?;

        if self.config.create_schema {
            let create_table = format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id BIGINT AUTO_INCREMENT PRIMARY KEY,
                    recorded BIGINT NOT NULL,
                    location VARCHAR(255) NOT NULL,
                    sensor VARCHAR(255) NOT NULL,
                    measurement VARCHAR(255) NOT NULL,
                    units VARCHAR(50) NOT NULL,
                    value DOUBLE NOT NULL
                )",
                self.config.table
            );
            sqlx::query(&create_table)
                .execute(&mut conn)
                .await
                .map_err(|e| StoreError::connection(BACKEND, e))?;
        }

        info!("[{}] connected, table '{}'", BACKEND, self.config.table);
        self.conn = Some(conn);
        Ok(())
    }

    async fn insert(&mut self, record: SensorRecord) -> Result<(), StoreError> {
        let statement = format!(
            "INSERT INTO {} (recorded, location, sensor, measurement, units, value) \
             VALUES (?, ?, ?, ?, ?, ?)",
            self.config.table
        );
        let conn = self
            .conn
            .as_mut()
            .ok_or(StoreError::NotConnected { backend: BACKEND })?;

        sqlx::query(&statement)
            .bind(record.recorded_at)
            .bind(record.location)
            .bind(record.sensor_kind)
            .bind(record.measurement)
            .bind(record.units)
            .bind(record.value)
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::write(BACKEND, e))?;

        debug!("[{}] inserted 1 row", BACKEND);
        Ok(())
    }

    async fn select_all(&mut self) -> Result<Vec<SensorRecord>, StoreError> {
        let statement = format!(
            "SELECT recorded, location, sensor, measurement, units, value FROM {}",
            self.config.table
        );
        let conn = self
            .conn
            .as_mut()
            .ok_or(StoreError::NotConnected { backend: BACKEND })?;

        let rows = sqlx::query(&statement)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| StoreError::read(BACKEND, e))?;

        let read = collect_lenient(BACKEND, rows.iter().map(row_to_record));
        debug!("[{}] selected {} rows ({} skipped)", BACKEND, read.records.len(), read.skipped);
        Ok(read.records)
    }

    async fn delete_all(&mut self) -> Result<(), StoreError> {
        let statement = format!("DELETE FROM {}", self.config.table);
        let conn = self
            .conn
            .as_mut()
            .ok_or(StoreError::NotConnected { backend: BACKEND })?;

        let result = sqlx::query(&statement)
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::write(BACKEND, e))?;

        debug!("[{}] deleted {} rows", BACKEND, result.rows_affected());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        // `close` consumes the connection, so it is released either way.
        match conn.close().await {
            Ok(()) => {
                info!("[{}] connection closed", BACKEND);
                Ok(())
            }
            Err(e) => {
                warn!("[{}] error while closing connection: {}", BACKEND, e);
                Err(StoreError::close(BACKEND, e))
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn backend_type(&self) -> &'static str {
        BACKEND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_select_requires_connection() {
        let mut store = MySqlStore::new(MySqlConfig::default());
        assert!(matches!(
            store.select_all().await,
            Err(StoreError::NotConnected { backend: "relational-b" })
        ));
        assert_eq!(store.backend_type(), "relational-b");
    }
}

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

// Backend selection: configuration name -> adapter instance

use super::backend::SensorStore;
use super::cassandra::CassandraStore;
use super::mongo::MongoStore;
use super::mysql::MySqlStore;
use super::postgres::PostgresStore;
use super::redis::RedisStore;
use crate::config::StorageConfig;
use crate::error::StoreError;
use crate::record::SensorRecord;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// The five supported storage engine kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Columnar,
    Document,
    RelationalA,
    RelationalB,
    KeyValue,
}

impl BackendKind {
    /// Every kind, in demonstration-run order
    pub const ALL: [BackendKind; 5] = [
        BackendKind::Columnar,
        BackendKind::Document,
        BackendKind::RelationalA,
        BackendKind::RelationalB,
        BackendKind::KeyValue,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            BackendKind::Columnar => "columnar",
            BackendKind::Document => "document",
            BackendKind::RelationalA => "relational-a",
            BackendKind::RelationalB => "relational-b",
            BackendKind::KeyValue => "key-value",
        }
    }

    /// Concrete store behind the kind, for log output
    pub const fn engine(self) -> &'static str {
        match self {
            BackendKind::Columnar => "Cassandra",
            BackendKind::Document => "MongoDB",
            BackendKind::RelationalA => "PostgreSQL",
            BackendKind::RelationalB => "MySQL",
            BackendKind::KeyValue => "Redis",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = StoreError;

    /// Accepts the canonical kind names and the engine aliases used by
    /// `DATA_ACCESS` deployments. Anything else is a configuration error.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "columnar" | "cassandra" => Ok(BackendKind::Columnar),
            "document" | "mongo" | "mongodb" => Ok(BackendKind::Document),
            "relational-a" | "postgres" | "postgresql" => Ok(BackendKind::RelationalA),
            "relational-b" | "mysql" => Ok(BackendKind::RelationalB),
            "key-value" | "redis" => Ok(BackendKind::KeyValue),
            _ => Err(StoreError::Configuration(format!(
                "Unknown storage backend: '{}'. Supported: columnar, document, relational-a, relational-b, key-value",
                name
            ))),
        }
    }
}

/// One adapter of each kind behind a single tagged type.
///
/// The variant is fixed when the adapter is built; calls go straight to
/// the concrete adapter without a vtable.
pub enum Backend {
    Columnar(CassandraStore),
    Document(MongoStore),
    RelationalA(PostgresStore),
    RelationalB(MySqlStore),
    KeyValue(RedisStore),
}

macro_rules! dispatch {
    ($self:expr, $store:ident => $call:expr) => {
        match $self {
            Backend::Columnar($store) => $call,
            Backend::Document($store) => $call,
            Backend::RelationalA($store) => $call,
            Backend::RelationalB($store) => $call,
            Backend::KeyValue($store) => $call,
        }
    };
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Columnar(_) => BackendKind::Columnar,
            Backend::Document(_) => BackendKind::Document,
            Backend::RelationalA(_) => BackendKind::RelationalA,
            Backend::RelationalB(_) => BackendKind::RelationalB,
            Backend::KeyValue(_) => BackendKind::KeyValue,
        }
    }
}

#[async_trait]
impl SensorStore for Backend {
    async fn connect(&mut self) -> Result<(), StoreError> {
        dispatch!(self, store => store.connect().await)
    }

    async fn insert(&mut self, record: SensorRecord) -> Result<(), StoreError> {
        dispatch!(self, store => store.insert(record).await)
    }

    async fn select_all(&mut self) -> Result<Vec<SensorRecord>, StoreError> {
        dispatch!(self, store => store.select_all().await)
    }

    async fn delete_all(&mut self) -> Result<(), StoreError> {
        dispatch!(self, store => store.delete_all().await)
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        dispatch!(self, store => store.close().await)
    }

    fn is_connected(&self) -> bool {
        dispatch!(self, store => store.is_connected())
    }

    fn backend_type(&self) -> &'static str {
        self.kind().as_str()
    }
}

pub struct BackendFactory;

impl BackendFactory {
    /// Build the adapter for `kind`. Nothing is contacted until `connect`.
    pub fn create(kind: BackendKind, config: &StorageConfig) -> Backend {
        match kind {
            BackendKind::Columnar => Backend::Columnar(CassandraStore::new(config.cassandra.clone())),
            BackendKind::Document => Backend::Document(MongoStore::new(config.mongo.clone())),
            BackendKind::RelationalA => Backend::RelationalA(PostgresStore::new(config.postgres.clone())),
            BackendKind::RelationalB => Backend::RelationalB(MySqlStore::new(config.mysql.clone())),
            BackendKind::KeyValue => Backend::KeyValue(RedisStore::new(config.redis.clone())),
        }
    }

    /// Create storage backend from configuration
    pub fn from_config(config: &StorageConfig) -> Result<Backend, StoreError> {
        let kind = config.backend.parse::<BackendKind>()?;
        Ok(Self::create(kind, config))
    }

    /// One fresh adapter per kind, for the multi-backend run
    pub fn create_all(config: &StorageConfig) -> Vec<Backend> {
        BackendKind::ALL
            .into_iter()
            .map(|kind| Self::create(kind, config))
            .collect()
    }
}

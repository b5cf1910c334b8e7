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

// Sensor reading storage with interchangeable backends
//
// One capability set (connect / insert / select all / delete all / close)
// over five stores:
// - columnar: Cassandra / ScyllaDB (CQL)
// - document: MongoDB
// - relational-a: PostgreSQL
// - relational-b: MySQL
// - key-value: Redis list
//
// On top of that sit lenient JSON coercion for loosely typed input, a CSV
// exporter for reporting, a workflow orchestrator and an HTTP route layer.

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod protocol;
pub mod record;
pub mod storage;
pub mod workflow;

// Re-export main types
pub use config::{load_config, load_config_with_env, load_or_default, AppConfig};
pub use error::StoreError;
pub use export::{json_strings_to_csv, records_to_csv};
pub use record::SensorRecord;
pub use storage::{Backend, BackendFactory, BackendKind, LenientRead, SensorStore};
pub use workflow::{run_all, run_all_concurrent, run_workflow, BackendOutcome, WorkflowReport};

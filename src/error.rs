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

// Error taxonomy shared by every storage adapter

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the storage capability interface
///
/// Transport variants carry the backend name and the driver error that
/// caused them. Adapters return these unchanged to the caller; nothing
/// in this crate retries.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("[{backend}] connection failed: {source}")]
    Connection {
        backend: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("[{backend}] not connected, call connect() first")]
    NotConnected { backend: &'static str },

    #[error("[{backend}] read failed: {source}")]
    Read {
        backend: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("[{backend}] write failed: {source}")]
    Write {
        backend: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("[{backend}] close failed: {source}")]
    Close {
        backend: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    pub fn connection(backend: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Connection {
            backend,
            source: source.into(),
        }
    }

    pub fn read(backend: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Read {
            backend,
            source: source.into(),
        }
    }

    pub fn write(backend: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Write {
            backend,
            source: source.into(),
        }
    }

    pub fn close(backend: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Close {
            backend,
            source: source.into(),
        }
    }
}

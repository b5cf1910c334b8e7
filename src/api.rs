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

// HTTP route layer
//
// Every request builds its own adapter through a `StoreFactory`, runs one
// storage stage against it and closes it again. Nothing is shared between
// requests except the factory itself.

use crate::config::StorageConfig;
use crate::error::StoreError;
use crate::export::records_to_csv;
use crate::protocol::{
    ErrorResponse, MessageResponse, ERR_INVALID_JSON, ERR_NO_DATA, MSG_LOGGED, MSG_PURGED,
    MSG_RUNNING, REPORT_DISPOSITION,
};
use crate::record::SensorRecord;
use crate::storage::{Backend, BackendFactory, BackendKind, SensorStore};
use crate::workflow;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Builds a fresh, unconnected adapter for one request
pub trait StoreFactory: Clone + Send + Sync + 'static {
    type Store: SensorStore + 'static;

    fn build(&self) -> Result<Self::Store, StoreError>;
}

impl<F, S> StoreFactory for F
where
    F: Fn() -> Result<S, StoreError> + Clone + Send + Sync + 'static,
    S: SensorStore + 'static,
{
    type Store = S;

    fn build(&self) -> Result<S, StoreError> {
        self()
    }
}

/// Factory for the configured backend kind
#[derive(Clone)]
pub struct ConfiguredFactory {
    kind: BackendKind,
    config: Arc<StorageConfig>,
}

impl ConfiguredFactory {
    pub fn new(config: StorageConfig) -> Result<Self, StoreError> {
        let kind = config.backend.parse::<BackendKind>()?;
        Ok(Self {
            kind,
            config: Arc::new(config),
        })
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }
}

impl StoreFactory for ConfiguredFactory {
    type Store = Backend;

    fn build(&self) -> Result<Backend, StoreError> {
        Ok(BackendFactory::create(self.kind, &self.config))
    }
}

/// Error reply carrying its HTTP status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MalformedInput(detail) => {
                warn!("Rejected request body: {}", detail);
                Self::new(StatusCode::BAD_REQUEST, ERR_INVALID_JSON)
            }
            other => {
                error!("Storage request failed: {}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

/// Create the application router
pub fn create_router<F: StoreFactory>(factory: F) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/echo", post(echo))
        .route("/log", post(log_data::<F>))
        .route("/report", get(report::<F>))
        .route("/purge", get(purge::<F>).post(purge::<F>))
        .layer(TraceLayer::new_for_http())
        .with_state(factory)
}

/// Bind `addr` and serve until Ctrl+C
pub async fn serve<F: StoreFactory>(addr: SocketAddr, factory: F) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("API server listening on {}", addr);

    axum::serve(listener, create_router(factory))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    info!("Received Ctrl+C, shutting down");
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new(MSG_RUNNING))
}

async fn echo(body: Bytes) -> Result<Json<Value>, ApiError> {
    serde_json::from_slice::<Value>(&body)
        .map(Json)
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, ERR_INVALID_JSON))
}

async fn log_data<F: StoreFactory>(
    State(factory): State<F>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let record = SensorRecord::from_json_slice(&body)?;
    let mut store = factory.build()?;

    workflow::ingest(&mut store, record).await?;
    Ok(Json(MessageResponse::new(MSG_LOGGED)))
}

async fn report<F: StoreFactory>(State(factory): State<F>) -> Result<Response, ApiError> {
    let mut store = factory.build()?;
    let records = workflow::report(&mut store).await?;

    if records.is_empty() {
        return Err(ApiError::new(StatusCode::NOT_FOUND, ERR_NO_DATA));
    }

    let csv = records_to_csv(&records)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, REPORT_DISPOSITION),
        ],
        csv,
    )
        .into_response())
}

async fn purge<F: StoreFactory>(
    State(factory): State<F>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut store = factory.build()?;

    workflow::purge(&mut store).await?;
    Ok(Json(MessageResponse::new(MSG_PURGED)))
}

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

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sensor_storage::api::{self, ConfiguredFactory};
use sensor_storage::config::{load_with_overrides, LoggingConfig};
use sensor_storage::{
    run_all, run_all_concurrent, run_workflow, AppConfig, BackendFactory,
    SensorRecord, SensorStore,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Sensor Storage - store sensor readings in interchangeable backends
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Storage backend (overrides config file and DATA_ACCESS)
    #[arg(short, long)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run connect -> insert -> select -> export -> delete -> close once
    Run {
        /// Run against all five backends, continuing past failures
        #[arg(long)]
        all: bool,

        /// Run the backends concurrently
        #[arg(long, requires = "all")]
        concurrent: bool,
    },
    /// Serve the HTTP API
    Serve {
        /// Listen address (overrides config file)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    let command = args.command.unwrap_or(Command::Run {
        all: false,
        concurrent: false,
    });
    let bind = match &command {
        Command::Serve { bind } => bind.clone(),
        Command::Run { .. } => None,
    };

    // Load configuration (defaults when the file is absent); CLI overrides
    // win over file and environment, and validation sees the final values
    let config = load_with_overrides(&args.config, |config| {
        if let Some(backend) = args.backend {
            config.storage.backend = backend;
        }
        if let Some(bind) = bind {
            config.server.bind = bind;
        }
    })?;

    init_tracing(&config.logging)?;

    info!("Starting sensor-storage");
    info!("Loaded configuration from: {:?}", args.config);
    info!("Storage backend: {}", config.storage.backend);

    match command {
        Command::Run { all: true, concurrent } => run_demonstration(&config, concurrent).await,
        Command::Run { .. } => run_single(&config).await,
        Command::Serve { .. } => serve(config).await,
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

async fn run_single(config: &AppConfig) -> Result<()> {
    let mut store = BackendFactory::from_config(&config.storage)?;
    let backend = store.backend_type();
    info!("Running workflow on {} ({})", backend, store.kind().engine());

    let report = run_workflow(&mut store, SensorRecord::sample())
        .await
        .with_context(|| format!("Workflow failed for {}", backend))?;

    println!("{}", report.csv);
    Ok(())
}

async fn run_demonstration(config: &AppConfig, concurrent: bool) -> Result<()> {
    let stores = BackendFactory::create_all(&config.storage);

    let outcomes = if concurrent {
        run_all_concurrent(stores).await
    } else {
        run_all(stores).await
    };

    for outcome in &outcomes {
        if let Ok(report) = &outcome.result {
            println!("# {}", outcome.backend);
            println!("{}", report.csv);
        }
    }
    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;

    let factory = ConfiguredFactory::new(config.storage)?;
    let kind = factory.kind();
    info!("Serving the {} backend ({})", kind, kind.engine());

    api::serve(addr, factory).await
}

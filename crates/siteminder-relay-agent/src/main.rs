// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use siteminder_relay::{
    batcher::Batcher,
    config::{self, Config},
    constants::{AGENT_VERSION, CONFIG_FILE_NAME},
    errors::StartupError,
    event::EventBuilder,
    flusher::Flusher,
    listener::Listener,
    logging,
    queue::event_queue,
};

#[tokio::main]
pub async fn main() -> ExitCode {
    // first argument, then NR_CONFIG_FILE, then the working directory
    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var("NR_CONFIG_FILE").ok())
        .unwrap_or_else(|| CONFIG_FILE_NAME.to_string());

    let config = match config::get_config(Path::new(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration from {config_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match logging::init(config.debug, &config.log_file) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error setting up logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!("Starting SiteMinder relay {AGENT_VERSION}");
    match run(config).await {
        Ok(()) => {
            info!("SiteMinder relay stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("SiteMinder relay stopped on a fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), StartupError> {
    let listener_config = config.listener_config()?;
    let cancel_token = CancellationToken::new();
    let (queue, rx) = event_queue();

    let flusher = Arc::new(Flusher::new(config.flusher_config(), queue.clone())?);
    let event_builder = EventBuilder::new(&config.event_builder_config(), queue);
    let listener = Listener::bind(&listener_config, event_builder, cancel_token.clone()).await?;
    info!("Listening on {}", listener_config.addr);

    let batcher = Batcher::new(rx, flusher, config.batcher_config(), cancel_token.clone());
    let batcher_task = tokio::spawn(batcher.run());
    let mut listener_task = tokio::spawn(listener.spin());

    let result = tokio::select! {
        spun = &mut listener_task => match spun {
            Ok(Ok(())) => {
                info!("No further clients will be accepted, flushing until interrupted");
                wait_for_shutdown().await;
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(e) => {
                error!("Listener task failed: {e}");
                wait_for_shutdown().await;
                Ok(())
            }
        },
        () = wait_for_shutdown() => Ok(()),
    };

    cancel_token.cancel();
    stop_batcher(batcher_task).await;
    result
}

async fn wait_for_shutdown() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received interrupt, shutting down"),
        Err(e) => error!("Failed to listen for the interrupt signal: {e}"),
    }
}

async fn stop_batcher(batcher_task: JoinHandle<()>) {
    debug!("Waiting for the batcher to flush remaining events");
    if let Err(e) = batcher_task.await {
        error!("Batcher task failed: {e}");
    }
}

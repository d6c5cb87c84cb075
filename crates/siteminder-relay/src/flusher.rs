// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use crate::constants::INSERT_KEY_HEADER;
use crate::errors::{ConfigError, ShippingError, StartupError};
use crate::event::{Event, EventData};
use crate::http::build_client;
use crate::queue::EventQueue;
use crate::retry;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Response, StatusCode, Url};
use tracing::{debug, error, warn};

/// Destination of every batch the batcher flushes.
#[async_trait]
pub trait BatchFlusher: Send + Sync {
    async fn flush(&self, batch: Vec<Event>);
}

/// How a single delivery attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Logged only, never retried.
    UnexpectedStatus(StatusCode),
    /// Transport failure; the whole batch should be retried.
    Retry,
    /// The batch could not be encoded or sent as a request; retrying cannot help.
    Dropped,
}

pub struct FlusherConfig {
    pub insights_url: String,
    pub insights_key: String,
    pub proxy_url: Option<String>,
    pub timeout: Duration,
    pub max_request_retries: u32,
}

/// Ships batches to the ingestion endpoint and hands failed ones to retry.
pub struct Flusher {
    client: reqwest::Client,
    url: Url,
    insert_key: HeaderValue,
    max_request_retries: u32,
    queue: EventQueue,
}

impl Flusher {
    pub fn new(config: FlusherConfig, queue: EventQueue) -> Result<Self, StartupError> {
        let url = Url::parse(&config.insights_url).map_err(|e| ConfigError::InvalidValue {
            field: "insights_url",
            reason: e.to_string(),
        })?;
        let mut insert_key =
            HeaderValue::from_str(&config.insights_key).map_err(|e| ConfigError::InvalidValue {
                field: "insights_key",
                reason: e.to_string(),
            })?;
        insert_key.set_sensitive(true);
        let client = build_client(config.proxy_url.as_deref(), config.timeout)
            .map_err(|e| StartupError::HttpClient(e.to_string()))?;

        Ok(Flusher {
            client,
            url,
            insert_key,
            max_request_retries: config.max_request_retries,
            queue,
        })
    }

    /// Sends `batch` as one JSON array, in order.
    pub async fn ship(&self, batch: &[Event]) -> Result<Response, ShippingError> {
        let body = encode(batch).map_err(|e| ShippingError::Payload(e.to_string()))?;
        debug!("Sending payload: {}", String::from_utf8_lossy(&body));

        self.client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(INSERT_KEY_HEADER, self.insert_key.clone())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    ShippingError::Payload(e.to_string())
                } else {
                    ShippingError::Transport(e)
                }
            })
    }

    /// Makes one delivery attempt and classifies its outcome.
    pub async fn deliver(&self, batch: &[Event]) -> DeliveryOutcome {
        let n_events = batch.len();
        match self.ship(batch).await {
            Ok(response) => match response.status() {
                StatusCode::OK => {
                    debug!("Successfully flushed {n_events} events");
                    DeliveryOutcome::Delivered
                }
                status => {
                    warn!("Received status code {status} while sending {n_events} events");
                    DeliveryOutcome::UnexpectedStatus(status)
                }
            },
            Err(ShippingError::Payload(msg)) => {
                error!("Failed to prepare payload. {n_events} events dropped: {msg}");
                DeliveryOutcome::Dropped
            }
            Err(ShippingError::Transport(e)) => {
                warn!("Network error while sending {n_events} events, will retry: {e}");
                DeliveryOutcome::Retry
            }
        }
    }
}

#[async_trait]
impl BatchFlusher for Flusher {
    async fn flush(&self, batch: Vec<Event>) {
        if self.deliver(&batch).await == DeliveryOutcome::Retry {
            retry::resubmit(batch, self.max_request_retries, &self.queue).await;
        }
    }
}

fn encode(batch: &[Event]) -> Result<Vec<u8>, serde_json::Error> {
    let payload: Vec<&EventData> = batch.iter().map(Event::data).collect();
    serde_json::to_vec(&payload)
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Forwardable events and the builder that turns parsed metrics into them.

use std::collections::{BTreeMap, HashMap};

use crate::constants::{
    AGENT_VERSION, AGENT_VERSION_KEY, EVENT_TYPE, EVENT_TYPE_KEY, INTERVAL_KEY, METRIC_NAME_KEY,
    METRIC_TYPE_KEY, METRIC_VALUE_KEY, PORT_KEY,
};
use crate::metric::Metric;
use crate::queue::EventQueue;
use tracing::{debug, error};

/// Flat string-to-string record shipped for every event. Keys serialize in sorted order.
pub type EventData = BTreeMap<String, String>;

/// One forwardable record together with its encoded size and retry count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    data: EventData,
    size: usize,
    number_of_retries: u32,
}

impl Event {
    /// Wraps `data`, measuring its JSON encoding once.
    pub fn new(data: EventData) -> Result<Self, serde_json::Error> {
        let size = serde_json::to_vec(&data)?.len();
        Ok(Event {
            data,
            size,
            number_of_retries: 0,
        })
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// Byte length of the JSON encoding of [`Event::data`], as measured at creation.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn number_of_retries(&self) -> u32 {
        self.number_of_retries
    }

    pub(crate) fn record_retry(&mut self) {
        self.number_of_retries += 1;
    }

    pub fn into_data(self) -> EventData {
        self.data
    }
}

/// Static context attached to every event.
#[derive(Debug, Clone, Default)]
pub struct EventBuilderConfig {
    pub interval: String,
    pub port: String,
    pub custom_attributes: HashMap<String, String>,
}

/// Merges metrics with static context and submits the resulting events.
#[derive(Clone, Debug)]
pub struct EventBuilder {
    // fixed keys overlaid with custom attributes, computed once
    context: EventData,
    queue: EventQueue,
}

impl EventBuilder {
    pub fn new(config: &EventBuilderConfig, queue: EventQueue) -> Self {
        let mut context = EventData::new();
        context.insert(EVENT_TYPE_KEY.to_string(), EVENT_TYPE.to_string());
        context.insert(AGENT_VERSION_KEY.to_string(), AGENT_VERSION.to_string());
        context.insert(INTERVAL_KEY.to_string(), config.interval.clone());
        context.insert(PORT_KEY.to_string(), config.port.clone());
        for (key, value) in &config.custom_attributes {
            context.insert(key.clone(), value.clone());
        }
        EventBuilder { context, queue }
    }

    /// Builds the event for `metric`. The metric's own fields override any custom attribute
    /// with the same key.
    pub fn build(&self, metric: Metric) -> Result<Event, serde_json::Error> {
        let mut data = self.context.clone();
        data.insert(METRIC_TYPE_KEY.to_string(), metric.metric_type);
        data.insert(METRIC_NAME_KEY.to_string(), metric.name);
        data.insert(METRIC_VALUE_KEY.to_string(), metric.value);
        Event::new(data)
    }

    /// Builds the event for `metric` and hands it to the batcher, waiting for the queue.
    pub async fn submit(&self, metric: Metric) {
        let event = match self.build(metric) {
            Ok(event) => event,
            Err(e) => {
                error!("Failed to serialize event, dropping it: {}", e);
                return;
            }
        };
        debug!("Adding event to the queue: {:?}", event.data());
        if let Err(e) = self.queue.submit(event).await {
            error!("Failed to submit event, batcher is not running: {:?}", e.0.data());
        }
    }
}

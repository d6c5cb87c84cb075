// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Value of the `eventType` field on every forwarded event.
pub const EVENT_TYPE: &str = "siteminderSample";
/// Value of the `agentVersion` field on every forwarded event.
pub const AGENT_VERSION: &str = "1.0.0";

pub const CONFIG_FILE_NAME: &str = "siteminder.yml";
pub const LOG_FILE_NAME: &str = "siteminder.log";

pub const DEFAULT_INTERVAL: &str = "30s";
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);
/// In KB
pub const DEFAULT_MAX_BUFFER_SIZE_KB: usize = 100;
pub const DEFAULT_MAX_REQUEST_RETRIES: u32 = 5;

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

pub const INSERT_KEY_HEADER: &str = "X-Insert-Key";

// EventData keys
pub const EVENT_TYPE_KEY: &str = "eventType";
pub const AGENT_VERSION_KEY: &str = "agentVersion";
pub const INTERVAL_KEY: &str = "interval";
pub const PORT_KEY: &str = "port";
pub const METRIC_TYPE_KEY: &str = "metricType";
pub const METRIC_NAME_KEY: &str = "metricName";
pub const METRIC_VALUE_KEY: &str = "metricValue";

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Relay configuration.
//!
//! Loaded in priority order:
//! 1. Defaults
//! 2. YAML file (`siteminder.yml`)
//! 3. `NR_*` environment variables (highest priority)
//!
//! Missing required attributes and unparsable addresses are reported as [`ConfigError`] so
//! that the binary can stop before opening any socket.

use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::batcher::BatcherConfig;
use crate::constants::{
    DEFAULT_FLUSH_INTERVAL, DEFAULT_INTERVAL, DEFAULT_MAX_BUFFER_SIZE_KB,
    DEFAULT_MAX_REQUEST_RETRIES, HTTP_TIMEOUT, LOG_FILE_NAME,
};
use crate::errors::ConfigError;
use crate::event::EventBuilderConfig;
use crate::flusher::FlusherConfig;
use crate::listener::ListenerConfig;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use reqwest::Url;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{error, warn};

const UNSPECIFIED_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub insights_url: String,
    pub insights_key: String,
    /// Listen port, also reported on every event. `9000`, `:9000` or `host:9000`.
    pub port: String,
    /// Flush interval as a duration string such as `30s` or `1m30s`
    pub interval: String,
    pub custom_attributes: HashMap<String, String>,
    pub debug: bool,
    /// In KB
    pub max_buffer_size: usize,
    pub max_request_retries: u32,
    pub proxy_url: Option<String>,
    /// `-` logs to stderr
    pub log_file: String,
    /// Accept further clients, one at a time, once the current one disconnects
    pub accept_loop: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            insights_url: String::new(),
            insights_key: String::new(),
            port: String::new(),
            interval: DEFAULT_INTERVAL.to_string(),
            custom_attributes: HashMap::new(),
            debug: false,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE_KB,
            max_request_retries: DEFAULT_MAX_REQUEST_RETRIES,
            proxy_url: None,
            log_file: LOG_FILE_NAME.to_string(),
            accept_loop: false,
        }
    }
}

impl Config {
    /// Checks required attributes and every value that must parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.insights_url.trim().is_empty() {
            return Err(ConfigError::Missing("insights_url"));
        }
        if self.insights_key.trim().is_empty() {
            return Err(ConfigError::Missing("insights_key"));
        }
        if self.port.trim().is_empty() {
            return Err(ConfigError::Missing("port"));
        }
        Url::parse(&self.insights_url).map_err(|e| ConfigError::InvalidValue {
            field: "insights_url",
            reason: e.to_string(),
        })?;
        if let Some(proxy_url) = &self.proxy_url {
            Url::parse(proxy_url).map_err(|e| ConfigError::InvalidValue {
                field: "proxy_url",
                reason: e.to_string(),
            })?;
        }
        self.listen_addr()?;
        Ok(())
    }

    /// Socket address to listen on, derived from `port`. A bare or host-less port listens
    /// on all interfaces.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let port = self.port.trim();
        let address = if port.starts_with(':') {
            format!("{UNSPECIFIED_HOST}{port}")
        } else if port.contains(':') {
            port.to_string()
        } else {
            format!("{UNSPECIFIED_HOST}:{port}")
        };
        address
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "port",
                reason: format!("'{}' is not a valid listen address: {e}", self.port),
            })
    }

    /// Parsed `interval`, or the default when it is unparsable or zero.
    pub fn flush_interval(&self) -> Duration {
        match parse_duration(&self.interval) {
            Some(duration) if !duration.is_zero() => duration,
            _ => {
                warn!(
                    "Failed to parse interval '{}', using default {} instead",
                    self.interval, DEFAULT_INTERVAL
                );
                DEFAULT_FLUSH_INTERVAL
            }
        }
    }

    /// Size threshold in bytes.
    pub fn max_buffer_bytes(&self) -> usize {
        self.max_buffer_size.saturating_mul(1024)
    }

    pub fn event_builder_config(&self) -> EventBuilderConfig {
        EventBuilderConfig {
            interval: self.interval.clone(),
            port: self.port.clone(),
            custom_attributes: self.custom_attributes.clone(),
        }
    }

    pub fn batcher_config(&self) -> BatcherConfig {
        BatcherConfig {
            flush_interval: self.flush_interval(),
            max_buffer_size: self.max_buffer_bytes(),
        }
    }

    pub fn listener_config(&self) -> Result<ListenerConfig, ConfigError> {
        Ok(ListenerConfig {
            addr: self.listen_addr()?,
            accept_loop: self.accept_loop,
        })
    }

    pub fn flusher_config(&self) -> FlusherConfig {
        FlusherConfig {
            insights_url: self.insights_url.clone(),
            insights_key: self.insights_key.clone(),
            proxy_url: self.proxy_url.clone(),
            timeout: HTTP_TIMEOUT,
            max_request_retries: self.max_request_retries,
        }
    }
}

#[allow(clippy::module_name_repetitions)]
pub trait ConfigSource {
    fn load(&self, config: &mut Config) -> Result<(), ConfigError>;
}

#[derive(Default)]
#[allow(clippy::module_name_repetitions)]
pub struct ConfigBuilder {
    sources: Vec<Box<dyn ConfigSource>>,
    config: Config,
}

#[allow(clippy::module_name_repetitions)]
impl ConfigBuilder {
    #[must_use]
    pub fn add_source(mut self, source: Box<dyn ConfigSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Applies every source in order, then validates the result.
    pub fn build(mut self) -> Result<Config, ConfigError> {
        for source in &self.sources {
            if let Err(e) = source.load(&mut self.config) {
                error!("Failed to load config: {}", e);
                return Err(e);
            }
        }
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Loads the YAML file at `path` overlaid with the environment.
///
/// A missing file is not an error by itself; every required attribute can come from the
/// environment instead.
#[allow(clippy::module_name_repetitions)]
pub fn get_config(path: &Path) -> Result<Config, ConfigError> {
    ConfigBuilder::default()
        .add_source(Box::new(YamlConfigSource {
            path: path.to_path_buf(),
        }))
        .add_source(Box::new(EnvConfigSource))
        .build()
}

/// Shape of `siteminder.yml`.
#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
#[serde(default)]
struct YamlConfig {
    insights_url: Option<String>,
    insights_key: Option<String>,
    #[serde(deserialize_with = "deserialize_string_or_int")]
    port: Option<String>,
    #[serde(deserialize_with = "deserialize_string_or_int")]
    interval: Option<String>,
    #[serde(deserialize_with = "deserialize_string_map")]
    custom_attributes: HashMap<String, String>,
    debug: Option<bool>,
    max_buffer_size: Option<usize>,
    max_request_retries: Option<u32>,
    proxy_url: Option<String>,
    log_file: Option<String>,
    accept_loop: Option<bool>,
}

pub struct YamlConfigSource {
    pub path: PathBuf,
}

impl ConfigSource for YamlConfigSource {
    fn load(&self, config: &mut Config) -> Result<(), ConfigError> {
        let figment = Figment::new().merge(Yaml::file(&self.path));
        let yaml_config = figment.extract::<YamlConfig>().map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to parse config from yaml file {}: {e}",
                self.path.display()
            ))
        })?;

        if let Some(insights_url) = yaml_config.insights_url {
            config.insights_url = insights_url;
        }
        if let Some(insights_key) = yaml_config.insights_key {
            config.insights_key = insights_key;
        }
        if let Some(port) = yaml_config.port {
            config.port = port;
        }
        if let Some(interval) = yaml_config.interval {
            config.interval = interval;
        }
        if !yaml_config.custom_attributes.is_empty() {
            config.custom_attributes = yaml_config.custom_attributes;
        }
        if let Some(debug) = yaml_config.debug {
            config.debug = debug;
        }
        if let Some(max_buffer_size) = yaml_config.max_buffer_size {
            config.max_buffer_size = max_buffer_size;
        }
        if let Some(max_request_retries) = yaml_config.max_request_retries {
            config.max_request_retries = max_request_retries;
        }
        if yaml_config.proxy_url.is_some() {
            config.proxy_url = yaml_config.proxy_url;
        }
        if let Some(log_file) = yaml_config.log_file {
            config.log_file = log_file;
        }
        if let Some(accept_loop) = yaml_config.accept_loop {
            config.accept_loop = accept_loop;
        }
        Ok(())
    }
}

/// `NR_*` environment overrides. Values that fail to parse are ignored with a warning.
pub struct EnvConfigSource;

impl ConfigSource for EnvConfigSource {
    fn load(&self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(insights_url) = non_empty_var("NR_INSIGHTS_URL") {
            config.insights_url = insights_url;
        }
        if let Some(insights_key) = non_empty_var("NR_INSIGHTS_KEY") {
            config.insights_key = insights_key;
        }
        if let Some(port) = non_empty_var("NR_PORT") {
            config.port = port;
        }
        if let Some(interval) = non_empty_var("NR_INTERVAL") {
            config.interval = interval;
        }
        if let Some(raw) = non_empty_var("NR_DEBUG") {
            match parse_bool(&raw) {
                Some(debug) => config.debug = debug,
                None => warn!("Cannot parse NR_DEBUG '{raw}' as a boolean, ignoring"),
            }
        }
        if let Some(size) = non_empty_var("NR_MAX_BUFFER_SIZE") {
            match size.trim().parse::<usize>() {
                Ok(size) => config.max_buffer_size = size,
                Err(e) => warn!("Cannot parse NR_MAX_BUFFER_SIZE '{size}': {e}, ignoring"),
            }
        }
        if let Some(retries) = non_empty_var("NR_MAX_REQUEST_RETRIES") {
            match retries.trim().parse::<u32>() {
                Ok(retries) => config.max_request_retries = retries,
                Err(e) => warn!("Cannot parse NR_MAX_REQUEST_RETRIES '{retries}': {e}, ignoring"),
            }
        }
        if let Some(proxy_url) = non_empty_var("NR_PROXY_URL") {
            config.proxy_url = Some(proxy_url);
        }
        if let Some(custom_attributes) = non_empty_var("NR_CUSTOM_ATTRS") {
            config.custom_attributes = parse_custom_attributes(&custom_attributes);
        }
        if let Some(log_file) = non_empty_var("NR_LOG_FILE") {
            config.log_file = log_file;
        }
        if let Some(accept_loop) = non_empty_var("NR_ACCEPT_LOOP") {
            match parse_bool(&accept_loop) {
                Some(accept_loop) => config.accept_loop = accept_loop,
                None => warn!("Cannot parse NR_ACCEPT_LOOP '{accept_loop}' as a boolean, ignoring"),
            }
        }
        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

/// Parses `key1:value1;key2:value2`. Entries without a `:` are skipped.
pub fn parse_custom_attributes(attributes: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for entry in attributes.split(';') {
        match entry.split_once(':') {
            Some((key, value)) if !key.is_empty() => {
                map.insert(key.to_string(), value.to_string());
            }
            _ => {
                if !entry.trim().is_empty() {
                    warn!("Failed to parse custom attribute '{entry}', expected format 'key:value', ignoring");
                }
            }
        }
    }
    map
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Parses a duration string made of decimal numbers with unit suffixes, such as `300ms`,
/// `1.5h` or `2h45m`. Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input == "0" {
        return Some(Duration::ZERO);
    }
    if input.is_empty() {
        return None;
    }

    let mut nanos = 0f64;
    let mut rest = input;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_end == 0 {
            return None;
        }
        let value: f64 = rest[..number_end].parse().ok()?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit_nanos = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        nanos += value * unit_nanos;
        rest = &rest[unit_end..];
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let nanos = nanos as u64;
    Some(Duration::from_nanos(nanos))
}

fn deserialize_string_or_int<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        Some(Value::String(s)) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                Ok(Some(s))
            }
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        None | Some(Value::Null) => Ok(None),
        Some(other) => {
            error!("Failed to parse value, expected a string or an integer, got {other}, ignoring");
            Ok(None)
        }
    }
}

/// Map of scalars read as strings; numbers and booleans keep their textual form.
fn deserialize_string_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values =
        Option::<HashMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut map = HashMap::with_capacity(values.len());
    for (key, value) in values {
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            other => {
                error!("Failed to parse custom attribute '{key}', expected a scalar, got {other}, ignoring");
                continue;
            }
        };
        map.insert(key, value);
    }
    Ok(map)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            insights_url: "https://insights-collector.example.com/v1/accounts/1/events"
                .to_string(),
            insights_key: "key".to_string(),
            port: "9000".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.interval, "30s");
        assert_eq!(config.max_buffer_size, 100);
        assert_eq!(config.max_request_retries, 5);
        assert_eq!(config.log_file, "siteminder.log");
        assert!(!config.accept_loop);
        assert_eq!(config.max_buffer_bytes(), 100 * 1024);
    }

    #[test]
    fn test_validate_requires_attributes() {
        assert_eq!(
            Config {
                insights_url: String::new(),
                ..valid_config()
            }
            .validate(),
            Err(ConfigError::Missing("insights_url"))
        );
        assert_eq!(
            Config {
                insights_key: String::new(),
                ..valid_config()
            }
            .validate(),
            Err(ConfigError::Missing("insights_key"))
        );
        assert_eq!(
            Config {
                port: String::new(),
                ..valid_config()
            }
            .validate(),
            Err(ConfigError::Missing("port"))
        );
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unparsable_values() {
        let bad_port = Config {
            port: "ninety".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            bad_port.validate(),
            Err(ConfigError::InvalidValue { field: "port", .. })
        ));

        let bad_proxy = Config {
            proxy_url: Some("::nope".to_string()),
            ..valid_config()
        };
        assert!(matches!(
            bad_proxy.validate(),
            Err(ConfigError::InvalidValue {
                field: "proxy_url",
                ..
            })
        ));
    }

    #[test]
    fn test_listen_addr_forms() {
        let with_port = |port: &str| Config {
            port: port.to_string(),
            ..valid_config()
        };
        assert_eq!(
            with_port("9000").listen_addr().unwrap(),
            "0.0.0.0:9000".parse().unwrap()
        );
        assert_eq!(
            with_port(":9000").listen_addr().unwrap(),
            "0.0.0.0:9000".parse().unwrap()
        );
        assert_eq!(
            with_port("127.0.0.1:9000").listen_addr().unwrap(),
            "127.0.0.1:9000".parse().unwrap()
        );
        assert!(with_port("70000").listen_addr().is_err());
    }

    #[test]
    fn test_flush_interval_falls_back_to_default() {
        let with_interval = |interval: &str| Config {
            interval: interval.to_string(),
            ..valid_config()
        };
        assert_eq!(
            with_interval("1s").flush_interval(),
            Duration::from_secs(1)
        );
        assert_eq!(
            with_interval("soon").flush_interval(),
            DEFAULT_FLUSH_INTERVAL
        );
        assert_eq!(with_interval("0").flush_interval(), DEFAULT_FLUSH_INTERVAL);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("300ms"), Some(Duration::from_millis(300)));
        assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("1.5h"), Some(Duration::from_secs(5400)));
        assert_eq!(parse_duration("2h45m"), Some(Duration::from_secs(9900)));
        assert_eq!(parse_duration("10us"), Some(Duration::from_micros(10)));
        assert_eq!(parse_duration("0"), Some(Duration::ZERO));
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("30"), None);
        assert_eq!(parse_duration("s"), None);
        assert_eq!(parse_duration("-1s"), None);
        assert_eq!(parse_duration("1d"), None);
    }

    #[test]
    fn test_parse_custom_attributes() {
        let attributes = parse_custom_attributes("host:box1;env:prod;broken;url:http://x");
        assert_eq!(attributes.len(), 3);
        assert_eq!(attributes["host"], "box1");
        assert_eq!(attributes["env"], "prod");
        assert_eq!(attributes["url"], "http://x");
        assert!(parse_custom_attributes("").is_empty());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("F"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_get_config_from_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "siteminder.yml",
                r#"
insights_url: "https://insights-collector.example.com/v1/accounts/1/events"
insights_key: "yaml-key"
port: 9000
interval: "1s"
custom_attributes:
  host: box1
  env: prod
debug: true
max_buffer_size: 10
max_request_retries: 2
log_file: "-"
"#,
            )?;

            let config = get_config(Path::new("siteminder.yml")).unwrap();
            assert_eq!(config.insights_key, "yaml-key");
            assert_eq!(config.port, "9000");
            assert_eq!(config.interval, "1s");
            assert_eq!(config.custom_attributes.len(), 2);
            assert_eq!(config.custom_attributes["host"], "box1");
            assert!(config.debug);
            assert_eq!(config.max_buffer_bytes(), 10 * 1024);
            assert_eq!(config.max_request_retries, 2);
            assert_eq!(config.log_file, "-");
            assert_eq!(config.proxy_url, None);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "siteminder.yml",
                r#"
insights_url: "https://insights-collector.example.com/v1/accounts/1/events"
insights_key: "yaml-key"
port: "9000"
custom_attributes:
  host: box1
"#,
            )?;
            jail.set_env("NR_INSIGHTS_KEY", "env-key");
            jail.set_env("NR_PORT", ":9100");
            jail.set_env("NR_CUSTOM_ATTRS", "host:box2;dc:east");
            jail.set_env("NR_MAX_BUFFER_SIZE", "1");
            jail.set_env("NR_MAX_REQUEST_RETRIES", "not-a-number");
            jail.set_env("NR_PROXY_URL", "http://proxy.local:3128");
            jail.set_env("NR_ACCEPT_LOOP", "true");

            let config = get_config(Path::new("siteminder.yml")).unwrap();
            assert_eq!(config.insights_key, "env-key");
            assert_eq!(config.port, ":9100");
            assert_eq!(config.custom_attributes.len(), 2);
            assert_eq!(config.custom_attributes["host"], "box2");
            assert_eq!(config.max_buffer_bytes(), 1024);
            assert_eq!(config.max_request_retries, 5);
            assert_eq!(
                config.proxy_url.as_deref(),
                Some("http://proxy.local:3128")
            );
            assert!(config.accept_loop);
            Ok(())
        });
    }

    #[test]
    fn test_custom_attribute_scalars_read_as_strings() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "siteminder.yml",
                r#"
insights_url: "https://insights-collector.example.com/v1/accounts/1/events"
insights_key: "key"
port: 9000
custom_attributes:
  rack: 12
  load: 0.5
  enabled: true
  host: box1
  nested:
    a: b
"#,
            )?;

            let config = get_config(Path::new("siteminder.yml")).unwrap();
            assert_eq!(config.custom_attributes.len(), 4);
            assert_eq!(config.custom_attributes["rack"], "12");
            assert_eq!(config.custom_attributes["load"], "0.5");
            assert_eq!(config.custom_attributes["enabled"], "true");
            assert_eq!(config.custom_attributes["host"], "box1");
            Ok(())
        });
    }

    #[test]
    fn test_unparsable_env_bools_are_ignored() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "siteminder.yml",
                r#"
insights_url: "https://insights-collector.example.com/v1/accounts/1/events"
insights_key: "key"
port: 9000
debug: true
"#,
            )?;
            jail.set_env("NR_DEBUG", "maybe");
            jail.set_env("NR_ACCEPT_LOOP", "sometimes");

            let config = get_config(Path::new("siteminder.yml")).unwrap();
            assert!(config.debug);
            assert!(!config.accept_loop);

            jail.set_env("NR_DEBUG", "false");
            let config = get_config(Path::new("siteminder.yml")).unwrap();
            assert!(!config.debug);
            Ok(())
        });
    }

    #[test]
    fn test_env_only_without_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env(
                "NR_INSIGHTS_URL",
                "https://insights-collector.example.com/v1/accounts/1/events",
            );
            jail.set_env("NR_INSIGHTS_KEY", "env-key");
            jail.set_env("NR_PORT", "9000");

            let config = get_config(Path::new("missing.yml")).unwrap();
            assert_eq!(config.interval, "30s");
            assert_eq!(config.port, "9000");
            Ok(())
        });
    }

    #[test]
    fn test_missing_required_attribute_is_fatal() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("siteminder.yml", "insights_key: key\nport: 9000\n")?;

            assert_eq!(
                get_config(Path::new("siteminder.yml")),
                Err(ConfigError::Missing("insights_url"))
            );
            Ok(())
        });
    }

    #[test]
    fn test_malformed_yaml_is_fatal() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("siteminder.yml", "port: [unterminated\n")?;

            assert!(matches!(
                get_config(Path::new("siteminder.yml")),
                Err(ConfigError::ParseError(_))
            ));
            Ok(())
        });
    }
}

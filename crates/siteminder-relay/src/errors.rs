// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::net::SocketAddr;
use std::path::PathBuf;

/// Errors raised while decoding a single `<metric ... />` tag.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("not a self-closing metric tag: {0}")]
    NotATag(String),
    #[error("metric tag has no attributes")]
    NoAttributes,
    #[error("unexpected content in metric tag at offset {0}")]
    UnexpectedContent(usize),
    #[error("attribute '{0}' is repeated")]
    DuplicateAttribute(String),
    #[error("invalid character entity '&{0};'")]
    InvalidEntity(String),
}

/// Why a batch could not be handed to the ingestion endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ShippingError {
    /// Deterministic failure; retrying the same batch cannot succeed.
    #[error("payload error: {0}")]
    Payload(String),
    /// Network or transport failure; the batch is eligible for retry.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Invalid or missing configuration. Always fatal at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    ParseError(String),
    #[error("required attribute {0} is missing from the configuration")]
    Missing(&'static str),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Fatal errors raised while bringing the relay up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to accept a connection: {0}")]
    Accept(#[source] std::io::Error),
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
    #[error("failed to open log file {path:?}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to install log subscriber: {0}")]
    Logger(String),
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Builds the client used to reach the ingestion endpoint.
///
/// When a proxy is configured all traffic goes through it and certificate verification is
/// disabled.
pub fn build_client(
    proxy_url: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder().timeout(timeout);
    if let Some(proxy) = proxy_url {
        builder = builder
            .proxy(reqwest::Proxy::all(proxy)?)
            .danger_accept_invalid_certs(true);
    }
    builder.build()
}

//! Network probe collaborator.
//!
//! A probe performs one real HTTP request and reports what happened. It never
//! fails: transport errors land in `NetworkResult::error` and in a
//! `<prefix>_error` metric, because a flaky network must not abort the
//! benchmark session.

use std::time::Duration;

use async_trait::async_trait;

use crate::context::BenchContext;
use crate::store::{MetricStore, MEASURED_NETWORK_LATENCY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct NetworkRequest {
    pub url: String,
    pub method: HttpMethod,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl NetworkRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            body: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post,
            body: Some(body.into()),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkResult {
    pub duration_ms: u64,
    /// `None` when no response arrived.
    pub response_code: Option<u16>,
    pub response_length: u64,
    pub error: Option<String>,
}

impl NetworkResult {
    pub fn failed(duration_ms: u64, error: impl Into<String>) -> Self {
        Self {
            duration_ms,
            response_code: None,
            response_length: 0,
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait NetworkProbe: Send + Sync {
    async fn probe(&self, request: &NetworkRequest) -> NetworkResult;
}

/// `reqwest` backed probe.
#[derive(Clone, Default)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NetworkProbe for HttpProbe {
    async fn probe(&self, request: &NetworkRequest) -> NetworkResult {
        let started = tokio::time::Instant::now();
        let elapsed_ms = |s: tokio::time::Instant| u64::try_from(s.elapsed().as_millis()).unwrap_or(u64::MAX);

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self
                .client
                .post(&request.url)
                .body(request.body.clone().unwrap_or_default()),
        }
        .timeout(request.timeout);

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => return NetworkResult::failed(elapsed_ms(started), e.to_string()),
        };
        let code = response.status().as_u16();
        // the body is part of the measured cost
        match response.bytes().await {
            Ok(body) => NetworkResult {
                duration_ms: elapsed_ms(started),
                response_code: Some(code),
                response_length: body.len() as u64,
                error: None,
            },
            Err(e) => NetworkResult {
                duration_ms: elapsed_ms(started),
                response_code: Some(code),
                response_length: 0,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Record `<prefix>_requestMs`, `<prefix>_responseCode` (`-1` without a
/// response), `<prefix>_responseLength` and, on failure, `<prefix>_error`.
pub fn record_network_result(store: &MetricStore, prefix: &str, result: &NetworkResult) {
    store.record_metric(format!("{prefix}_requestMs"), result.duration_ms);
    store.record_metric(
        format!("{prefix}_responseCode"),
        result.response_code.map_or(-1, i64::from),
    );
    store.record_metric(format!("{prefix}_responseLength"), result.response_length);
    if let Some(err) = &result.error {
        store.record_metric(format!("{prefix}_error"), err.clone());
    }
}

/// Probe, record the prefixed metrics and the session-wide measured latency.
pub async fn real_network_request(
    ctx: &BenchContext,
    probe: &dyn NetworkProbe,
    request: &NetworkRequest,
    prefix: &str,
) -> NetworkResult {
    let result = probe.probe(request).await;
    if let Some(err) = &result.error {
        tracing::warn!(url = %request.url, prefix, error = %err, "network probe failed");
    } else {
        tracing::debug!(url = %request.url, prefix, ms = result.duration_ms, "network probe done");
    }
    record_network_result(ctx.store(), prefix, &result);
    ctx.store().record_metric(MEASURED_NETWORK_LATENCY, result.duration_ms);
    result
}

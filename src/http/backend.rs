//! [`HttpClient`] implementation backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, StatusCode, Url};

use super::client::{HttpClient, HttpRequest, Response};
use crate::error::ClientError;

/// Settings for building a reqwest [`Client`] to hand to the dispatcher.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub pool_max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("redmine-comm/{}", env!("CARGO_PKG_VERSION")),
            pool_max_idle_per_host: 10,
        }
    }
}

impl ClientConfig {
    /// Builds a client with gzip decoding enabled.
    pub fn build(&self) -> Result<Client, reqwest::Error> {
        ClientBuilder::new()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .user_agent(&self.user_agent)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .gzip(true)
            .build()
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        // reqwest prints the full URL, query included; the dispatcher adds its own.
        let error = error.without_url();
        if is_io_failure(&error) {
            ClientError::Io(Box::new(error))
        } else {
            ClientError::Protocol(Box::new(error))
        }
    }
}

/// Connect failures, timeouts and anything caused by a socket error are I/O
/// failures. What remains (unparsable status line or headers, truncated
/// message, bad encoding, redirect loops) means the peer did not speak HTTP
/// properly.
fn is_io_failure(error: &reqwest::Error) -> bool {
    if error.is_connect() || error.is_timeout() {
        return true;
    }
    if error.is_decode() || error.is_redirect() || error.is_builder() {
        return false;
    }

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        if cause.is::<std::io::Error>() {
            return true;
        }
        source = cause.source();
    }
    false
}

/// A reqwest response read chunk by chunk.
#[derive(Debug)]
pub struct ReqwestResponse {
    inner: reqwest::Response,
}

impl ReqwestResponse {
    /// Wraps a reqwest response.
    pub fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Final URL after redirects.
    pub fn url(&self) -> &Url {
        self.inner.url()
    }

    /// Returns the wrapped reqwest response.
    pub fn into_inner(self) -> reqwest::Response {
        self.inner
    }
}

#[async_trait]
impl Response for ReqwestResponse {
    fn status(&self) -> StatusCode {
        self.inner.status()
    }

    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    async fn chunk(&mut self) -> Result<Option<Bytes>, ClientError> {
        self.inner.chunk().await.map_err(ClientError::from)
    }
}

#[async_trait]
impl HttpClient for Client {
    type Response = ReqwestResponse;

    async fn execute(&self, request: &HttpRequest) -> Result<ReqwestResponse, ClientError> {
        let mut builder = self
            .request(request.method.clone(), request.url.clone())
            .version(request.version)
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        Ok(ReqwestResponse::new(response))
    }
}

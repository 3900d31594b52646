//! Client and response abstractions the dispatcher runs on.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url, Version};

use crate::error::ClientError;

/// A fully-formed HTTP request.
///
/// The body is an immutable buffer, so the same request can be executed again
/// after a rate-limited attempt.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Creates an HTTP/1.1 request with no headers and no body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Creates a `GET` request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a `POST` request.
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Creates a `PUT` request.
    pub fn put(url: Url) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Creates a `DELETE` request.
    pub fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Appends a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The request target as sent on the request line.
    pub fn uri(&self) -> &str {
        self.url.as_str()
    }

    /// `<METHOD> <URI> <VERSION>`, e.g. `GET http://host/issues.json HTTP/1.1`.
    pub fn request_line(&self) -> String {
        format!("{} {} {:?}", self.method, self.url, self.version)
    }
}

/// A response whose body is read incrementally.
#[async_trait]
pub trait Response: Send {
    fn status(&self) -> StatusCode;

    fn headers(&self) -> &HeaderMap;

    /// Returns the next body chunk, or `None` once the body is exhausted.
    async fn chunk(&mut self) -> Result<Option<Bytes>, ClientError>;

    /// Reads and discards the rest of the body, releasing the underlying
    /// connection. Returns the number of bytes discarded.
    async fn drain(&mut self) -> Result<u64, ClientError> {
        let mut discarded: u64 = 0;
        while let Some(chunk) = self.chunk().await? {
            discarded += chunk.len() as u64;
        }
        Ok(discarded)
    }

    /// Collects the rest of the body.
    async fn bytes(&mut self) -> Result<Bytes, ClientError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.chunk().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }

    /// Collects the rest of the body as UTF-8 text.
    async fn text(&mut self) -> Result<String, ClientError> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(ClientError::protocol)
    }
}

/// Executes requests. Implementations own pooling, TLS and timeouts.
#[async_trait]
pub trait HttpClient: Send + Sync {
    type Response: Response;

    async fn execute(&self, request: &HttpRequest) -> Result<Self::Response, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Chunked {
        chunks: VecDeque<Result<Bytes, ClientError>>,
        headers: HeaderMap,
    }

    impl Chunked {
        fn new(chunks: Vec<Result<Bytes, ClientError>>) -> Self {
            Self {
                chunks: chunks.into(),
                headers: HeaderMap::new(),
            }
        }
    }

    #[async_trait]
    impl Response for Chunked {
        fn status(&self) -> StatusCode {
            StatusCode::OK
        }

        fn headers(&self) -> &HeaderMap {
            &self.headers
        }

        async fn chunk(&mut self) -> Result<Option<Bytes>, ClientError> {
            self.chunks.pop_front().transpose()
        }
    }

    #[test]
    fn test_request_line() {
        let request = HttpRequest::get(Url::parse("http://host/issues.json?limit=25").unwrap());
        assert_eq!(
            request.request_line(),
            "GET http://host/issues.json?limit=25 HTTP/1.1"
        );
    }

    #[test]
    fn test_request_builders() {
        let request = HttpRequest::post(Url::parse("http://host/issues.json").unwrap())
            .with_header(
                reqwest::header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .with_body(r#"{"issue":{}}"#);

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers["content-type"], "application/json");
        assert_eq!(request.body.as_deref(), Some(&br#"{"issue":{}}"#[..]));
        assert_eq!(request.uri(), "http://host/issues.json");
    }

    #[test]
    fn test_method_constructors() {
        let url = Url::parse("http://host/issues/3.json").unwrap();
        assert_eq!(HttpRequest::get(url.clone()).method, Method::GET);
        assert_eq!(HttpRequest::put(url.clone()).method, Method::PUT);

        let request = HttpRequest::delete(url);
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.version, Version::HTTP_11);
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_drain_counts_discarded_bytes() {
        let mut response = Chunked::new(vec![
            Ok(Bytes::from_static(b"abc")),
            Ok(Bytes::from_static(b"de")),
        ]);

        assert_eq!(response.drain().await.unwrap(), 5);
        assert!(response.chunk().await.unwrap().is_none());
        assert_eq!(response.drain().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_drain_propagates_read_failure() {
        let mut response = Chunked::new(vec![
            Ok(Bytes::from_static(b"abc")),
            Err(ClientError::io("connection reset")),
        ]);

        let err = response.drain().await.unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[tokio::test]
    async fn test_text_collects_chunks() {
        let mut response = Chunked::new(vec![
            Ok(Bytes::from_static(b"{\"issues\"")),
            Ok(Bytes::from_static(b":[]}")),
        ]);

        assert_eq!(response.text().await.unwrap(), r#"{"issues":[]}"#);
    }

    #[tokio::test]
    async fn test_text_rejects_invalid_utf8() {
        let mut response = Chunked::new(vec![Ok(Bytes::from_static(&[0xff, 0xfe]))]);

        let err = response.text().await.unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
    }
}

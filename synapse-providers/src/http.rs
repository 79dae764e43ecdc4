//! HTTP client abstraction and utilities

use crate::error;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::pin::Pin;
use synapse_core::Error;

pub use reqwest::header::HeaderMap;

/// Type alias for response byte streams
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send>>;

/// A fully-read response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Body as text
    pub body: String,
}

impl HttpResponse {
    /// Statuses below 400 count as success
    pub fn is_success(&self) -> bool {
        self.status < 400
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<Value, Error> {
        serde_json::from_str(&self.body).map_err(error::serialization_error)
    }
}

/// A response whose body is still being received
pub struct StreamingResponse {
    /// HTTP status code
    pub status: u16,
    /// Body chunks as they arrive
    pub body: ResponseStream,
}

impl StreamingResponse {
    /// Statuses below 400 count as success
    pub fn is_success(&self) -> bool {
        self.status < 400
    }

    /// Drain the remaining body into text
    pub async fn text(self) -> Result<String, Error> {
        let chunks: Vec<Bytes> = self.body.try_collect().await?;
        let bytes: Vec<u8> = chunks.concat();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl std::fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// HTTP client abstraction
///
/// Implementations report the status as-is; deciding what counts as an API
/// error is left to the provider.
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a POST request and read the whole body
    async fn post(&self, url: &str, headers: HeaderMap, body: Value) -> Result<HttpResponse, Error>;

    /// Send a POST request and hand back the body as a byte stream
    async fn post_stream(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Value,
    ) -> Result<StreamingResponse, Error>;
}

/// Default HTTP client implementation using reqwest
///
/// No request timeout is configured; a call runs until the server finishes
/// or the connection fails.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(error::network_error)?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn post(&self, url: &str, headers: HeaderMap, body: Value) -> Result<HttpResponse, Error> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(error::network_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(error::network_error)?;

        Ok(HttpResponse { status, body })
    }

    async fn post_stream(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Value,
    ) -> Result<StreamingResponse, Error> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(error::network_error)?;

        let status = response.status().as_u16();
        let body = response.bytes_stream().map_err(error::network_error);

        Ok(StreamingResponse {
            status,
            body: Box::pin(body),
        })
    }
}

/// Helper to create the JSON and bearer-token headers
pub fn create_headers(api_key: &str) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();

    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| Error::Configuration(format!("Invalid API key: {}", e)))?,
    );

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(headers)
}

/// Wrap an in-memory list of chunks as a response stream
pub fn stream_from_chunks<I>(chunks: I) -> ResponseStream
where
    I: IntoIterator<Item = Bytes>,
    I::IntoIter: Send + 'static,
{
    Box::pin(futures::stream::iter(chunks.into_iter().map(Ok)))
}

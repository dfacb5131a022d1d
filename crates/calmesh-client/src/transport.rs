//! HTTP transport.
//!
//! [`Transport::send`] performs exactly one HTTP round trip: it builds the
//! URL, injects the bearer token, serializes the body and turns any status
//! outside 200..=299 into a [`TransportFault`]. It never retries.

use calmesh_core::ValidationError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, TransportFault};
use crate::query::QueryParams;
use crate::request::{Endpoint, RequestOptions};

/// API version prefix prepended to every endpoint path.
const API_PREFIX: &str = "/v1";

/// A successful (2xx) response.
#[derive(Debug)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Parsed JSON body, present only when a body was requested.
    /// An empty body reads as `null`.
    pub body: Option<Value>,
}

/// The HTTP layer shared by all calls of one client.
#[derive(Debug, Clone)]
pub struct Transport {
    http_client: Client,
    base_url: Url,
    authorization: HeaderValue,
}

impl Transport {
    /// Creates a transport from the configuration.
    ///
    /// The base URL and token are resolved once here and never change.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = config.resolve_base_url().map_err(ClientError::Config)?;
        let token = config.resolve_token();

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ClientError::Config("API token contains invalid characters".into()))?;
        authorization.set_sensitive(true);

        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            authorization,
        })
    }

    /// Returns the resolved base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the full request URL: base URL, `/v1`, endpoint path, query string.
    pub fn url_for(&self, endpoint: &Endpoint, query: &QueryParams) -> ClientResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}{}{}", base, API_PREFIX, endpoint.path()))
            .map_err(|e| ClientError::Config(format!("invalid request URL for {}: {}", endpoint, e)))?;
        query.apply_to(&mut url);
        Ok(url)
    }

    /// Sends one request.
    ///
    /// When `read_body` is false the response body is never read.
    pub async fn send(
        &self,
        endpoint: &Endpoint,
        options: &RequestOptions,
        read_body: bool,
    ) -> ClientResult<RawResponse> {
        let url = self.url_for(endpoint, &options.query)?;
        let headers = self.headers_for(options)?;

        let mut request = self
            .http_client
            .request(endpoint.method().into(), url.clone())
            .headers(headers);

        if let Some(ref body) = options.body {
            let bytes = serde_json::to_vec(body).map_err(|e| {
                ClientError::Config(format!("failed to serialize request body: {}", e))
            })?;
            request = request.body(bytes);
        }

        debug!(method = %endpoint.method(), url = %url, "sending request");

        let response = request.send().await?;
        let status = response.status();
        trace!(status = status.as_u16(), url = %url, "received response");

        if !status.is_success() {
            let status_text = failure_status_text(response).await;
            return Err(TransportFault::new(url.as_str(), status.as_u16(), status_text).into());
        }

        let headers = response.headers().clone();
        let body = if read_body {
            Some(read_json(response).await?)
        } else {
            None
        };

        Ok(RawResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }

    fn headers_for(&self, options: &RequestOptions) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.authorization.clone());
        if options.body.is_some() && !options.has_header(CONTENT_TYPE.as_str()) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::Config(format!("invalid header name: {}", name)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ClientError::Config(format!("invalid value for header {}", name)))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

/// Extracts the text used to classify a failed response.
///
/// A JSON body with a string `message` (or `error`) field wins; otherwise
/// the canonical reason phrase is used.
async fn failure_status_text(response: Response) -> String {
    let reason = response
        .status()
        .canonical_reason()
        .unwrap_or_default()
        .to_string();

    let Ok(body) = response.text().await else {
        return reason;
    };

    server_message(&body).unwrap_or(reason)
}

fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .filter(|msg| !msg.is_empty())
        .map(String::from)
}

async fn read_json(response: Response) -> ClientResult<Value> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ClientError::Network(format!("failed to read response: {}", e)))?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&bytes).map_err(|e| {
        ValidationError::new("JSON", ".", format!("response body is not valid JSON: {}", e)).into()
    })
}

//! Network Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{FetchRequest, HttpClient, HttpMethod, HttpResponse, ResponseType},
};
use reqwest::{Client, Url};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Reqwest-based network client
///
/// Performs a single attempt per request; the agent owns all fallback
/// behaviour. Responses whose final URL shares the configured app origin are
/// reported as [`ResponseType::Basic`], everything else as
/// [`ResponseType::Cors`].
pub struct ReqwestHttpClient {
    client: Client,
    app_origin: Option<Url>,
}

impl ReqwestHttpClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("dreamvault-offline-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default reqwest client");
                Client::new()
            });

        Self {
            client,
            app_origin: None,
        }
    }

    /// Create a new client around an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            app_origin: None,
        }
    }

    /// Set the origin whose responses count as same-origin
    pub fn with_app_origin(mut self, origin: Url) -> Self {
        self.app_origin = Some(origin);
        self
    }

    /// Convert bridge HttpMethod to reqwest Method
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }

    /// Build reqwest request from bridge request
    fn build_request(&self, request: FetchRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn classify(&self, url: &Url) -> ResponseType {
        match &self.app_origin {
            Some(origin) if origin.origin() == url.origin() => ResponseType::Basic,
            _ => ResponseType::Cors,
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: FetchRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "Executing network request");

        let response = self.build_request(request).send().await.map_err(|e| {
            warn!(error = %e, "Network request failed");
            if e.is_timeout() {
                BridgeError::Network("Request timed out".to_string())
            } else if e.is_connect() {
                BridgeError::Network(format!("Connection failed: {}", e))
            } else {
                BridgeError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| BridgeError::Network(format!("Failed to read body: {}", e)))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
            response_type: self.classify(&final_url),
            url: final_url.to_string(),
        })
    }
}
